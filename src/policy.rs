//! Policy Extraction (C7).
//!
//! Turns a searched tree's root visit counts into a move distribution, and
//! samples a move from it at a given temperature (spec §4.7).

use crate::move_codec::Move;
use crate::tree::Tree;
use rand::Rng;

/// Root visit counts as a move distribution, in child-enumeration order.
#[derive(Debug, Clone)]
pub struct VisitDistribution {
    entries: Vec<(Move, u32)>,
}

impl VisitDistribution {
    /// Read the root's per-child visit counts straight off the tree.
    ///
    /// Empty in two distinct situations this type does not itself
    /// distinguish: the root is terminal (game over, so it was never
    /// expanded), or the root is merely unexpanded because no simulation
    /// has run against it yet (e.g. a zero-simulation search on a live
    /// position). Callers that need to tell these apart — `Brandubh::best_move`
    /// is one — check `Node::is_terminal` on the root directly rather than
    /// relying on emptiness here.
    pub fn from_tree(tree: &Tree) -> VisitDistribution {
        let root = tree.get(tree.root());
        let entries = root
            .children()
            .iter()
            .map(|&(mv, child_id)| (mv, tree.get(child_id).visits()))
            .collect();
        VisitDistribution { entries }
    }

    pub fn entries(&self) -> &[(Move, u32)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_visits(&self) -> u32 {
        self.entries.iter().map(|&(_, n)| n).sum()
    }

    /// Temperature-scaled move probabilities (spec §4.7): `pi(a) = N(a)^(1/tau)`
    /// normalized. `tau == 0.0` is treated as the degenerate argmax case
    /// (all mass on the most-visited move, first in enumeration order on
    /// ties) rather than raising `N(a)^inf`.
    pub fn temperature_probs(&self, tau: f32) -> Vec<(Move, f32)> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        if tau <= 0.0 {
            let (best_mv, best_n) = self
                .entries
                .iter()
                .fold((self.entries[0].0, 0u32), |(bm, bn), &(mv, n)| {
                    if n > bn {
                        (mv, n)
                    } else {
                        (bm, bn)
                    }
                });
            return self
                .entries
                .iter()
                .map(|&(mv, _)| (mv, if mv == best_mv { 1.0 } else { 0.0 }))
                .collect();
        }

        let weights: Vec<f32> = self
            .entries
            .iter()
            .map(|&(_, n)| (n as f32).powf(1.0 / tau))
            .collect();
        let sum: f32 = weights.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            let uniform = 1.0 / self.entries.len() as f32;
            return self.entries.iter().map(|&(mv, _)| (mv, uniform)).collect();
        }
        self.entries
            .iter()
            .zip(weights.iter())
            .map(|(&(mv, _), &w)| (mv, w / sum))
            .collect()
    }

    /// Sample a move from the temperature-scaled distribution using `rng`.
    /// Returns `None` if the distribution is empty (no searched children).
    pub fn sample<R: Rng + ?Sized>(&self, tau: f32, rng: &mut R) -> Option<Move> {
        let probs = self.temperature_probs(tau);
        if probs.is_empty() {
            return None;
        }
        let mut target: f32 = rng.random_range(0.0..1.0);
        for &(mv, p) in &probs {
            if target < p {
                return Some(mv);
            }
            target -= p;
        }
        // Floating-point rounding may leave a sliver of mass unaccounted for;
        // fall back to the last entry rather than returning None.
        probs.last().map(|&(mv, _)| mv)
    }
}
