//! Public API (C8).
//!
//! The four operations a host application needs: pick a move, run a search
//! and inspect it, read the raw network output for a position, and a
//! combined convenience call. Everything here is a thin wrapper over
//! `mcts::Engine`, `policy::VisitDistribution` and `evaluator::Evaluator`.

use crate::board::{Position, Side};
use crate::error::Error;
use crate::evaluator::Evaluator;
use crate::mcts::{ControlFlow, Engine, SearchOutcome, SearchParams, SearchProgress};
use crate::move_codec::{encode, Move, POLICY_SIZE};
use crate::policy::VisitDistribution;
use crate::state_encoder::encode_state;
use rand::Rng;
use std::collections::HashMap;

/// The raw leaf-policy logits from the most recent root evaluation, paired
/// with the visit counts `best_move`'s search produced (spec §4.8).
#[derive(Debug, Clone)]
pub struct PolicyData {
    pub policy_logits: Box<[f32; POLICY_SIZE]>,
    pub value: f32,
    /// Policy index -> visit count, for moves with nonzero search visits.
    pub visit_counts: HashMap<u16, u32>,
}

/// One root child ranked by visit count, as returned by `evaluate_position`.
#[derive(Debug, Clone, Copy)]
pub struct MoveChoice {
    pub mv: Move,
    pub visits: u32,
    pub root_visits: u32,
}

/// Result of `evaluate_position`: the searched root's mean value plus its
/// children ranked by visit count, most-visited first (spec §4.8).
#[derive(Debug, Clone)]
pub struct EvaluationSummary {
    pub root_value: f32,
    pub top_k_moves: Vec<MoveChoice>,
}

/// Drives search and exposes the four public operations over one
/// `Evaluator` (spec §5).
pub struct Brandubh<E: Evaluator> {
    engine: Engine<E>,
}

impl<E: Evaluator> Brandubh<E> {
    pub fn new(evaluator: E, params: SearchParams) -> Self {
        Brandubh {
            engine: Engine::new(evaluator, params),
        }
    }

    /// The tree behind the most recent search, if any has been run yet.
    /// Exposed so a host can inspect visit counts, principal variations, or
    /// Q values beyond what `PolicyData`/`MoveChoice` surface directly.
    pub fn tree(&self) -> Option<&crate::tree::Tree> {
        self.engine.tree()
    }

    /// Run `n_sims` simulations from `pos`/`side`, honoring cooperative
    /// yielding via `on_batch`. Reuses the engine's existing tree when the
    /// root matches the previous call (spec §4.6 "Tree reuse").
    pub fn search_with(
        &mut self,
        pos: &Position,
        side: Side,
        n_sims: u32,
        on_batch: &mut dyn FnMut(SearchProgress) -> ControlFlow,
    ) -> Result<SearchOutcome, Error> {
        self.engine.search_with(pos, side, n_sims, on_batch)
    }

    /// `search_with` without cancellation support.
    pub fn search(&mut self, pos: &Position, side: Side, n_sims: u32) -> Result<SearchOutcome, Error> {
        self.engine.search(pos, side, n_sims)
    }

    /// Run a search and sample a move from the resulting visit
    /// distribution at temperature `tau` (spec §4.7, §4.8). `tau == 0.0`
    /// means the most-visited move, ties broken by enumeration order.
    ///
    /// Fails with `Error::NoLegalMoves` — the game-over indicator spec §7
    /// requires — when `pos`/`side` is genuinely terminal (board-over, or
    /// the side to move has no legal slide at all). This is distinct from
    /// an *unsearched* root (e.g. `n_sims == 0` against a live position):
    /// that case still has legal moves and falls back to a uniform pick
    /// among them rather than being reported as game over. The accompanying
    /// `PolicyData` carries the raw leaf-policy logits the evaluator
    /// produced for `pos`/`side` and the visit counts the search left
    /// behind (spec §4.8); `visit_counts` is empty in the unsearched-root
    /// fallback case.
    pub fn best_move<R: Rng + ?Sized>(
        &mut self,
        pos: &Position,
        side: Side,
        n_sims: u32,
        tau: f32,
        rng: &mut R,
    ) -> Result<(Move, PolicyData), Error> {
        self.search(pos, side, n_sims)?;
        let tree = self.engine.tree().expect("search always builds a tree");
        if tree.get(tree.root()).is_terminal() {
            return Err(Error::NoLegalMoves);
        }

        let dist = VisitDistribution::from_tree(tree);
        let mv = match dist.sample(tau, rng) {
            Some(mv) => mv,
            None => {
                // Root is live but unexpanded (no simulations actually ran,
                // e.g. n_sims == 0): fall back to a uniform pick over the
                // position's legal moves instead of conflating this with
                // the root-terminal case above.
                let legal = pos.legal_moves(side);
                debug_assert!(
                    !legal.is_empty(),
                    "a non-terminal root always has legal moves"
                );
                legal[rng.random_range(0..legal.len())]
            }
        };

        let mut visit_counts = HashMap::new();
        for &(m, n) in dist.entries() {
            if n > 0 {
                visit_counts.insert(encode(m), n);
            }
        }
        let (policy_logits, value) = self.raw_policy(pos, side)?;
        Ok((
            mv,
            PolicyData {
                policy_logits,
                value,
                visit_counts,
            },
        ))
    }

    /// A single evaluator call through the codec; no tree involved (spec
    /// §4.8 "raw_policy").
    pub fn raw_policy(
        &mut self,
        pos: &Position,
        side: Side,
    ) -> Result<(Box<[f32; POLICY_SIZE]>, f32), Error> {
        let state = encode_state(pos, side);
        let eval = self.engine_evaluate(&state)?;
        Ok((eval.policy_logits, eval.value))
    }

    /// Search then rank the root's children by visit count (spec §4.8
    /// "evaluate_position"). `root_value` is the searched root's mean value
    /// from `side`'s perspective; `top_k_moves` is every root child, most
    /// visited first.
    pub fn evaluate_position(
        &mut self,
        pos: &Position,
        side: Side,
        n_sims: u32,
    ) -> Result<EvaluationSummary, Error> {
        self.search(pos, side, n_sims)?;
        let tree = self.engine.tree().expect("search always builds a tree");
        let root = tree.get(tree.root());
        let root_visits = root.visits();
        let mut top_k_moves: Vec<MoveChoice> = root
            .children()
            .iter()
            .map(|&(mv, id)| MoveChoice {
                mv,
                visits: tree.get(id).visits(),
                root_visits,
            })
            .collect();
        top_k_moves.sort_by(|a, b| b.visits.cmp(&a.visits));
        Ok(EvaluationSummary {
            root_value: root.q(),
            top_k_moves,
        })
    }

    fn engine_evaluate(&self, state: &[f32; crate::state_encoder::STATE_SIZE]) -> Result<crate::evaluator::EvalOutput, Error> {
        self.engine.evaluator().evaluate(state)
    }
}
