//! MCTS Engine (C6).
//!
//! The simulation loop: select -> expand+evaluate -> backup, plus tree
//! reuse across consecutive searches and cooperative yielding so long
//! searches stay responsive to a host event loop.

use crate::board::{Position, Side, Termination};
use crate::error::Error;
use crate::evaluator::{validate_output, Evaluator};
use crate::move_codec::{all_legal_moves, Move, POLICY_SIZE};
use crate::state_encoder::encode_state;
use crate::tree::Tree;

/// Tunable search parameters (spec §4.5, §4.6).
#[derive(Debug, Clone, Copy)]
pub struct SearchParams {
    /// PUCT exploration constant.
    pub c_puct: f32,
    /// First-Play-Urgency reduction applied to the parent's Q for
    /// unvisited children.
    pub fpu_reduction: f32,
    /// Simulations per batch between cooperative-yield checkpoints.
    pub batch_size: u32,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParams {
            c_puct: 1.5,
            fpu_reduction: 0.25,
            batch_size: 8,
        }
    }
}

/// Reported after each simulation batch (spec §4.6 "Cooperative yielding").
#[derive(Debug, Clone, Copy)]
pub struct SearchProgress {
    pub simulations_run: u32,
    pub simulations_requested: u32,
    pub root_visits: u32,
}

/// Returned by a batch-boundary callback to continue or cancel a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Break,
}

/// Outcome of a (possibly cancelled) search.
#[derive(Debug, Clone, Copy)]
pub struct SearchOutcome {
    pub simulations_run: u32,
    pub cancelled: bool,
}

/// Owns the search tree and drives simulations against an `Evaluator`.
pub struct Engine<E: Evaluator> {
    evaluator: E,
    params: SearchParams,
    tree: Option<Tree>,
}

impl<E: Evaluator> Engine<E> {
    pub fn new(evaluator: E, params: SearchParams) -> Self {
        Engine {
            evaluator,
            params,
            tree: None,
        }
    }

    pub fn params(&self) -> SearchParams {
        self.params
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn tree(&self) -> Option<&Tree> {
        self.tree.as_ref()
    }

    /// Run up to `n_sims` simulations against `pos`/`side`, calling
    /// `on_batch` once per batch boundary (spec §4.6, §5). Returns early
    /// (without error) if `on_batch` requests cancellation or the root is
    /// found terminal; the tree remains valid either way and may be reused.
    pub fn search_with(
        &mut self,
        pos: &Position,
        side: Side,
        n_sims: u32,
        on_batch: &mut dyn FnMut(SearchProgress) -> ControlFlow,
    ) -> Result<SearchOutcome, Error> {
        self.ensure_root(pos, side);

        let mut simulations_run = 0;
        let mut cancelled = false;
        'batches: while simulations_run < n_sims {
            let batch_len = self.params.batch_size.min(n_sims - simulations_run);
            for _ in 0..batch_len {
                if self.root_is_terminal() {
                    break 'batches;
                }
                self.simulate_once()?;
                simulations_run += 1;
            }

            let root_visits = self.tree().unwrap().get(self.tree().unwrap().root()).visits();
            tracing::debug!(simulations_run, root_visits, "completed simulation batch");

            if simulations_run < n_sims {
                let progress = SearchProgress {
                    simulations_run,
                    simulations_requested: n_sims,
                    root_visits,
                };
                if on_batch(progress) == ControlFlow::Break {
                    tracing::warn!(simulations_run, "search cancelled at batch boundary");
                    cancelled = true;
                    break;
                }
            }
        }

        Ok(SearchOutcome {
            simulations_run,
            cancelled,
        })
    }

    /// `search_with` with a callback that never cancels.
    pub fn search(&mut self, pos: &Position, side: Side, n_sims: u32) -> Result<SearchOutcome, Error> {
        self.search_with(pos, side, n_sims, &mut |_| ControlFlow::Continue)
    }

    /// `search_with`, but surfaces cancellation as `Error::Cancelled`
    /// instead of a best-effort `SearchOutcome` (spec §5 and §7: most
    /// callers treat cancellation as a normal outcome, but strict callers
    /// may want it as an error).
    pub fn search_with_strict(
        &mut self,
        pos: &Position,
        side: Side,
        n_sims: u32,
        on_batch: &mut dyn FnMut(SearchProgress) -> ControlFlow,
    ) -> Result<SearchOutcome, Error> {
        let outcome = self.search_with(pos, side, n_sims, on_batch)?;
        if outcome.cancelled {
            Err(Error::Cancelled {
                simulations_run: outcome.simulations_run,
            })
        } else {
            Ok(outcome)
        }
    }

    fn root_is_terminal(&self) -> bool {
        let tree = self.tree.as_ref().unwrap();
        tree.get(tree.root()).is_terminal()
    }

    /// Reuse the existing tree if its root matches `pos`/`side` by value
    /// (spec §4.6 "Tree reuse"); otherwise discard and build fresh. A fresh
    /// root that is already over (board-terminal, or no legal moves) is
    /// marked terminal immediately rather than waiting for the first
    /// simulation to discover it, so a search against it costs zero
    /// simulations instead of one wasted one.
    fn ensure_root(&mut self, pos: &Position, side: Side) {
        let reusable = match &self.tree {
            Some(tree) => tree.root_identity() == (*pos, side),
            None => false,
        };
        if !reusable {
            let mut tree = Tree::new(*pos, side);
            let root = tree.root();
            match pos.is_terminal() {
                Termination::NotOver => {
                    if all_legal_moves(pos, side).is_empty() {
                        tree.get_mut(root).mark_terminal(-1.0);
                    }
                }
                termination => {
                    tree.get_mut(root).mark_terminal(terminal_value_for(termination, side));
                }
            }
            self.tree = Some(tree);
        }
    }

    /// One simulation: selection, evaluation/expansion, backup (spec §4.6).
    fn simulate_once(&mut self) -> Result<(), Error> {
        let tree = self.tree.as_mut().expect("ensure_root always sets a tree");
        let root = tree.root();
        let mut path = vec![root];
        let mut current = root;
        let mut working_position = tree
            .get(root)
            .position()
            .copied()
            .expect("root position is always materialized");

        while tree.get(current).is_expanded() && !tree.get(current).is_terminal() {
            let child = tree.select_child(current, self.params.c_puct, self.params.fpu_reduction);
            if tree.get(child).position().is_none() {
                let mover_side = tree.get(current).side_to_move();
                let mv = tree
                    .get(child)
                    .incoming_move()
                    .expect("non-root node always has an incoming move");
                let next_position = working_position.apply(mover_side, mv)?;
                tree.get_mut(child).set_position(next_position);
            }
            working_position = tree.get(child).position().copied().unwrap();
            path.push(child);
            current = child;
        }

        let leaf = current;
        let value = if tree.get(leaf).is_terminal() {
            tree.get(leaf)
                .terminal_value()
                .expect("is_terminal implies terminal_value is set")
        } else {
            match working_position.is_terminal() {
                Termination::NotOver => {
                    let leaf_side = tree.get(leaf).side_to_move();
                    let legal = all_legal_moves(&working_position, leaf_side);
                    if legal.is_empty() {
                        let v = -1.0;
                        tree.get_mut(leaf).mark_terminal(v);
                        v
                    } else {
                        let state = encode_state(&working_position, leaf_side);
                        let eval = self.evaluator.evaluate(&state)?;
                        validate_output(&eval.policy_logits, eval.value)?;
                        let priors = expansion_priors(&legal, &eval.policy_logits);
                        tree.expand(leaf, &priors);
                        eval.value
                    }
                }
                termination => {
                    let leaf_side = tree.get(leaf).side_to_move();
                    let v = terminal_value_for(termination, leaf_side);
                    tree.get_mut(leaf).mark_terminal(v);
                    v
                }
            }
        };

        tree.backup(&path, value);
        Ok(())
    }
}

/// Game-result value from `side`'s perspective (spec §4.6 step 2).
fn terminal_value_for(termination: Termination, side: Side) -> f32 {
    match (termination, side) {
        (Termination::AttackerWins, Side::Attacker) => 1.0,
        (Termination::AttackerWins, Side::Defender) => -1.0,
        (Termination::DefenderWins, Side::Defender) => 1.0,
        (Termination::DefenderWins, Side::Attacker) => -1.0,
        (Termination::NotOver, _) => unreachable!("caller only invokes this for terminal results"),
    }
}

/// Expansion (spec §4.5): softmax the masked legal logits, falling back to
/// uniform priors if every legal logit masks to zero probability mass.
fn expansion_priors(legal: &[(Move, u16)], logits: &[f32; POLICY_SIZE]) -> Vec<(Move, f32)> {
    let masked: Vec<f32> = legal.iter().map(|&(_, idx)| logits[idx as usize]).collect();
    let max_logit = masked.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = masked.iter().map(|&l| (l - max_logit).exp()).collect();
    let sum: f32 = exps.iter().sum();

    if sum > 0.0 && sum.is_finite() {
        legal
            .iter()
            .zip(exps.iter())
            .map(|(&(mv, _), &e)| (mv, e / sum))
            .collect()
    } else {
        let uniform = 1.0 / legal.len() as f32;
        legal.iter().map(|&(mv, _)| (mv, uniform)).collect()
    }
}
