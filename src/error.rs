//! Crate-wide error type.
//!
//! One `thiserror`-derived enum covers every fallible boundary in the core,
//! mirroring the `cesso-core`/`cesso-engine` convention of a single error type
//! per crate rather than ad hoc `String` errors or panics.

use thiserror::Error;

/// Errors produced by the board, codec, tree, and engine layers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A position failed a structural invariant (wrong piece counts, a
    /// non-King piece on a restricted corner, more than one King, ...).
    #[error("invalid position: {0}")]
    InvalidPosition(String),

    /// `apply` was called with a move that is not legal in the given position.
    #[error("illegal move: {0:?}")]
    IllegalMove(crate::move_codec::Move),

    /// The evaluator failed, returned the wrong shape, or returned a
    /// non-finite value.
    #[error("evaluator error: {0}")]
    EvaluatorError(String),

    /// A search was cancelled at a simulation-batch boundary before
    /// completing its requested simulation budget.
    #[error("search cancelled after {simulations_run} simulations")]
    Cancelled {
        /// Number of simulations completed before cancellation.
        simulations_run: u32,
    },

    /// The root position has no legal moves for the side to move and the
    /// caller asked for a move.
    #[error("no legal moves available")]
    NoLegalMoves,
}
