//! `brandubh-zero`: an AlphaZero-style PUCT search engine for Brandubh, the
//! 7x7 Tafl variant. The crate is organized in the dependency order of its
//! components: board rules, then the move codec and state encoder that sit
//! on top of it, then the evaluator boundary, the search tree, the engine
//! that drives simulations over it, policy extraction from the finished
//! tree, and finally the public API that ties all of it together.

pub mod api;
pub mod board;
pub mod error;
pub mod evaluator;
pub mod mcts;
pub mod move_codec;
#[cfg(feature = "nn")]
pub mod nn;
pub mod policy;
pub mod state_encoder;
pub mod tree;

pub use api::{Brandubh, EvaluationSummary, MoveChoice, PolicyData};
pub use board::{Piece, Position, Side, Termination};
pub use error::Error;
pub use evaluator::{EvalOutput, Evaluator, RandomEvaluator, UniformEvaluator};
pub use mcts::{ControlFlow, SearchOutcome, SearchParams, SearchProgress};
pub use move_codec::{decode, encode, Move, Direction, POLICY_SIZE};
pub use policy::VisitDistribution;
pub use state_encoder::{encode_state, STATE_SIZE};
pub use tree::{NodeId, Tree};
