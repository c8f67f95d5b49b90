//! Evaluator Interface (C4).
//!
//! The abstract boundary to a neural model producing policy logits and a
//! scalar value. The engine only ever calls `evaluate`; everything else
//! (batching, caching, which backend) is the implementer's business.

use crate::error::Error;
use crate::move_codec::POLICY_SIZE;
use crate::state_encoder::STATE_SIZE;

/// Raw output of one evaluator call: unnormalized policy logits and a
/// scalar value in `[-1, 1]` from the current mover's perspective.
#[derive(Clone)]
pub struct EvalOutput {
    pub policy_logits: Box<[f32; POLICY_SIZE]>,
    pub value: f32,
}

/// Abstract policy/value model. Implementations may batch or cache across
/// calls; the engine does neither on its own (spec §4.4).
pub trait Evaluator {
    fn evaluate(&self, state: &[f32; STATE_SIZE]) -> Result<EvalOutput, Error>;
}

/// Validate an evaluator's raw output against the contract in spec §4.4:
/// finite logits, finite value in range. Shared by every `Evaluator` impl
/// in this crate so the "invalid outputs are fatal" rule is enforced in one
/// place.
pub fn validate_output(policy_logits: &[f32; POLICY_SIZE], value: f32) -> Result<(), Error> {
    if !value.is_finite() || !(-1.0..=1.0).contains(&value) {
        tracing::error!(value, "evaluator returned a non-finite or out-of-range value");
        return Err(Error::EvaluatorError(format!(
            "value {value} is not finite and in [-1, 1]"
        )));
    }
    if policy_logits.iter().any(|l| !l.is_finite()) {
        tracing::error!("evaluator returned a non-finite policy logit");
        return Err(Error::EvaluatorError(
            "policy logits contain NaN or Inf".to_string(),
        ));
    }
    Ok(())
}

/// An evaluator that returns uniform (all-zero) logits and a value of 0.0.
/// Used by the end-to-end tests in spec §8 and as a cheap placeholder
/// before a trained model is available.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, _state: &[f32; STATE_SIZE]) -> Result<EvalOutput, Error> {
        Ok(EvalOutput {
            policy_logits: Box::new([0.0; POLICY_SIZE]),
            value: 0.0,
        })
    }
}

/// An evaluator that returns pseudo-random logits and value, for exercising
/// PUCT exploration in tests without a trained model. `evaluate` is a pure
/// function of `(seed, state)` — the state bytes are hashed into the RNG
/// seed for each call, rather than advancing shared RNG state across calls —
/// so repeated calls with the same state are referentially transparent, as
/// spec §4.4 requires of the evaluator boundary.
pub struct RandomEvaluator {
    seed: u64,
}

impl RandomEvaluator {
    pub fn new(seed: u64) -> Self {
        RandomEvaluator { seed }
    }

    fn rng_for(&self, state: &[f32; STATE_SIZE]) -> rand::rngs::StdRng {
        use rand::SeedableRng;
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.seed.hash(&mut hasher);
        for v in state {
            v.to_bits().hash(&mut hasher);
        }
        rand::rngs::StdRng::seed_from_u64(hasher.finish())
    }
}

impl Evaluator for RandomEvaluator {
    fn evaluate(&self, state: &[f32; STATE_SIZE]) -> Result<EvalOutput, Error> {
        use rand::Rng;
        let mut rng = self.rng_for(state);
        let mut logits = Box::new([0.0f32; POLICY_SIZE]);
        for l in logits.iter_mut() {
            *l = rng.random_range(-1.0..1.0);
        }
        let value = rng.random_range(-1.0..1.0);
        Ok(EvalOutput {
            policy_logits: logits,
            value,
        })
    }
}
