//! Feature-gated `burn`-backed policy/value network (spec §6 ABI).
//!
//! Adapted from the teacher's `QuoridorNet` scaffold to this crate's fixed
//! shapes: 4x7x7 input planes, 1176-entry policy output. This module is the
//! network + inference wrapper only; training, replay buffers, and
//! self-play workers are out of scope (spec.md §1, "persistent training
//! infrastructure").

use crate::error::Error;
use crate::evaluator::{validate_output, EvalOutput, Evaluator};
use crate::move_codec::POLICY_SIZE;
use crate::state_encoder::STATE_SIZE;
use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{self, Initializer, Relu};
use burn::tensor::{backend::Backend, Tensor, TensorData};

const BOARD: usize = 7;
const IN_CHANNELS: usize = 4;

/// Convolutional policy/value network over the 4x7x7 Brandubh state tensor.
#[derive(Module, Debug)]
pub struct BrandubhNet<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
    fc_policy: nn::Linear<B>,
    fc_value1: nn::Linear<B>,
    fc_value2: nn::Linear<B>,
}

impl<B: Backend> BrandubhNet<B> {
    pub fn new(device: &B::Device) -> Self {
        let init = Initializer::KaimingUniform {
            gain: 1.0,
            fan_out_only: false,
        };
        let conv1 = Conv2dConfig::new([IN_CHANNELS, 32], [3, 3])
            .with_initializer(init.clone())
            .init(device);
        let conv2 = Conv2dConfig::new([32, 64], [3, 3])
            .with_initializer(init.clone())
            .init(device);

        // 7x7 -> 5x5 -> 3x3 after two unpadded 3x3 convolutions.
        let flattened = 64 * 3 * 3;
        let fc_policy = nn::LinearConfig::new(flattened, POLICY_SIZE)
            .with_initializer(init.clone())
            .init(device);
        let fc_value1 = nn::LinearConfig::new(flattened, 64)
            .with_initializer(init)
            .init(device);
        let fc_value2 = nn::LinearConfig::new(64, 1)
            .with_initializer(Initializer::XavierNormal { gain: 1.0 })
            .init(device);

        Self {
            conv1,
            conv2,
            fc_policy,
            fc_value1,
            fc_value2,
        }
    }

    /// Forward pass on a batch of encoded states, shape `[batch, 4, 7, 7]`.
    /// Returns `(policy_logits [batch, 1176], value [batch, 1])`.
    pub fn forward(&self, x: Tensor<B, 4>) -> (Tensor<B, 2>, Tensor<B, 2>) {
        let relu = Relu::new();
        let x = relu.forward(self.conv1.forward(x));
        let x = relu.forward(self.conv2.forward(x));
        let x = x.flatten(1, 3);

        let policy = self.fc_policy.forward(x.clone());
        let value = relu.forward(self.fc_value1.forward(x));
        let value = self.fc_value2.forward(value).tanh();
        (policy, value)
    }
}

/// `Evaluator` implementation backed by a `BrandubhNet`.
pub struct BurnEvaluator<B: Backend> {
    model: BrandubhNet<B>,
    device: B::Device,
}

impl<B: Backend> BurnEvaluator<B> {
    pub fn new(device: B::Device) -> Self {
        let model = BrandubhNet::new(&device);
        Self { model, device }
    }

    pub fn from_model(model: BrandubhNet<B>, device: B::Device) -> Self {
        Self { model, device }
    }
}

impl<B: Backend> Evaluator for BurnEvaluator<B> {
    fn evaluate(&self, state: &[f32; STATE_SIZE]) -> Result<EvalOutput, Error> {
        let input = Tensor::<B, 4>::from_data(
            TensorData::new(state.to_vec(), [1, IN_CHANNELS, BOARD, BOARD]),
            &self.device,
        );
        let (policy, value) = self.model.forward(input);

        let policy_vec: Vec<f32> = policy
            .into_data()
            .to_vec()
            .map_err(|e| Error::EvaluatorError(format!("bad policy tensor: {e:?}")))?;
        let value_vec: Vec<f32> = value
            .into_data()
            .to_vec()
            .map_err(|e| Error::EvaluatorError(format!("bad value tensor: {e:?}")))?;

        let policy_logits: Box<[f32; POLICY_SIZE]> = policy_vec
            .into_boxed_slice()
            .try_into()
            .map_err(|_| Error::EvaluatorError("policy tensor has wrong length".to_string()))?;
        let value = *value_vec
            .first()
            .ok_or_else(|| Error::EvaluatorError("value tensor is empty".to_string()))?;

        validate_output(&policy_logits, value)?;
        Ok(EvalOutput {
            policy_logits,
            value,
        })
    }
}
