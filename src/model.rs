//! Collaborator interfaces for the diffusion model.
//!
//! The demo treats the diffusion network and its sampler as a black box. Two
//! traits mark the seams:
//!
//! - [`ModelSource`]: acquires a model and its configuration by identifier
//! - [`DiffusionModel`]: device placement, an optional optimization pass,
//!   inference mode, and conditioned generation
//!
//! [`hub`] provides the Hugging Face Hub backed source used by the binary.

pub mod hub;

use candle_core::{Device, Tensor};

use crate::Result;
use crate::config::{ModelConfig, SamplerType};

/// Text and timing conditioning for one generated clip.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditioning {
    pub prompt: String,
    /// Offset of the clip within the timing window, in seconds.
    pub seconds_start: f64,
    /// Total clip length, in seconds.
    pub seconds_total: f64,
}

/// Everything passed to [`DiffusionModel::generate`] for one call.
#[derive(Debug, Clone)]
pub struct DiffusionRequest {
    pub steps: usize,
    pub cfg_scale: f64,
    pub conditioning: Vec<Conditioning>,
    pub sample_size: usize,
    pub sigma_min: f64,
    pub sigma_max: f64,
    pub sampler: SamplerType,
    pub device: Device,
}

/// A pretrained text-conditioned audio diffusion model.
pub trait DiffusionModel: Send + Sync {
    /// Move all weights to `device`.
    fn to_device(&mut self, device: &Device) -> Result<()>;

    /// Apply an optional ahead-of-time optimization.
    ///
    /// Implementations must leave the model usable and unchanged on error.
    fn optimize(&mut self) -> Result<()>;

    /// Switch to inference-only mode.
    fn eval(&mut self);

    /// Run conditioned sampling. Returns audio shaped `[batch, channels, frames]`.
    fn generate(&self, request: &DiffusionRequest) -> Result<Tensor>;
}

/// Acquires a model and its configuration.
pub trait ModelSource: Send + Sync {
    fn fetch(&self, model_id: &str) -> Result<(Box<dyn DiffusionModel>, ModelConfig)>;
}

/// Return the preferred device: CUDA if available, otherwise CPU.
pub fn preferred_device(cuda_ordinal: usize) -> Device {
    Device::cuda_if_available(cuda_ordinal).unwrap_or(Device::Cpu)
}
