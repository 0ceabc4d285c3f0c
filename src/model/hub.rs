//! Hugging Face Hub model source.
//!
//! Downloads `model_config.json` and `model.safetensors` for a checkpoint and
//! loads the tensors with candle. The checkpoint is held as a flat tensor map;
//! there is no diffusion network in this crate, so [`CheckpointModel::generate`]
//! reports the sampler as unavailable.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use hf_hub::api::sync::Api;

use super::{DiffusionModel, DiffusionRequest, ModelSource};
use crate::config::ModelConfig;
use crate::{Error, Result};

const CONFIG_FILE: &str = "model_config.json";
const WEIGHTS_FILE: &str = "model.safetensors";

/// Fetches checkpoints from the Hugging Face Hub cache (downloading on first use).
#[derive(Debug, Default, Clone)]
pub struct HubModelSource;

impl ModelSource for HubModelSource {
    fn fetch(&self, model_id: &str) -> Result<(Box<dyn DiffusionModel>, ModelConfig)> {
        let api = Api::new()?;
        let repo = api.model(model_id.to_string());

        tracing::info!(model_id, "fetching model config");
        let config_path = repo.get(CONFIG_FILE)?;
        let config = ModelConfig::from_file(&config_path)?;

        tracing::info!(model_id, "fetching model weights");
        let weights_path = repo.get(WEIGHTS_FILE)?;
        let model = CheckpointModel::load(model_id, &weights_path)?;

        Ok((Box::new(model), config))
    }
}

/// A checkpoint loaded as named tensors.
pub struct CheckpointModel {
    model_id: String,
    weights: HashMap<String, Tensor>,
    device: Device,
    inference: bool,
}

impl CheckpointModel {
    /// Load all tensors from a safetensors file onto the CPU.
    pub fn load(model_id: &str, path: &Path) -> Result<Self> {
        let weights = candle_core::safetensors::load(path, &Device::Cpu)
            .map_err(|e| Error::WeightLoad(format!("{}: {e}", path.display())))?;
        tracing::info!(tensors = weights.len(), "checkpoint loaded");
        Ok(Self::from_tensors(model_id, weights))
    }

    pub fn from_tensors(model_id: &str, weights: HashMap<String, Tensor>) -> Self {
        Self {
            model_id: model_id.to_string(),
            weights,
            device: Device::Cpu,
            inference: false,
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn is_inference(&self) -> bool {
        self.inference
    }

    pub fn tensor(&self, name: &str) -> Option<&Tensor> {
        self.weights.get(name)
    }
}

impl DiffusionModel for CheckpointModel {
    fn to_device(&mut self, device: &Device) -> Result<()> {
        for tensor in self.weights.values_mut() {
            *tensor = tensor.to_device(device)?;
        }
        self.device = device.clone();
        Ok(())
    }

    /// Cast floating point weights to f16. Only worthwhile (and only
    /// attempted) on CUDA.
    fn optimize(&mut self) -> Result<()> {
        if !self.device.is_cuda() {
            return Err(Error::Optimize(
                "half-precision weights require a CUDA device".into(),
            ));
        }
        // Convert into a new map so a failure leaves the weights untouched.
        let mut converted = HashMap::with_capacity(self.weights.len());
        for (name, tensor) in &self.weights {
            let tensor = if tensor.dtype().is_float() {
                tensor.to_dtype(DType::F16)?
            } else {
                tensor.clone()
            };
            converted.insert(name.clone(), tensor);
        }
        self.weights = converted;
        Ok(())
    }

    fn eval(&mut self) {
        self.inference = true;
    }

    fn generate(&self, request: &DiffusionRequest) -> Result<Tensor> {
        Err(Error::Sampler(format!(
            "{} sampling is not available for checkpoint '{}'",
            request.sampler, self.model_id
        )))
    }
}
