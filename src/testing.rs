//! Stub collaborators shared by unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};

use candle_core::{Device, Tensor};

use crate::config::{ModelConfig, ModelParameters};
use crate::model::{DiffusionModel, DiffusionRequest, ModelSource};
use crate::runtime::{LoadedModel, ModelRuntime};
use crate::{Error, Result};

pub const TEST_PARAMETERS: ModelParameters = ModelParameters {
    sample_rate: 8000,
    sample_size: 400,
};

/// What the stub does when asked to generate.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Stereo tone with peak 0.5.
    Tone,
    /// All-zero stereo output.
    Silence,
    /// Return a sampler error with this text.
    Fail(String),
}

/// Observations recorded by a [`StubModel`].
#[derive(Default)]
pub struct ModelCalls {
    pub generate_calls: AtomicUsize,
    pub to_device_calls: AtomicUsize,
    pub optimized: AtomicBool,
    pub inference: AtomicBool,
    pub last_request: Mutex<Option<DiffusionRequest>>,
}

impl ModelCalls {
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }
}

pub struct StubModel {
    calls: Arc<ModelCalls>,
    behavior: Behavior,
    fail_optimize: bool,
    fail_to_device: bool,
}

impl StubModel {
    pub fn with_behavior(behavior: Behavior) -> (Self, Arc<ModelCalls>) {
        let calls = Arc::new(ModelCalls::default());
        let model = Self {
            calls: calls.clone(),
            behavior,
            fail_optimize: false,
            fail_to_device: false,
        };
        (model, calls)
    }

    pub fn tone() -> (Self, Arc<ModelCalls>) {
        Self::with_behavior(Behavior::Tone)
    }

    pub fn failing(message: &str) -> (Self, Arc<ModelCalls>) {
        Self::with_behavior(Behavior::Fail(message.to_string()))
    }

    pub fn failing_optimize(mut self) -> Self {
        self.fail_optimize = true;
        self
    }

    pub fn failing_to_device(mut self) -> Self {
        self.fail_to_device = true;
        self
    }
}

impl DiffusionModel for StubModel {
    fn to_device(&mut self, _device: &Device) -> Result<()> {
        self.calls.to_device_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_to_device {
            return Err(Error::Loader("stub device transfer failed".into()));
        }
        Ok(())
    }

    fn optimize(&mut self) -> Result<()> {
        if self.fail_optimize {
            return Err(Error::Optimize("stub compiler exploded".into()));
        }
        self.calls.optimized.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn eval(&mut self) {
        self.calls.inference.store(true, Ordering::SeqCst);
    }

    fn generate(&self, request: &DiffusionRequest) -> Result<Tensor> {
        self.calls.generate_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.calls.last_request.lock() {
            *last = Some(request.clone());
        }
        let frames = request.sample_size;
        match &self.behavior {
            Behavior::Tone => {
                let mut data = Vec::with_capacity(2 * frames);
                for channel in 0..2 {
                    for i in 0..frames {
                        let phase = i as f32 / 20.0 + channel as f32;
                        data.push(0.5 * phase.sin());
                    }
                }
                Ok(Tensor::from_vec(data, (1, 2, frames), &Device::Cpu)?)
            }
            Behavior::Silence => Ok(Tensor::zeros((1, 2, frames), candle_core::DType::F32, &Device::Cpu)?),
            Behavior::Fail(message) => Err(Error::Sampler(message.clone())),
        }
    }
}

/// Source handing out one prepared [`StubModel`].
pub struct StubSource {
    model: Mutex<Option<StubModel>>,
    config: ModelConfig,
    fail_fetch: Option<String>,
    panic_fetch: Option<String>,
    release: Option<Mutex<mpsc::Receiver<()>>>,
}

impl StubSource {
    pub fn new(model: StubModel) -> Self {
        Self {
            model: Mutex::new(Some(model)),
            config: test_config(),
            fail_fetch: None,
            panic_fetch: None,
            release: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        let (model, _calls) = StubModel::tone();
        Self {
            fail_fetch: Some(message.to_string()),
            ..Self::new(model)
        }
    }

    pub fn panicking(message: &str) -> Self {
        let (model, _calls) = StubModel::tone();
        Self {
            panic_fetch: Some(message.to_string()),
            ..Self::new(model)
        }
    }

    pub fn with_config(mut self, config: ModelConfig) -> Self {
        self.config = config;
        self
    }

    /// Block `fetch` until the returned sender fires (or is dropped).
    pub fn gated(mut self) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        self.release = Some(Mutex::new(rx));
        (self, tx)
    }
}

impl ModelSource for StubSource {
    fn fetch(&self, _model_id: &str) -> Result<(Box<dyn DiffusionModel>, ModelConfig)> {
        if let Some(release) = &self.release
            && let Ok(rx) = release.lock()
        {
            let _ = rx.recv();
        }
        if let Some(message) = &self.panic_fetch {
            panic!("{message}");
        }
        if let Some(message) = &self.fail_fetch {
            return Err(Error::HfHub(message.clone()));
        }
        let model = self
            .model
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or_else(|| Error::Loader("stub model already taken".into()))?;
        Ok((Box::new(model), self.config.clone()))
    }
}

pub fn test_config() -> ModelConfig {
    ModelConfig {
        sample_rate: TEST_PARAMETERS.sample_rate,
        sample_size: TEST_PARAMETERS.sample_size,
        model_type: Some("diffusion_cond".into()),
        audio_channels: Some(2),
    }
}

pub fn loaded_model(model: StubModel) -> LoadedModel {
    LoadedModel {
        model: Box::new(model),
        parameters: TEST_PARAMETERS,
        device: Device::Cpu,
    }
}

/// A runtime that already reached `Ready` with `model`.
pub fn ready_runtime(model: StubModel) -> Arc<ModelRuntime> {
    let runtime = Arc::new(ModelRuntime::new());
    runtime.begin_loading().expect("fresh runtime");
    runtime.publish(loaded_model(model)).expect("loading runtime");
    runtime
}
