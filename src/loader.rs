//! Model loader: fetches and prepares the model off the request path.
//!
//! [`ModelLoader::start`] marks the runtime as loading, then runs the load on
//! a dedicated blocking thread and returns immediately. The sequence is:
//!
//! 1. fetch the model and its configuration from the [`ModelSource`]
//! 2. read [`ModelParameters`](crate::config::ModelParameters) from the config
//! 3. move the model to the compute device
//! 4. try the optional optimization pass; on failure keep the unoptimized model
//! 5. switch to inference mode and publish, which flips the state to `Ready`
//!
//! A failure in steps 1–3 ends the attempt: the error is logged and the
//! runtime stays at `Loading`. There is no retry. A panic inside the load is
//! caught and reported the same way.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stable_audio_demo::loader::{LoaderConfig, ModelLoader};
//! use stable_audio_demo::model::hub::HubModelSource;
//! use stable_audio_demo::runtime::ModelRuntime;
//!
//! #[tokio::main]
//! async fn main() {
//!     let runtime = Arc::new(ModelRuntime::new());
//!     let loader = ModelLoader::new(runtime.clone(), Arc::new(HubModelSource), LoaderConfig::default());
//!     let _handle = loader.start().unwrap();
//!     runtime.wait_ready().await;
//! }
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use candle_core::Device;
use tokio::task::JoinHandle;

use crate::config::DEFAULT_MODEL_ID;
use crate::model::{ModelSource, preferred_device};
use crate::runtime::{LoadedModel, ModelRuntime};
use crate::{Error, Result};

/// Configuration for the model loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Model identifier passed to the [`ModelSource`].
    pub model_id: String,

    /// CUDA device ordinal (0 = first GPU). Ignored when CUDA is unavailable.
    pub cuda_device: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            cuda_device: 0,
        }
    }
}

pub struct ModelLoader {
    runtime: Arc<ModelRuntime>,
    source: Arc<dyn ModelSource>,
    model_id: String,
    device: Device,
}

impl ModelLoader {
    pub fn new(runtime: Arc<ModelRuntime>, source: Arc<dyn ModelSource>, config: LoaderConfig) -> Self {
        Self {
            runtime,
            source,
            device: preferred_device(config.cuda_device),
            model_id: config.model_id,
        }
    }

    /// Override the device picked from the config.
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Begin loading in the background.
    ///
    /// The runtime is `Loading` when this returns. Fails if this runtime was
    /// already handed to another loader. Must be called within a tokio runtime.
    pub fn start(self) -> Result<LoaderHandle> {
        self.runtime.begin_loading()?;
        tracing::info!(model_id = %self.model_id, device = ?self.device, "loading model in background");
        let handle = tokio::task::spawn_blocking(move || {
            let model_id = self.model_id.clone();
            panic::catch_unwind(AssertUnwindSafe(|| self.run())).unwrap_or_else(|payload| {
                let reason = panic_reason(payload.as_ref());
                tracing::error!(%model_id, reason, "model loading panicked, status stays at loading");
                Err(Error::Loader(format!("model loading panicked: {reason}")))
            })
        });
        Ok(LoaderHandle { handle })
    }

    fn run(self) -> Result<()> {
        match load_model(self.source.as_ref(), &self.model_id, &self.device) {
            Ok(loaded) => {
                self.runtime.publish(loaded)?;
                tracing::info!(model_id = %self.model_id, "model loaded and ready");
                Ok(())
            }
            Err(error) => {
                tracing::error!(%error, model_id = %self.model_id, "error loading model, status stays at loading");
                Err(error)
            }
        }
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn load_model(source: &dyn ModelSource, model_id: &str, device: &Device) -> Result<LoadedModel> {
    let (mut model, config) = source.fetch(model_id)?;
    let parameters = config.parameters()?;
    tracing::info!(
        sample_rate = parameters.sample_rate,
        sample_size = parameters.sample_size,
        "model config read"
    );

    model.to_device(device)?;

    tracing::info!("optimizing model");
    match model.optimize() {
        Ok(()) => tracing::info!("model optimized"),
        Err(error) => tracing::warn!(%error, "model optimization failed, using original model"),
    }

    model.eval();

    Ok(LoadedModel {
        model,
        parameters,
        device: device.clone(),
    })
}

/// Handle to the background load. Dropping it detaches the task.
pub struct LoaderHandle {
    handle: JoinHandle<Result<()>>,
}

impl LoaderHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the load attempt and return its outcome.
    pub async fn join(self) -> Result<()> {
        self.handle
            .await
            .map_err(|join_error| Error::Loader(format!("model load task panicked: {join_error}")))?
    }
}
