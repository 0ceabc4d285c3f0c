//! Generation gate: admission control for generation requests.
//!
//! Every request from the web layer goes through [`GenerationGate::generate`].
//! While the model is not ready the request is rejected immediately, without
//! waiting or queuing. Otherwise the gate builds the conditioning, runs the
//! model, post-processes the waveform, and writes a WAV artifact.
//!
//! `generate` is blocking and can take tens of seconds; call it from a
//! blocking worker. Failures are returned as [`GenerationResult`] values, never
//! as errors or panics of the gate itself.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::Result;
use crate::artifact::ArtifactStore;
use crate::audio::to_pcm16;
use crate::config::{LONG_DURATION_WARNING_S, SIGMA_MAX, SIGMA_MIN, SamplerType};
use crate::model::{Conditioning, DiffusionRequest};
use crate::runtime::{LoadedModel, ModelRuntime, ReadinessState};

const MSG_SUCCESS: &str = "✅ Audio generated successfully!";
const MSG_NOT_READY: &str = "❌ Model is still loading. Please wait a moment and try again.";

/// Model status as shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    NotReady,
    Loading,
    Ready,
}

impl GateStatus {
    pub fn message(&self) -> &'static str {
        match self {
            GateStatus::Ready => "✅ Model ready! You can generate audio now.",
            GateStatus::Loading => "⏳ Loading model... Please wait.",
            GateStatus::NotReady => "❌ Model not loaded yet.",
        }
    }
}

impl From<ReadinessState> for GateStatus {
    fn from(state: ReadinessState) -> Self {
        match state {
            ReadinessState::NotStarted => GateStatus::NotReady,
            ReadinessState::Loading => GateStatus::Loading,
            ReadinessState::Ready => GateStatus::Ready,
        }
    }
}

/// One user submission.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub duration_s: u32,
    pub steps: u32,
    pub cfg_scale: f64,
}

/// Outcome of [`GenerationGate::generate`].
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Generated { path: PathBuf, message: String },
    /// The model was not ready; nothing was attempted.
    NotReady { message: String },
    Failed { message: String },
}

impl GenerationResult {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            GenerationResult::Generated { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            GenerationResult::Generated { message, .. }
            | GenerationResult::NotReady { message }
            | GenerationResult::Failed { message } => message,
        }
    }
}

#[derive(Clone)]
pub struct GenerationGate {
    runtime: Arc<ModelRuntime>,
    store: ArtifactStore,
}

impl GenerationGate {
    pub fn new(runtime: Arc<ModelRuntime>, store: ArtifactStore) -> Self {
        Self { runtime, store }
    }

    pub fn status(&self) -> GateStatus {
        self.runtime.state().into()
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    pub fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let Some(loaded) = self.runtime.loaded() else {
            tracing::info!(status = ?self.status(), "generation rejected, model not ready");
            return GenerationResult::NotReady {
                message: MSG_NOT_READY.to_string(),
            };
        };

        match self.run(loaded, request) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "audio saved");
                GenerationResult::Generated {
                    path,
                    message: MSG_SUCCESS.to_string(),
                }
            }
            Err(error) => {
                tracing::error!(%error, "generation failed");
                GenerationResult::Failed {
                    message: format!("❌ Error generating audio: {error}"),
                }
            }
        }
    }

    fn run(&self, loaded: &LoadedModel, request: &GenerationRequest) -> Result<PathBuf> {
        let conditioning = vec![Conditioning {
            prompt: request.prompt.clone(),
            seconds_start: 0.0,
            seconds_total: request.duration_s as f64,
        }];

        if request.duration_s > LONG_DURATION_WARNING_S {
            tracing::warn!(
                duration_s = request.duration_s,
                "long audio generation (>{LONG_DURATION_WARNING_S}s) may be slow, consider a shorter duration"
            );
        }

        tracing::info!(
            duration_s = request.duration_s,
            steps = request.steps,
            cfg_scale = request.cfg_scale,
            "generating audio"
        );

        let diffusion = DiffusionRequest {
            steps: request.steps as usize,
            cfg_scale: request.cfg_scale,
            conditioning,
            sample_size: loaded.parameters.sample_size,
            sigma_min: SIGMA_MIN,
            sigma_max: SIGMA_MAX,
            sampler: SamplerType::DpmPp3mSde,
            device: loaded.device.clone(),
        };
        let output = loaded.model.generate(&diffusion)?;
        let pcm = to_pcm16(&output)?;
        self.store.persist(&pcm, loaded.parameters.sample_rate)
    }
}
