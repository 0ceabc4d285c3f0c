//! Web demo for text-conditioned audio diffusion.
//!
//! Serves a pretrained Stable Audio model behind a small web UI. The model is
//! loaded in the background at startup; the UI is available immediately and
//! generation requests are rejected until the model is ready.
//!
//! ## Architecture
//!
//! ```text
//!   ModelSource ──fetch──▶ ModelLoader ──publish──▶ ModelRuntime
//!                          (blocking task)          (readiness + model)
//!                                                        │
//!   HTTP ──▶ server ──▶ GenerationGate ──generate──▶ DiffusionModel
//!                            │
//!                            └─▶ post-process ─▶ ArtifactStore (WAV)
//! ```
//!
//! ## Modules
//!
//! - [`runtime`]: readiness state and the published model
//! - [`loader`]: background model acquisition and preparation
//! - [`gate`]: admission control and the generation pipeline
//! - [`model`]: collaborator traits and the Hugging Face Hub source
//! - [`audio`]: peak normalization, 16-bit quantization, WAV output
//! - [`artifact`]: unique output files
//! - [`server`]: axum routes and the web page

pub mod artifact;
pub mod audio;
pub mod config;
pub mod gate;
pub mod loader;
pub mod model;
pub mod runtime;
pub mod server;

mod error;
#[cfg(test)]
mod testing;

pub use error::{Error, Result};
