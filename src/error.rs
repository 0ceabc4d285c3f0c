//! Error types for stable-audio-demo.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Candle tensor/device error.
    #[error("candle: {0}")]
    Candle(#[from] candle_core::Error),

    /// Audio post-processing or WAV I/O error.
    #[error("audio: {0}")]
    Audio(String),

    /// Model weight loading error.
    #[error("weight loading: {0}")]
    WeightLoad(String),

    /// Invalid or incomplete model configuration.
    #[error("config: {0}")]
    Config(String),

    /// I/O error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// HuggingFace Hub error.
    #[error("hf-hub: {0}")]
    HfHub(String),

    /// The optional optimization pass could not be applied.
    #[error("optimize: {0}")]
    Optimize(String),

    /// The diffusion sampler failed or is unavailable.
    #[error("sampler: {0}")]
    Sampler(String),

    /// Model loader lifecycle error.
    #[error("loader: {0}")]
    Loader(String),
}

impl From<hound::Error> for Error {
    fn from(error: hound::Error) -> Self {
        Error::Audio(error.to_string())
    }
}

impl From<hf_hub::api::sync::ApiError> for Error {
    fn from(error: hf_hub::api::sync::ApiError) -> Self {
        Error::HfHub(error.to_string())
    }
}
