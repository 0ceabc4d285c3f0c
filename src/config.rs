//! Model configuration and the fixed generation settings of the demo.
//!
//! [`ModelConfig`] mirrors the `model_config.json` shipped with Stable Audio
//! checkpoints; only the fields the demo needs are read, everything else is
//! ignored by serde.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default checkpoint fetched at startup.
pub const DEFAULT_MODEL_ID: &str = "stabilityai/stable-audio-open-1.0";

/// Lower bound of the diffusion noise schedule.
pub const SIGMA_MIN: f64 = 0.3;

/// Upper bound of the diffusion noise schedule.
pub const SIGMA_MAX: f64 = 500.0;

/// Durations above this many seconds log a slow-generation warning.
pub const LONG_DURATION_WARNING_S: u32 = 20;

/// Subset of a Stable Audio `model_config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub sample_rate: u32,
    pub sample_size: usize,

    #[serde(default)]
    pub model_type: Option<String>,

    #[serde(default)]
    pub audio_channels: Option<u16>,
}

impl ModelConfig {
    /// Parse a `model_config.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Extract the parameters the gate needs, rejecting zero values.
    pub fn parameters(&self) -> Result<ModelParameters> {
        if self.sample_rate == 0 {
            return Err(Error::Config("sample_rate must be positive".into()));
        }
        if self.sample_size == 0 {
            return Err(Error::Config("sample_size must be positive".into()));
        }
        Ok(ModelParameters {
            sample_rate: self.sample_rate,
            sample_size: self.sample_size,
        })
    }
}

/// Sample rate and conditioning window length of the loaded model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelParameters {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Length of the generated window in samples.
    pub sample_size: usize,
}

/// Diffusion sampler variant passed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerType {
    /// DPM++ 3M SDE, one of the fastest samplers for this model family.
    #[default]
    DpmPp3mSde,
}

impl SamplerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SamplerType::DpmPp3mSde => "dpmpp-3m-sde",
        }
    }
}

impl std::fmt::Display for SamplerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounds, default and slider step of one UI input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputRange<T> {
    pub min: T,
    pub max: T,
    pub default: T,
    pub step: T,
}

impl<T: PartialOrd + Copy> InputRange<T> {
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Duration in seconds.
pub const DURATION_S: InputRange<u32> = InputRange {
    min: 5,
    max: 47,
    default: 15,
    step: 1,
};

/// Number of diffusion steps.
pub const STEPS: InputRange<u32> = InputRange {
    min: 20,
    max: 200,
    default: 50,
    step: 5,
};

/// Classifier-free guidance scale.
pub const CFG_SCALE: InputRange<f64> = InputRange {
    min: 1.0,
    max: 15.0,
    default: 7.0,
    step: 0.1,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stable_audio_config() {
        let json = r#"{
            "model_type": "diffusion_cond",
            "sample_size": 2097152,
            "sample_rate": 44100,
            "audio_channels": 2,
            "model": { "pretransform": { "type": "autoencoder" } }
        }"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.model_type.as_deref(), Some("diffusion_cond"));
        assert_eq!(config.audio_channels, Some(2));

        let params = config.parameters().unwrap();
        assert_eq!(params.sample_rate, 44100);
        assert_eq!(params.sample_size, 2097152);
    }

    #[test]
    fn test_missing_sample_rate_is_rejected() {
        let json = r#"{ "sample_size": 1024 }"#;
        assert!(serde_json::from_str::<ModelConfig>(json).is_err());
    }

    #[test]
    fn test_zero_parameters_are_rejected() {
        let config = ModelConfig {
            sample_rate: 0,
            sample_size: 1024,
            model_type: None,
            audio_channels: None,
        };
        assert!(matches!(config.parameters(), Err(Error::Config(_))));

        let config = ModelConfig {
            sample_rate: 44100,
            sample_size: 0,
            model_type: None,
            audio_channels: None,
        };
        assert!(matches!(config.parameters(), Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model_config.json");
        std::fs::write(&path, r#"{"sample_rate": 48000, "sample_size": 65536}"#).unwrap();
        let config = ModelConfig::from_file(&path).unwrap();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.audio_channels, None);
    }

    #[test]
    fn test_input_ranges() {
        assert!(DURATION_S.contains(DURATION_S.default));
        assert!(DURATION_S.contains(47));
        assert!(!DURATION_S.contains(48));
        assert!(!STEPS.contains(10));
        assert!(CFG_SCALE.contains(1.0));
        assert!(!CFG_SCALE.contains(15.5));
    }

    #[test]
    fn test_sampler_name() {
        assert_eq!(SamplerType::default().to_string(), "dpmpp-3m-sde");
    }
}
