//! Model output → 16-bit PCM.
//!
//! The model returns `[batch, channels, frames]`. Batches are concatenated
//! along time (`b d n -> d (b n)`), frames are interleaved across channels,
//! the result is peak-normalized and quantized to `i16` by truncation.

use candle_core::{DType, Device, Tensor};

use crate::{Error, Result};

/// Interleaved 16-bit PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pcm16 {
    pub samples: Vec<i16>,
    pub channels: u16,
}

impl Pcm16 {
    /// Frames per channel.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }
}

/// Full post-processing chain for one model output.
pub fn to_pcm16(output: &Tensor) -> Result<Pcm16> {
    let (mut samples, channels) = interleave(output)?;
    peak_normalize(&mut samples);
    Ok(Pcm16 {
        samples: quantize_i16(&samples),
        channels,
    })
}

/// Flatten `[batch, channels, frames]` into interleaved f32 samples.
///
/// Returns the samples and the channel count.
pub fn interleave(output: &Tensor) -> Result<(Vec<f32>, u16)> {
    let (batch, channels, frames) = output.dims3()?;
    if channels == 0 || channels > u16::MAX as usize {
        return Err(Error::Audio(format!("unsupported channel count {channels}")));
    }
    // [b, d, n] -> [d, b*n] -> [b*n, d]
    let samples = output
        .to_device(&Device::Cpu)?
        .to_dtype(DType::F32)?
        .permute((1, 0, 2))?
        .contiguous()?
        .reshape((channels, batch * frames))?
        .t()?
        .contiguous()?
        .flatten_all()?
        .to_vec1::<f32>()?;
    Ok((samples, channels as u16))
}

/// Scale so the largest absolute sample is 1.0, then clamp to [-1, 1].
///
/// Silence (peak 0) is left untouched.
pub fn peak_normalize(samples: &mut [f32]) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);
    if peak > 0.0 {
        for s in samples.iter_mut() {
            *s = (*s / peak).clamp(-1.0, 1.0);
        }
    }
}

/// Multiply by 32767 and truncate toward zero.
pub fn quantize_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s * i16::MAX as f32) as i16)
        .collect()
}
