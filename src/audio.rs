//! Audio utilities.
//!
//! Post-processing of raw model output into 16-bit PCM, and WAV output.

pub mod postprocess;
mod wav;

pub use postprocess::{Pcm16, to_pcm16};
pub use wav::write_wav_i16;
