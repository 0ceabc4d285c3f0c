//! WAV file output.

use crate::Result;
use std::path::Path;

/// Write interleaved 16-bit samples as a PCM WAV file.
pub fn write_wav_i16(
    path: impl AsRef<Path>,
    samples: &[i16],
    sample_rate: u32,
    num_channels: u16,
) -> Result<()> {
    let spec = hound::WavSpec {
        channels: num_channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}
