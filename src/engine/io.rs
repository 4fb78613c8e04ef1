//! Audio file I/O for Louder
//!
//! WAV import/export for the offline renderer. Audio is kept at its native
//! sample rate; the pipeline is prepared for whatever rate the file has.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;

use crate::engine::buffer::{AudioBuffer, ChannelLayout, MAX_CHANNELS};
use crate::error::{LouderError, Result};

/// Export format configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportFormat {
    /// Bit depth: 16, 24, or 32 (32 is written as float)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::float32()
    }
}

impl ExportFormat {
    /// 16-bit integer PCM
    pub fn pcm16() -> Self {
        ExportFormat { bit_depth: 16 }
    }

    /// 24-bit integer PCM
    pub fn pcm24() -> Self {
        ExportFormat { bit_depth: 24 }
    }

    /// 32-bit float, no quantisation of the processed signal
    pub fn float32() -> Self {
        ExportFormat { bit_depth: 32 }
    }
}

/// Import a mono or stereo WAV file as 32-bit float
///
/// # Errors
/// * `Wav` - If the file cannot be opened or decoded
/// * `UnsupportedFormat` - For more than two channels or odd bit depths
/// * `EmptyAudio` - If the file holds no frames
pub fn import_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let layout = ChannelLayout::from_count(channels).ok_or_else(|| {
        LouderError::UnsupportedFormat {
            format: format!("{}-channel audio (only mono/stereo supported)", channels),
        }
    })?;

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    if interleaved.is_empty() {
        return Err(LouderError::EmptyAudio);
    }

    debug!(
        "Imported {}: {} Hz, {} ch, {}-bit {:?}",
        path.display(),
        spec.sample_rate,
        channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    AudioBuffer::from_interleaved(&interleaved, layout, spec.sample_rate)
}

/// Export an AudioBuffer to a WAV file at the buffer's sample rate
pub fn export_wav(buffer: &AudioBuffer, path: &Path, format: ExportFormat) -> Result<()> {
    if buffer.num_channels() == 0 || buffer.num_channels() > MAX_CHANNELS {
        return Err(LouderError::UnsupportedFormat {
            format: format!("{}-channel audio", buffer.num_channels()),
        });
    }

    if !matches!(format.bit_depth, 16 | 24 | 32) {
        return Err(LouderError::UnsupportedFormat {
            format: format!("{}-bit audio (only 16, 24, 32 supported)", format.bit_depth),
        });
    }

    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate,
        bits_per_sample: format.bit_depth,
        sample_format: if format.bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let interleaved = buffer.to_interleaved();
    let mut writer = WavWriter::create(path, spec)?;

    match format.bit_depth {
        16 => {
            for sample in interleaved {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled)?;
            }
        }
        24 => {
            for sample in interleaved {
                // 24-bit stored as i32 in hound
                let scaled = (sample * 8388607.0).clamp(-8388608.0, 8388607.0) as i32;
                writer.write_sample(scaled)?;
            }
        }
        _ => {
            for sample in interleaved {
                writer.write_sample(sample)?;
            }
        }
    }

    writer.finalize()?;
    debug!("Exported {} ({}-bit)", path.display(), format.bit_depth);
    Ok(())
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    let samples: Vec<f32> = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => reader.samples::<f32>().collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / 128.0))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8388608.0))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2147483648.0))
            .collect::<std::result::Result<_, _>>()?,
        (SampleFormat::Int, bits) => {
            return Err(LouderError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits),
            })
        }
    };
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use tempfile::tempdir;

    fn ramp_buffer() -> AudioBuffer {
        let left: Vec<f32> = (0..100).map(|i| i as f32 / 100.0).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        AudioBuffer::from_channels(vec![left, right], 48000).unwrap()
    }

    #[test]
    fn test_float_roundtrip_is_exact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let buffer = ramp_buffer();

        export_wav(&buffer, &path, ExportFormat::float32()).unwrap();
        let loaded = import_wav(&path).unwrap();

        assert_eq!(loaded, buffer);
    }

    #[test]
    fn test_pcm16_roundtrip_within_quantisation() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pcm16.wav");
        let buffer = ramp_buffer();

        export_wav(&buffer, &path, ExportFormat::pcm16()).unwrap();
        let loaded = import_wav(&path).unwrap();

        assert_eq!(loaded.sample_rate, 48000);
        for (a, b) in loaded.samples.iter().flatten().zip(buffer.samples.iter().flatten()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_export_rejects_bad_bit_depth() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.wav");
        let result = export_wav(&ramp_buffer(), &path, ExportFormat { bit_depth: 12 });
        assert!(matches!(result, Err(LouderError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_import_rejects_surround() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("three.wav");
        let spec = WavSpec {
            channels: 3,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..30 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let result = import_wav(&path);
        assert!(matches!(result, Err(LouderError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_import_missing_file() {
        let result = import_wav(Path::new("/nonexistent/louder.wav"));
        assert!(matches!(result, Err(LouderError::Wav(_))));
    }
}
