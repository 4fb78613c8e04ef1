//! Audio Buffer Management
//!
//! Provides the planar audio buffer the block pipeline processes in place,
//! plus the level helpers shared by the DSP stages and the meters.

use crate::error::{LouderError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default sample rate for buffers created without an explicit rate
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Maximum channel count the processing core handles (stereo)
pub const MAX_CHANNELS: usize = 2;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
///
/// # Arguments
/// * `db` - Value in decibels
///
/// # Returns
/// Linear amplitude (0.0 to 1.0+ range)
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Peak magnitude of a slice of samples (0.0 for an empty slice)
#[inline]
pub fn peak_magnitude(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0_f32, |peak, &s| peak.max(s.abs()))
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Planar block of 32-bit float samples
///
/// Each channel is a separate `Vec<f32>`; all channels have the same length.
/// A buffer may have zero channels or zero samples, which the pipeline
/// treats as a no-op block.
///
/// # Example
/// ```
/// use louder::engine::{AudioBuffer, ChannelLayout};
///
/// let buffer = AudioBuffer::new(512, ChannelLayout::Stereo);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_samples(), 512);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    pub samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a zeroed buffer with the given number of samples and layout
    pub fn new(num_samples: usize, layout: ChannelLayout) -> Self {
        Self::with_channels(layout.num_channels(), num_samples)
    }

    /// Create a zeroed buffer with an arbitrary channel count (including zero)
    pub fn with_channels(num_channels: usize, num_samples: usize) -> Self {
        Self {
            samples: vec![vec![0.0_f32; num_samples]; num_channels],
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    /// Create a buffer from per-channel sample vectors
    ///
    /// Fails if the channels differ in length.
    pub fn from_channels(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if let Some(first) = samples.first() {
            let len = first.len();
            if samples.iter().any(|ch| ch.len() != len) {
                return Err(LouderError::InvalidAudio {
                    reason: "channels have different lengths".to_string(),
                });
            }
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Create an audio buffer from interleaved sample data
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();

        if interleaved.len() % num_channels != 0 {
            return Err(LouderError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];

        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Convert the buffer to interleaved format (L, R, L, R, ...)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let num_channels = self.num_channels();
        let num_samples = self.num_samples();
        let mut interleaved = Vec::with_capacity(num_channels * num_samples);

        for sample_idx in 0..num_samples {
            for channel in &self.samples {
                interleaved.push(channel[sample_idx]);
            }
        }

        interleaved
    }

    /// Get the number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// True when the buffer holds no channels or no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_channels() == 0 || self.num_samples() == 0
    }

    /// Immutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Mutable access to a channel's samples
    ///
    /// # Panics
    /// Panics if the channel index is out of bounds
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Mutable access to the left and right channels at once
    ///
    /// Returns None for buffers with fewer than two channels.
    #[inline]
    pub fn stereo_mut(&mut self) -> Option<(&mut [f32], &mut [f32])> {
        match self.samples.as_mut_slice() {
            [left, right, ..] => Some((left.as_mut_slice(), right.as_mut_slice())),
            _ => None,
        }
    }

    /// Get a sample, or None if indices are out of bounds
    #[inline]
    pub fn get_sample(&self, channel: usize, index: usize) -> Option<f32> {
        self.samples
            .get(channel)
            .and_then(|ch| ch.get(index).copied())
    }

    /// Set a sample; returns false if indices are out of bounds
    #[inline]
    pub fn set_sample(&mut self, channel: usize, index: usize, value: f32) -> bool {
        if let Some(sample) = self.samples.get_mut(channel).and_then(|ch| ch.get_mut(index)) {
            *sample = value;
            return true;
        }
        false
    }

    /// Set every sample in every channel to `value`
    pub fn fill(&mut self, value: f32) {
        for channel in &mut self.samples {
            channel.fill(value);
        }
    }

    /// Multiply every sample by a linear gain
    pub fn apply_gain(&mut self, gain: f32) {
        for channel in &mut self.samples {
            for sample in channel.iter_mut() {
                *sample *= gain;
            }
        }
    }

    /// Peak magnitude of one channel
    pub fn channel_peak(&self, channel: usize) -> f32 {
        self.samples
            .get(channel)
            .map(|ch| peak_magnitude(ch))
            .unwrap_or(0.0)
    }

    /// Peak magnitude over all channels
    pub fn peak(&self) -> f32 {
        (0..self.num_channels())
            .map(|ch| self.channel_peak(ch))
            .fold(0.0_f32, f32::max)
    }

    /// Check that every sample is finite
    pub fn is_finite(&self) -> bool {
        self.samples.iter().flatten().all(|s| s.is_finite())
    }

    /// Append `num_samples` of silence to every channel
    pub fn extend_silence(&mut self, num_samples: usize) {
        for channel in &mut self.samples {
            channel.resize(channel.len() + num_samples, 0.0);
        }
    }

    /// Load `len` frames of `src` starting at `offset` into this buffer
    ///
    /// The channel count is matched to `src`. Frames past the end of `src`
    /// read as silence. Channel storage is reused once it has grown.
    pub fn copy_range_from(&mut self, src: &AudioBuffer, offset: usize, len: usize) {
        self.samples.resize_with(src.num_channels(), Vec::new);
        self.sample_rate = src.sample_rate;

        for (dst, src_ch) in self.samples.iter_mut().zip(&src.samples) {
            dst.clear();
            let start = offset.min(src_ch.len());
            let end = (offset + len).min(src_ch.len());
            dst.extend_from_slice(&src_ch[start..end]);
            dst.resize(len, 0.0);
        }
    }

    /// Write this buffer into `dst` starting at frame `offset`
    ///
    /// Frames that would land past the end of `dst` are dropped.
    pub fn copy_range_into(&self, dst: &mut AudioBuffer, offset: usize) {
        for (src_ch, dst_ch) in self.samples.iter().zip(dst.samples.iter_mut()) {
            if offset >= dst_ch.len() {
                continue;
            }
            let len = src_ch.len().min(dst_ch.len() - offset);
            dst_ch[offset..offset + len].copy_from_slice(&src_ch[..len]);
        }
    }
}

impl Default for AudioBuffer {
    fn default() -> Self {
        Self::new(0, ChannelLayout::Stereo)
    }
}

// ============================================================================
// Tests
// ============================================================================
