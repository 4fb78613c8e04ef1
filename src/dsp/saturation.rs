//! Saturation Effect
//!
//! Stateless soft-clip waveshaper: `y = tanh(x * (1 + drive))`.

use crate::dsp::effect::Effect;
use crate::engine::buffer::MAX_CHANNELS;
use crate::engine::AudioBuffer;

// ============================================================================
// Constants
// ============================================================================

/// Minimum drive (0.0 = no saturation)
const MIN_DRIVE: f32 = 0.0;

// ============================================================================
// Waveshaping
// ============================================================================

/// Soft-clip one sample
#[inline]
pub fn saturate(x: f32, drive: f32) -> f32 {
    (x * (1.0 + drive)).tanh()
}

// ============================================================================
// Saturator
// ============================================================================

/// Soft-clip saturator
///
/// At zero drive the saturator leaves samples untouched rather than running
/// them through `tanh`, so the unsaturated path is bit-exact.
#[derive(Debug, Clone, Default)]
pub struct Saturator {
    drive: f32,
}

impl Saturator {
    pub fn new(drive: f32) -> Self {
        let mut saturator = Self::default();
        saturator.set_drive(drive);
        saturator
    }

    /// Set the drive amount; negative and non-finite values mean no drive
    pub fn set_drive(&mut self, drive: f32) {
        self.drive = if drive.is_finite() {
            drive.max(MIN_DRIVE)
        } else {
            MIN_DRIVE
        };
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    /// True when processing would not change any sample
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.drive <= MIN_DRIVE
    }

    /// Saturate a run of samples in place
    pub fn process_slice(&self, samples: &mut [f32]) {
        if self.is_identity() {
            return;
        }
        let drive = self.drive;
        for sample in samples.iter_mut() {
            *sample = saturate(*sample, drive);
        }
    }
}

impl Effect for Saturator {
    fn process(&mut self, buffer: &mut AudioBuffer) {
        for channel in buffer.samples.iter_mut().take(MAX_CHANNELS) {
            self.process_slice(channel);
        }
    }

    fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize) {}

    fn reset(&mut self) {
        // Stateless
    }

    fn effect_type(&self) -> &'static str {
        "saturation"
    }
}

// ============================================================================
// Tests
// ============================================================================
