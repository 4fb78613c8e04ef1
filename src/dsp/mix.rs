//! Mix/Gain Stage
//!
//! Dry/wet blend against the dry copy captured before the effects, followed
//! by the output trim. Also hosts the dB-to-gain conversion shared with the
//! input trim.

use crate::engine::buffer::{db_to_linear, MAX_CHANNELS};
use crate::engine::AudioBuffer;

/// Gains at or below this level are exact silence
pub const SILENCE_FLOOR_DB: f32 = -99.0;

/// Convert a trim in dB to linear gain
///
/// At or below the silence floor (and for NaN) the gain is exactly `0.0`,
/// and 0 dB is exactly `1.0`.
#[inline]
pub fn gain_from_db(db: f32) -> f32 {
    if db.is_nan() || db <= SILENCE_FLOOR_DB {
        0.0
    } else if db == 0.0 {
        1.0
    } else {
        db_to_linear(db)
    }
}

/// Multiply every sample of the first two channels by `gain`
#[inline]
pub fn apply_trim(buffer: &mut AudioBuffer, gain: f32) {
    if gain == 1.0 {
        return;
    }
    for channel in buffer.samples.iter_mut().take(MAX_CHANNELS) {
        for sample in channel.iter_mut() {
            *sample *= gain;
        }
    }
}

/// Blend `wet` with `dry` in place; `mix` is the wet proportion in 0..1
pub fn blend(wet: &mut [f32], dry: &[f32], mix: f32) {
    if mix >= 1.0 {
        return;
    }
    if mix <= 0.0 {
        let len = wet.len().min(dry.len());
        wet[..len].copy_from_slice(&dry[..len]);
        return;
    }
    let dry_gain = 1.0 - mix;
    for (w, d) in wet.iter_mut().zip(dry) {
        *w = *w * mix + *d * dry_gain;
    }
}

/// Final stage of the block pipeline
#[derive(Debug, Clone)]
pub struct MixStage {
    mix: f32,
    output_gain: f32,
}

impl MixStage {
    pub fn new() -> Self {
        Self {
            mix: 1.0,
            output_gain: 1.0,
        }
    }

    /// Wet proportion, clamped to 0..1; NaN means fully wet
    pub fn set_mix(&mut self, mix: f32) {
        self.mix = if mix.is_nan() { 1.0 } else { mix.clamp(0.0, 1.0) };
    }

    pub fn set_output_db(&mut self, db: f32) {
        self.output_gain = gain_from_db(db);
    }

    pub fn mix(&self) -> f32 {
        self.mix
    }

    pub fn output_gain(&self) -> f32 {
        self.output_gain
    }

    /// Blend `buffer` (wet) with `dry`, then apply the output trim
    pub fn process(&self, buffer: &mut AudioBuffer, dry: &AudioBuffer) {
        for (wet, dry) in buffer
            .samples
            .iter_mut()
            .zip(&dry.samples)
            .take(MAX_CHANNELS)
        {
            blend(wet, dry, self.mix);
        }
        apply_trim(buffer, self.output_gain);
    }
}

impl Default for MixStage {
    fn default() -> Self {
        Self::new()
    }
}
