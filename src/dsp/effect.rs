//! Effect trait definition
//!
//! Base trait shared by the processing stages of the block pipeline.

use crate::engine::AudioBuffer;

/// A processing stage that transforms a block in place
///
/// Stages only touch the first two channels of a buffer. `process` runs on
/// the audio thread and must not allocate, block or log.
pub trait Effect: Send {
    /// Process audio buffer in-place
    fn process(&mut self, buffer: &mut AudioBuffer);

    /// Prepare the effect for processing
    ///
    /// Called when sample rate or block size changes. May allocate.
    fn prepare(&mut self, sample_rate: f64, max_block_size: usize);

    /// Clear any internal state (filter history, delay lines)
    fn reset(&mut self);

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;
}
