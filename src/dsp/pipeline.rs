//! Block Pipeline
//!
//! Runs one block through the whole chain:
//! 1. Input meter (taken on the unmodified block)
//! 2. Bypass check
//! 3. Input trim and dry capture
//! 4. Saturation and reverb, in the order chosen by `prePost`
//! 5. Tone filter, unless tone is flat
//! 6. Stereo width, unless mono or unity
//! 7. Dry/wet mix and output trim
//! 8. Output meter
//!
//! `process` runs on the audio thread: it never allocates once prepared
//! (unless a block exceeds the prepared size), never blocks and never logs.

use std::sync::Arc;

use log::{debug, info};

use super::effect::Effect;
use super::filter::{tone_to_settings, ToneFilter};
use super::meter::LevelMeters;
use super::mix::{apply_trim, gain_from_db, MixStage};
use super::reverb::{Reverb, ReverbParams};
use super::saturation::Saturator;
use super::width::{StereoWidth, UNITY_WIDTH};
use crate::engine::buffer::{peak_magnitude, MAX_CHANNELS};
use crate::engine::AudioBuffer;
use crate::error::{LouderError, Result};
use crate::params::{ParameterSnapshot, ParameterSource, PrePost};

/// Reverb tail reported to hosts and rendered after the input ends
pub const TAIL_LENGTH_SECS: f64 = 1.0;

/// Peak across the first two channels
fn block_peak(buffer: &AudioBuffer) -> f32 {
    buffer
        .samples
        .iter()
        .take(MAX_CHANNELS)
        .map(|channel| peak_magnitude(channel))
        .fold(0.0_f32, f32::max)
}

/// Saturation, reverb, tone, width and mix for one effect instance
pub struct BlockPipeline {
    saturator: Saturator,
    reverb: Reverb,
    tone_filter: ToneFilter,
    width: StereoWidth,
    mix: MixStage,
    dry: AudioBuffer,
    meters: Arc<LevelMeters>,
    sample_rate: f64,
    max_block_size: usize,
    prepared: bool,
}

impl BlockPipeline {
    /// Create an unprepared pipeline with its own meters
    pub fn new() -> Self {
        Self::with_meters(Arc::new(LevelMeters::new()))
    }

    /// Create an unprepared pipeline publishing into shared meters
    pub fn with_meters(meters: Arc<LevelMeters>) -> Self {
        Self {
            saturator: Saturator::default(),
            reverb: Reverb::new(),
            tone_filter: ToneFilter::default(),
            width: StereoWidth::default(),
            mix: MixStage::new(),
            dry: AudioBuffer::default(),
            meters,
            sample_rate: 0.0,
            max_block_size: 0,
            prepared: false,
        }
    }

    /// Size internal buffers and reset all stage state
    ///
    /// Must be called before the first block and again whenever the sample
    /// rate or maximum block size changes.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> Result<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(LouderError::InvalidConfig {
                reason: format!("sample rate must be positive, got {sample_rate}"),
            });
        }
        if max_block_size == 0 {
            return Err(LouderError::InvalidConfig {
                reason: "maximum block size must be at least 1".to_string(),
            });
        }

        let stages: [&mut dyn Effect; 4] = [
            &mut self.saturator,
            &mut self.reverb,
            &mut self.tone_filter,
            &mut self.width,
        ];
        for stage in stages {
            stage.prepare(sample_rate, max_block_size);
            stage.reset();
            debug!("Prepared {} stage", stage.effect_type());
        }

        self.dry = AudioBuffer::with_channels(MAX_CHANNELS, max_block_size);
        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.prepared = true;

        info!(
            "Pipeline prepared: {} Hz, max block {} samples",
            sample_rate, max_block_size
        );
        Ok(())
    }

    /// Drop buffers and state; `prepare` must run again before processing
    ///
    /// Safe to call any number of times.
    pub fn release(&mut self) {
        if !self.prepared {
            return;
        }
        self.saturator.reset();
        self.reverb.reset();
        self.tone_filter.reset();
        self.width.reset();
        self.dry = AudioBuffer::default();
        self.meters.reset();
        self.prepared = false;
        debug!("Pipeline released");
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Shared handle to the level meters, readable from any thread
    pub fn meters(&self) -> Arc<LevelMeters> {
        Arc::clone(&self.meters)
    }

    pub fn tail_length_secs(&self) -> f64 {
        TAIL_LENGTH_SECS
    }

    pub fn tone_filter(&self) -> &ToneFilter {
        &self.tone_filter
    }

    /// Capture a snapshot from `source` and process one block
    pub fn process_with<S: ParameterSource + ?Sized>(
        &mut self,
        buffer: &mut AudioBuffer,
        source: &S,
    ) {
        let params = ParameterSnapshot::capture(source);
        self.process(buffer, &params);
    }

    /// Process one block in place
    ///
    /// A no-op, meters included, while unprepared or for an empty block.
    /// Channels past the second pass through untouched.
    pub fn process(&mut self, buffer: &mut AudioBuffer, params: &ParameterSnapshot) {
        if !self.prepared || buffer.is_empty() {
            return;
        }

        let input_peak = block_peak(buffer);
        self.meters.store_input(input_peak);

        if params.bypass {
            self.meters.store_output(input_peak);
            return;
        }

        apply_trim(buffer, gain_from_db(params.input_gain_db));
        self.capture_dry(buffer);

        self.saturator.set_drive(params.drive);
        self.reverb.set_params(ReverbParams::for_type(
            params.reverb_type,
            params.decay,
            params.damping,
            params.reverb_amount,
        ));
        match params.pre_post {
            PrePost::Pre => {
                self.reverb.process(buffer);
                self.saturator.process(buffer);
            }
            PrePost::Post => {
                self.saturator.process(buffer);
                self.reverb.process(buffer);
            }
        }

        if let Some((mode, cutoff)) = tone_to_settings(params.tone) {
            self.tone_filter.set_mode(mode);
            self.tone_filter.set_cutoff(cutoff);
            self.tone_filter.process(buffer);
        }

        if buffer.num_channels() > 1 && params.width != UNITY_WIDTH {
            self.width.set_width(params.width);
            self.width.process(buffer);
        }

        self.mix.set_mix(params.mix);
        self.mix.set_output_db(params.output_gain_db);
        self.mix.process(buffer, &self.dry);

        self.meters.store_output(block_peak(buffer));
    }
}

impl BlockPipeline {
    /// Copy the first two channels into the dry slots, reusing their storage
    fn capture_dry(&mut self, buffer: &AudioBuffer) {
        for (dry, wet) in self.dry.samples.iter_mut().zip(&buffer.samples) {
            dry.clear();
            dry.extend_from_slice(wet);
        }
    }
}

impl Default for BlockPipeline {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
