//! Reverb effect implementation
//!
//! Freeverb-style feedback network:
//! - 8 parallel damped comb filters per channel
//! - 4 series allpass filters per channel for diffusion
//! - Stereo width control on the wet signal
//!
//! Parameter changes ramp the feedback, damping and gains over a few
//! milliseconds and never touch the delay lines, so tails carry on across
//! block boundaries without clicks.

use super::denormal::flush_denormal;
use super::effect::Effect;
use super::smoothing::SmoothedValue;
use crate::engine::AudioBuffer;
use crate::params::ReverbType;

// ============================================================================
// Freeverb Constants
// ============================================================================

/// Reference sample rate for Freeverb delays
const REFERENCE_SAMPLE_RATE: f64 = 44100.0;

/// Comb filter delays at 44100 Hz (8 filters)
const COMB_DELAYS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass filter delays at 44100 Hz (4 filters)
const ALLPASS_DELAYS: [usize; 4] = [556, 441, 341, 225];

/// Stereo spread offset in samples (for right channel)
const STEREO_SPREAD: usize = 23;

/// Fixed gain for allpass filters (standard Freeverb value)
const ALLPASS_GAIN: f32 = 0.5;

/// Scale factor for room size parameter to feedback
const ROOM_SCALE: f32 = 0.28;

/// Offset for room size parameter to feedback
const ROOM_OFFSET: f32 = 0.7;

/// Scale factor for damping parameter
const DAMP_SCALE: f32 = 0.4;

/// Input attenuation feeding the comb bank
const FIXED_GAIN: f32 = 0.015;

/// Wet level scale compensating for the input attenuation
const WET_SCALE: f32 = 3.0;

/// Ramp time for coefficient changes
const SMOOTHING_SECS: f64 = 0.01;

/// Feed only finite samples into the feedback network
#[inline]
fn sanitize(x: f32) -> f32 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}

// ============================================================================
// Parameter Structs
// ============================================================================

/// Reverb engine parameters, all in 0..1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverbParams {
    /// Room size: 0 (tiny) to 1 (huge hall)
    pub room_size: f32,
    /// Damping: 0 (bright) to 1 (dark)
    pub damping: f32,
    /// Wet signal level
    pub wet_level: f32,
    /// Dry signal level
    pub dry_level: f32,
    /// Stereo width of the wet signal: 0 (mono) to 1 (full stereo)
    pub width: f32,
    /// Values of 0.5 and above hold the current tail indefinitely
    pub freeze_mode: f32,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            room_size: 0.5,
            damping: 0.5,
            wet_level: 0.33,
            dry_level: 0.4,
            width: 1.0,
            freeze_mode: 0.0,
        }
    }
}

impl ReverbParams {
    /// Derive engine parameters from the user controls
    ///
    /// `decay`, `damping` and `amount` are normalised to 0..1. The engine's
    /// own dry path stays at unity; the overall dry/wet blend happens later
    /// in the mix stage.
    pub fn for_type(reverb_type: ReverbType, decay: f32, damping: f32, amount: f32) -> Self {
        let (room_size, damping, width) = match reverb_type {
            ReverbType::Room => (decay * 0.5, damping * 0.6, 0.8),
            ReverbType::Hall => (0.5 + decay * 0.5, damping * 0.8, 1.0),
            ReverbType::Plate => (decay * 0.7, 0.2 + damping * 0.7, 0.5),
        };
        Self {
            room_size,
            damping,
            wet_level: amount,
            dry_level: 1.0,
            width,
            freeze_mode: 0.0,
        }
    }

    /// Clamp every field into 0..1, replacing non-finite values with defaults
    fn sanitized(self) -> Self {
        let defaults = Self::default();
        let unit = |v: f32, fallback: f32| {
            if v.is_finite() {
                v.clamp(0.0, 1.0)
            } else {
                fallback
            }
        };
        Self {
            room_size: unit(self.room_size, defaults.room_size),
            damping: unit(self.damping, defaults.damping),
            wet_level: unit(self.wet_level, defaults.wet_level),
            dry_level: unit(self.dry_level, defaults.dry_level),
            width: unit(self.width, defaults.width),
            freeze_mode: unit(self.freeze_mode, defaults.freeze_mode),
        }
    }

    fn is_frozen(&self) -> bool {
        self.freeze_mode >= 0.5
    }
}

// ============================================================================
// Filter Components
// ============================================================================

/// Low-pass comb filter for Freeverb
///
/// Implements: y[n] = x[n - delay] with a one-pole low-pass in the feedback path
#[derive(Debug, Clone)]
struct CombFilter {
    /// Circular buffer for delay line
    buffer: Vec<f32>,
    /// Current write position
    write_pos: usize,
    /// Buffer size mask for efficient wrapping
    mask: usize,
    /// Delay length in samples
    delay: usize,
    /// Filter state for damping (low-pass)
    filter_state: f32,
}

impl CombFilter {
    /// Create a new comb filter with the given delay
    fn new(delay: usize) -> Self {
        let delay = delay.max(1);
        // Round up to next power of 2 for efficient wrapping
        let size = (delay + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
            delay,
            filter_state: 0.0,
        }
    }

    /// Process a single sample through the comb filter
    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let read_pos = (self.write_pos + self.mask + 1 - self.delay) & self.mask;
        let output = self.buffer[read_pos];

        self.filter_state = flush_denormal(output * (1.0 - damp) + self.filter_state * damp);
        self.buffer[self.write_pos] = flush_denormal(input + self.filter_state * feedback);

        self.write_pos = (self.write_pos + 1) & self.mask;
        output
    }

    /// Clear the filter state
    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.filter_state = 0.0;
        self.write_pos = 0;
    }
}

/// Allpass filter for Freeverb diffusion
#[derive(Debug, Clone)]
struct AllpassFilter {
    buffer: Vec<f32>,
    write_pos: usize,
    mask: usize,
    delay: usize,
}

impl AllpassFilter {
    fn new(delay: usize) -> Self {
        let delay = delay.max(1);
        let size = (delay + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; size],
            write_pos: 0,
            mask: size - 1,
            delay,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let read_pos = (self.write_pos + self.mask + 1 - self.delay) & self.mask;
        let delayed = self.buffer[read_pos];

        self.buffer[self.write_pos] = flush_denormal(input + delayed * ALLPASS_GAIN);
        self.write_pos = (self.write_pos + 1) & self.mask;

        delayed - input
    }

    fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

/// Comb and allpass banks for one output channel
#[derive(Debug, Clone)]
struct Tank {
    combs: [CombFilter; 8],
    allpasses: [AllpassFilter; 4],
}

impl Tank {
    fn new(scale: f64, spread: usize) -> Self {
        let scaled = |delay: usize| (((delay + spread) as f64 * scale) as usize).max(1);
        Self {
            combs: std::array::from_fn(|i| CombFilter::new(scaled(COMB_DELAYS[i]))),
            allpasses: std::array::from_fn(|i| AllpassFilter::new(scaled(ALLPASS_DELAYS[i]))),
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let mut output = 0.0;
        for comb in &mut self.combs {
            output += comb.process(input, feedback, damp);
        }
        for allpass in &mut self.allpasses {
            output = allpass.process(output);
        }
        output
    }

    fn clear(&mut self) {
        for comb in &mut self.combs {
            comb.clear();
        }
        for allpass in &mut self.allpasses {
            allpass.clear();
        }
    }
}

/// Per-sample coefficient ramps
#[derive(Debug, Clone)]
struct Coefficients {
    damp: SmoothedValue,
    feedback: SmoothedValue,
    input_gain: SmoothedValue,
    dry: SmoothedValue,
    wet1: SmoothedValue,
    wet2: SmoothedValue,
}

impl Coefficients {
    fn new() -> Self {
        Self {
            damp: SmoothedValue::new(0.0),
            feedback: SmoothedValue::new(0.0),
            input_gain: SmoothedValue::new(0.0),
            dry: SmoothedValue::new(0.0),
            wet1: SmoothedValue::new(0.0),
            wet2: SmoothedValue::new(0.0),
        }
    }

    fn all_mut(&mut self) -> [&mut SmoothedValue; 6] {
        [
            &mut self.damp,
            &mut self.feedback,
            &mut self.input_gain,
            &mut self.dry,
            &mut self.wet1,
            &mut self.wet2,
        ]
    }

    fn targets(params: &ReverbParams) -> [f32; 6] {
        let (damp, feedback, input_gain) = if params.is_frozen() {
            (0.0, 1.0, 0.0)
        } else {
            (
                params.damping * DAMP_SCALE,
                params.room_size * ROOM_SCALE + ROOM_OFFSET,
                FIXED_GAIN,
            )
        };
        let wet = params.wet_level * WET_SCALE;
        [
            damp,
            feedback,
            input_gain,
            params.dry_level,
            0.5 * wet * (1.0 + params.width),
            0.5 * wet * (1.0 - params.width),
        ]
    }

    fn set_targets(&mut self, params: &ReverbParams, snap: bool) {
        for (value, target) in self.all_mut().into_iter().zip(Self::targets(params)) {
            if snap {
                value.set_current_and_target(target);
            } else {
                value.set_target(target);
            }
        }
    }

    fn reset(&mut self, sample_rate: f64) {
        for value in self.all_mut() {
            value.reset(sample_rate, SMOOTHING_SECS);
        }
    }
}

// ============================================================================
// Main Reverb Effect
// ============================================================================

/// Stereo/mono Freeverb reverb
///
/// Must be prepared with the sample rate before use; delay lines are sized
/// from it. The first parameter update after `prepare` or `reset` applies
/// immediately, later ones ramp.
#[derive(Debug, Clone)]
pub struct Reverb {
    params: ReverbParams,
    sample_rate: f64,
    left: Tank,
    right: Tank,
    coefficients: Coefficients,
    needs_snap: bool,
}

impl Reverb {
    /// Create a new Reverb with default parameters at the reference rate
    pub fn new() -> Self {
        let mut reverb = Self {
            params: ReverbParams::default(),
            sample_rate: REFERENCE_SAMPLE_RATE,
            left: Tank::new(1.0, 0),
            right: Tank::new(1.0, STEREO_SPREAD),
            coefficients: Coefficients::new(),
            needs_snap: true,
        };
        reverb.coefficients.set_targets(&reverb.params, true);
        reverb
    }

    /// Get a reference to the current parameters
    pub fn params(&self) -> &ReverbParams {
        &self.params
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Update parameters without clearing any delay line
    ///
    /// Out-of-range fields are clamped into 0..1.
    pub fn set_params(&mut self, params: ReverbParams) {
        let params = params.sanitized();
        if params == self.params && !self.needs_snap {
            return;
        }
        self.params = params;
        self.coefficients.set_targets(&params, self.needs_snap);
        self.needs_snap = false;
    }

    /// Set the sample rate, resizing all delay lines
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        let scale = sample_rate / REFERENCE_SAMPLE_RATE;
        self.left = Tank::new(scale, 0);
        self.right = Tank::new(scale, STEREO_SPREAD);
        self.coefficients.reset(sample_rate);
        self.needs_snap = true;
    }

    /// Process a mono channel in place
    pub fn process_mono(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            let damp = self.coefficients.damp.next();
            let feedback = self.coefficients.feedback.next();
            let input_gain = self.coefficients.input_gain.next();
            let dry = self.coefficients.dry.next();
            let wet1 = self.coefficients.wet1.next();
            self.coefficients.wet2.next();

            let input = sanitize(*sample) * input_gain;
            let output = self.left.process(input, feedback, damp);

            *sample = output * wet1 + *sample * dry;
        }
    }

    /// Process a stereo pair in place
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let damp = self.coefficients.damp.next();
            let feedback = self.coefficients.feedback.next();
            let input_gain = self.coefficients.input_gain.next();
            let dry = self.coefficients.dry.next();
            let wet1 = self.coefficients.wet1.next();
            let wet2 = self.coefficients.wet2.next();

            // Both tanks are fed the mono sum
            let input = (sanitize(*l) + sanitize(*r)) * input_gain;
            let out_left = self.left.process(input, feedback, damp);
            let out_right = self.right.process(input, feedback, damp);

            // wet1 controls same-side contribution, wet2 cross-side
            *l = out_left * wet1 + out_right * wet2 + *l * dry;
            *r = out_right * wet1 + out_left * wet2 + *r * dry;
        }
    }
}

impl Default for Reverb {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Reverb {
    fn process(&mut self, buffer: &mut AudioBuffer) {
        if let Some((left, right)) = buffer.stereo_mut() {
            self.process_stereo(left, right);
        } else if buffer.num_channels() == 1 {
            self.process_mono(buffer.channel_mut(0));
        }
    }

    fn prepare(&mut self, sample_rate: f64, _max_block_size: usize) {
        self.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        self.left.clear();
        self.right.clear();
        self.coefficients.reset(self.sample_rate);
        self.needs_snap = true;
    }

    fn effect_type(&self) -> &'static str {
        "reverb"
    }
}

// ============================================================================
// Tests
// ============================================================================
