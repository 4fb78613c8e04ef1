//! Tone Filter
//!
//! Topology-preserving-transform state-variable filter (Simper/Zavalishin),
//! one independent state per channel. A single `tone` control picks the mode
//! from its sign and the cutoff from its magnitude:
//! - `tone < 0`: low-pass, cutoff 200 Hz (at -100) to 20 kHz (at 0)
//! - `tone > 0`: high-pass, cutoff 20 Hz (at 0) to 2 kHz (at 100)

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use super::denormal::flush_denormal;
use super::effect::Effect;
use crate::engine::buffer::MAX_CHANNELS;
use crate::engine::AudioBuffer;

// ============================================================================
// Constants
// ============================================================================

const LOWPASS_MIN_HZ: f32 = 200.0;
const LOWPASS_MAX_HZ: f32 = 20000.0;
const HIGHPASS_MIN_HZ: f32 = 20.0;
const HIGHPASS_MAX_HZ: f32 = 2000.0;

/// Lowest cutoff the filter will accept
const MIN_CUTOFF_HZ: f32 = 10.0;

/// Highest cutoff as a fraction of the sample rate
const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Butterworth resonance
const DEFAULT_Q: f32 = FRAC_1_SQRT_2;

// ============================================================================
// Mode Mapping
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    LowPass,
    HighPass,
}

/// Map a tone value to filter mode and cutoff in Hz
///
/// Returns `None` for a flat (zero or non-finite) tone, meaning the filter
/// should not run at all.
pub fn tone_to_settings(tone: f32) -> Option<(FilterMode, f32)> {
    if !tone.is_finite() || tone == 0.0 {
        return None;
    }
    let tone = tone.clamp(-100.0, 100.0);
    if tone < 0.0 {
        let t = (tone + 100.0) / 100.0;
        Some((
            FilterMode::LowPass,
            LOWPASS_MIN_HZ + t * (LOWPASS_MAX_HZ - LOWPASS_MIN_HZ),
        ))
    } else {
        let t = tone / 100.0;
        Some((
            FilterMode::HighPass,
            HIGHPASS_MIN_HZ + t * (HIGHPASS_MAX_HZ - HIGHPASS_MIN_HZ),
        ))
    }
}

// ============================================================================
// Filter State
// ============================================================================

/// Integrator history of one channel
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SvfState {
    pub ic1eq: f32,
    pub ic2eq: f32,
}

impl SvfState {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy)]
struct SvfCoefficients {
    k: f32,
    a1: f32,
    a2: f32,
    a3: f32,
}

impl SvfCoefficients {
    fn new(cutoff: f32, q: f32, sample_rate: f32) -> Self {
        let g = (PI * cutoff / sample_rate).tan();
        let k = 1.0 / q;
        let a1 = 1.0 / (1.0 + g * (g + k));
        let a2 = g * a1;
        let a3 = g * a2;
        Self { k, a1, a2, a3 }
    }
}

// ============================================================================
// Tone Filter
// ============================================================================

#[derive(Debug, Clone)]
pub struct ToneFilter {
    mode: FilterMode,
    cutoff: f32,
    sample_rate: f32,
    coefficients: SvfCoefficients,
    states: [SvfState; MAX_CHANNELS],
}

impl ToneFilter {
    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Self {
            mode: FilterMode::LowPass,
            cutoff: LOWPASS_MAX_HZ,
            sample_rate,
            coefficients: SvfCoefficients::new(1000.0, DEFAULT_Q, 44100.0),
            states: [SvfState::default(); MAX_CHANNELS],
        };
        filter.update_coefficients();
        filter
    }

    /// Configure mode and cutoff from a tone value; a flat tone changes nothing
    pub fn set_tone(&mut self, tone: f32) {
        if let Some((mode, cutoff)) = tone_to_settings(tone) {
            self.mode = mode;
            self.set_cutoff(cutoff);
        }
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    /// Set the cutoff, clamped to 10 Hz..0.49 * sample rate
    pub fn set_cutoff(&mut self, cutoff: f32) {
        if !cutoff.is_finite() || cutoff == self.cutoff {
            return;
        }
        self.cutoff = cutoff;
        self.update_coefficients();
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Integrator history of `channel`
    pub fn state(&self, channel: usize) -> Option<SvfState> {
        self.states.get(channel).copied()
    }

    fn update_coefficients(&mut self) {
        let max_cutoff = (self.sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
        let cutoff = self.cutoff.clamp(MIN_CUTOFF_HZ, max_cutoff);
        self.coefficients = SvfCoefficients::new(cutoff, DEFAULT_Q, self.sample_rate);
    }

    /// Filter one sample of `channel`; channels past the second pass through
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        let Some(state) = self.states.get_mut(channel) else {
            return input;
        };
        let SvfCoefficients { k, a1, a2, a3 } = self.coefficients;
        let x = if input.is_finite() { input } else { 0.0 };

        let v3 = x - state.ic2eq;
        let v1 = a1 * state.ic1eq + a2 * v3;
        let v2 = state.ic2eq + a2 * state.ic1eq + a3 * v3;
        state.ic1eq = flush_denormal(2.0 * v1 - state.ic1eq);
        state.ic2eq = flush_denormal(2.0 * v2 - state.ic2eq);

        match self.mode {
            FilterMode::LowPass => v2,
            FilterMode::HighPass => x - k * v1 - v2,
        }
    }

    pub fn process_slice(&mut self, channel: usize, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process_sample(channel, *sample);
        }
    }
}

impl Default for ToneFilter {
    fn default() -> Self {
        Self::new(44100.0)
    }
}

impl Effect for ToneFilter {
    fn process(&mut self, buffer: &mut AudioBuffer) {
        for (channel, samples) in buffer.samples.iter_mut().take(MAX_CHANNELS).enumerate() {
            self.process_slice(channel, samples);
        }
    }

    fn prepare(&mut self, sample_rate: f64, _max_block_size: usize) {
        self.sample_rate = sample_rate as f32;
        self.update_coefficients();
        self.reset();
    }

    fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }

    fn effect_type(&self) -> &'static str {
        "tone_filter"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    const SAMPLE_RATE: f32 = 44100.0;

    fn sine(freq: f32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (2.0 * PI * freq * i as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    /// RMS gain of a steady sine through the filter, skipping the transient
    fn gain_at(tone: f32, freq: f32) -> f32 {
        let mut filter = ToneFilter::new(SAMPLE_RATE);
        filter.set_tone(tone);
        let input = sine(freq, 8192);
        let mut output = input.clone();
        filter.process_slice(0, &mut output);
        rms(&output[4096..]) / rms(&input[4096..])
    }

    #[test_case(-100.0, FilterMode::LowPass, 200.0)]
    #[test_case(-50.0, FilterMode::LowPass, 10100.0)]
    #[test_case(-1.0, FilterMode::LowPass, 19802.0)]
    #[test_case(1.0, FilterMode::HighPass, 39.8)]
    #[test_case(50.0, FilterMode::HighPass, 1010.0)]
    #[test_case(100.0, FilterMode::HighPass, 2000.0)]
    fn test_tone_mapping(tone: f32, mode: FilterMode, cutoff: f32) {
        let (actual_mode, actual_cutoff) = tone_to_settings(tone).unwrap();
        assert_eq!(actual_mode, mode);
        assert_relative_eq!(actual_cutoff, cutoff, max_relative = 1e-5);
    }

    #[test]
    fn test_flat_tone_has_no_settings() {
        assert_eq!(tone_to_settings(0.0), None);
        assert_eq!(tone_to_settings(f32::NAN), None);
    }

    #[test]
    fn test_out_of_range_tone_is_clamped() {
        assert_eq!(tone_to_settings(-500.0), tone_to_settings(-100.0));
        assert_eq!(tone_to_settings(500.0), tone_to_settings(100.0));
    }

    #[test]
    fn test_lowpass_darkens() {
        // Cutoff 200 Hz
        assert!(gain_at(-100.0, 5000.0) < 0.05);
        assert!(gain_at(-100.0, 50.0) > 0.9);
    }

    #[test]
    fn test_highpass_thins() {
        // Cutoff 2 kHz
        assert!(gain_at(100.0, 100.0) < 0.05);
        assert!(gain_at(100.0, 10000.0) > 0.9);
    }

    #[test]
    fn test_cutoff_gain_is_butterworth() {
        let mut filter = ToneFilter::new(SAMPLE_RATE);
        filter.set_mode(FilterMode::LowPass);
        filter.set_cutoff(1000.0);
        let input = sine(1000.0, 16384);
        let mut output = input.clone();
        filter.process_slice(0, &mut output);
        let gain = rms(&output[8192..]) / rms(&input[8192..]);
        assert_relative_eq!(gain, FRAC_1_SQRT_2, epsilon = 0.02);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut filter = ToneFilter::new(SAMPLE_RATE);
        filter.set_tone(-60.0);
        let mut buffer = AudioBuffer::with_channels(2, 4);
        buffer.channel_mut(0).fill(0.5);

        filter.process(&mut buffer);

        assert_ne!(filter.state(0), Some(SvfState::default()));
        assert!(buffer.channel(0).iter().all(|&s| s > 0.0));
        assert_eq!(filter.state(1), Some(SvfState::default()));
        assert!(buffer.channel(1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_state_flushes_to_zero_after_impulse() {
        let mut filter = ToneFilter::new(SAMPLE_RATE);
        filter.set_tone(-60.0);
        filter.process_sample(0, 1.0);
        assert_ne!(filter.state(0), Some(SvfState::default()));

        let mut silence = vec![0.0; 4096];
        filter.process_slice(0, &mut silence);
        assert_eq!(filter.state(0), Some(SvfState::default()));
        assert_eq!(silence.last(), Some(&0.0));
    }

    #[test]
    fn test_extra_channels_pass_through() {
        let mut filter = ToneFilter::new(SAMPLE_RATE);
        filter.set_tone(80.0);
        let mut buffer = AudioBuffer::with_channels(3, 16);
        buffer.fill(0.25);
        filter.process(&mut buffer);
        assert_eq!(buffer.channel(2), &[0.25; 16]);
        assert_eq!(filter.state(2), None);
    }

    #[test]
    fn test_prepare_resets_state() {
        let mut filter = ToneFilter::new(SAMPLE_RATE);
        filter.set_tone(-30.0);
        filter.process_sample(0, 1.0);
        filter.process_sample(1, -1.0);

        filter.prepare(48000.0, 512);
        assert_eq!(filter.state(0), Some(SvfState::default()));
        assert_eq!(filter.state(1), Some(SvfState::default()));
    }

    #[test]
    fn test_non_finite_input_keeps_state_finite() {
        let mut filter = ToneFilter::new(SAMPLE_RATE);
        filter.set_tone(-50.0);
        filter.process_sample(0, f32::NAN);
        filter.process_sample(0, f32::INFINITY);
        let state = filter.state(0).unwrap();
        assert!(state.ic1eq.is_finite() && state.ic2eq.is_finite());
        assert!(filter.process_sample(0, 0.5).is_finite());
    }

    #[test]
    fn test_cutoff_above_nyquist_is_stable() {
        let mut filter = ToneFilter::new(22050.0);
        filter.set_tone(-1.0);
        let mut samples = sine(3000.0, 4096);
        filter.process_slice(0, &mut samples);
        assert!(samples.iter().all(|s| s.is_finite() && s.abs() < 2.0));
    }

    #[test]
    fn test_zero_input_stays_zero() {
        let mut filter = ToneFilter::new(SAMPLE_RATE);
        filter.set_tone(40.0);
        let mut samples = vec![0.0; 256];
        filter.process_slice(1, &mut samples);
        assert!(samples.iter().all(|&s| s == 0.0));
    }
}
