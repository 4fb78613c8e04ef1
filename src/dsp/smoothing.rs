//! Linear parameter ramps for real-time coefficient changes.
//!
//! A ramp lands exactly on its target after a fixed number of samples, so a
//! settled value is bit-identical to the value that was requested.

/// Value that moves linearly towards its target over a fixed ramp length
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    steps_remaining: usize,
    ramp_samples: usize,
}

impl SmoothedValue {
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            steps_remaining: 0,
            ramp_samples: 0,
        }
    }

    /// Set the ramp length and snap to the current target
    pub fn reset(&mut self, sample_rate: f64, ramp_secs: f64) {
        self.ramp_samples = (sample_rate * ramp_secs).floor().max(0.0) as usize;
        self.set_current_and_target(self.target);
    }

    /// Start ramping towards `target`
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        if self.ramp_samples == 0 {
            self.set_current_and_target(target);
            return;
        }
        self.target = target;
        self.steps_remaining = self.ramp_samples;
        self.step = (target - self.current) / self.ramp_samples as f32;
    }

    /// Jump straight to `value` with no ramp
    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
        self.steps_remaining = 0;
    }

    /// Advance one sample and return the new value
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.steps_remaining == 0 {
            return self.target;
        }
        self.steps_remaining -= 1;
        if self.steps_remaining == 0 {
            self.current = self.target;
        } else {
            self.current += self.step;
        }
        self.current
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.steps_remaining > 0
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ramp_reaches_target_exactly() {
        let mut value = SmoothedValue::new(0.0);
        value.reset(1000.0, 0.01);
        value.set_target(0.3);
        assert!(value.is_smoothing());

        let mut last = 0.0;
        for _ in 0..10 {
            let next = value.next();
            assert!(next >= last);
            last = next;
        }
        assert_eq!(last, 0.3);
        assert!(!value.is_smoothing());
        assert_eq!(value.next(), 0.3);
    }

    #[test]
    fn test_ramp_is_linear() {
        let mut value = SmoothedValue::new(0.0);
        value.reset(100.0, 0.04);
        value.set_target(1.0);
        assert_relative_eq!(value.next(), 0.25);
        assert_relative_eq!(value.next(), 0.5);
    }

    #[test]
    fn test_zero_length_ramp_snaps() {
        let mut value = SmoothedValue::new(1.0);
        value.set_target(0.5);
        assert!(!value.is_smoothing());
        assert_eq!(value.current(), 0.5);
    }

    #[test]
    fn test_reset_snaps_to_target() {
        let mut value = SmoothedValue::new(0.0);
        value.reset(1000.0, 0.1);
        value.set_target(1.0);
        value.next();
        value.reset(1000.0, 0.1);
        assert_eq!(value.current(), 1.0);
        assert_eq!(value.target(), 1.0);
    }
}
