//! Level meters
//!
//! The pipeline publishes the peak of each block into two atomic cells; a
//! reader on another thread polls them at its own rate and applies its own
//! ballistics through [`MeterFollower`].

use std::sync::atomic::Ordering;

use atomic_float::AtomicF32;

/// Refresh rate the meter display polls at
pub const REFRESH_HZ: u32 = 30;

/// Per-tick decay of a displayed level
pub const DECAY_PER_TICK: f32 = 0.85;

/// Input and output peak of the most recent block
///
/// Single writer (the pipeline), any number of readers. Relaxed ordering:
/// a reader may see a value one block stale.
#[derive(Debug)]
pub struct LevelMeters {
    input: AtomicF32,
    output: AtomicF32,
}

impl LevelMeters {
    pub fn new() -> Self {
        Self {
            input: AtomicF32::new(0.0),
            output: AtomicF32::new(0.0),
        }
    }

    #[inline]
    pub fn input(&self) -> f32 {
        self.input.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn output(&self) -> f32 {
        self.output.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn store_input(&self, peak: f32) {
        self.input.store(peak, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn store_output(&self, peak: f32) {
        self.output.store(peak, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.store_input(0.0);
        self.store_output(0.0);
    }
}

impl Default for LevelMeters {
    fn default() -> Self {
        Self::new()
    }
}

/// Peak-hold display level with exponential fall-off
#[derive(Debug, Clone, Copy, Default)]
pub struct MeterFollower {
    level: f32,
}

impl MeterFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one refresh tick with the latest published peak
    pub fn tick(&mut self, latest: f32) -> f32 {
        let latest = if latest.is_finite() { latest } else { 0.0 };
        self.level = latest.max(self.level * DECAY_PER_TICK);
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }
}
