//! Stereo width via mid/side rebalancing.

use super::effect::Effect;
use crate::engine::AudioBuffer;

/// Unity width; leaves the image unchanged
pub const UNITY_WIDTH: f32 = 1.0;

/// Rescale the side signal of a stereo pair by `width`
///
/// `0.0` collapses to mono, values above `1.0` widen without limit.
pub fn apply_width(left: &mut [f32], right: &mut [f32], width: f32) {
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let mid = (*l + *r) * 0.5;
        let side = (*l - *r) * 0.5 * width;
        *l = mid + side;
        *r = mid - side;
    }
}

/// Width stage; mono buffers and unity width pass through untouched
#[derive(Debug, Clone)]
pub struct StereoWidth {
    width: f32,
}

impl StereoWidth {
    pub fn new(width: f32) -> Self {
        let mut stage = Self { width: UNITY_WIDTH };
        stage.set_width(width);
        stage
    }

    /// Set the width; non-finite values fall back to unity
    pub fn set_width(&mut self, width: f32) {
        self.width = if width.is_finite() {
            width.max(0.0)
        } else {
            UNITY_WIDTH
        };
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn is_identity(&self) -> bool {
        self.width == UNITY_WIDTH
    }
}

impl Default for StereoWidth {
    fn default() -> Self {
        Self::new(UNITY_WIDTH)
    }
}

impl Effect for StereoWidth {
    fn process(&mut self, buffer: &mut AudioBuffer) {
        if self.is_identity() {
            return;
        }
        if let Some((left, right)) = buffer.stereo_mut() {
            apply_width(left, right, self.width);
        }
    }

    fn prepare(&mut self, _sample_rate: f64, _max_block_size: usize) {}

    fn reset(&mut self) {}

    fn effect_type(&self) -> &'static str {
        "stereo_width"
    }
}
