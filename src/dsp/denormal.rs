//! Denormal guard for recursive filter state.

/// Magnitude below which feedback state is flushed to zero
pub(crate) const DENORMAL_THRESHOLD: f32 = 1.0e-15;

/// Replace values below `DENORMAL_THRESHOLD` with an exact zero
#[inline]
pub(crate) fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        x
    }
}
