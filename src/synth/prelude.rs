// Shared math constants for the DSP modules
pub use core::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_4, PI, TAU};

/// Replaces NaN/Inf with silence.
#[inline]
pub fn finite_or_zero(sample: f32) -> f32 {
    if sample.is_finite() {
        sample
    } else {
        0.0
    }
}
