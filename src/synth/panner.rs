use crate::synth::prelude::FRAC_PI_4;

/// Equal-power stereo panner.
///
/// Pan values run from -1 (hard left) through 0 (centre) to +1 (hard right).
/// At the centre both channels are scaled by 1/sqrt(2) so the summed power
/// equals the input power.
#[derive(Clone, Copy, Debug, Default)]
pub struct Panner;

impl Panner {
    pub fn new() -> Self {
        Self
    }

    /// Left and right gains for `pan`, clamped to [-1, 1].
    #[inline]
    pub fn gains(pan: f32) -> (f32, f32) {
        let pan = if pan.is_finite() { pan.clamp(-1.0, 1.0) } else { 0.0 };
        // sin_cos leaves a ~1e-8 residue at the quarter turn
        if pan == 1.0 {
            return (0.0, 1.0);
        }
        if pan == -1.0 {
            return (1.0, 0.0);
        }
        let angle = (pan + 1.0) * FRAC_PI_4;
        let (sin, cos) = angle.sin_cos();
        (cos, sin)
    }

    /// Redistributes a block whose channels carry the same mono signal.
    /// Processes `min(left.len(), right.len(), pan_values.len())` samples.
    pub fn process_block(&self, left: &mut [f32], right: &mut [f32], pan_values: &[f32]) {
        for ((l, r), &pan) in left.iter_mut().zip(right.iter_mut()).zip(pan_values) {
            let (left_gain, right_gain) = Self::gains(pan);
            *l *= left_gain;
            *r *= right_gain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_splits_power_equally() {
        let (l, r) = Panner::gains(0.0);
        assert!((l - r).abs() < 1e-6);
        assert!((l * l + r * r - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hard_pan_silences_opposite_channel() {
        assert_eq!(Panner::gains(1.0), (0.0, 1.0));
        assert_eq!(Panner::gains(-1.0), (1.0, 0.0));
        assert_eq!(Panner::gains(7.5), (0.0, 1.0));
    }

    #[test]
    fn law_is_symmetric_and_monotonic() {
        let mut previous_right = -1.0;
        for step in 0..=20 {
            let pan = -1.0 + step as f32 * 0.1;
            let (l, r) = Panner::gains(pan);
            let (mirror_l, mirror_r) = Panner::gains(-pan);
            assert!((l - mirror_r).abs() < 1e-5);
            assert!((r - mirror_l).abs() < 1e-5);
            assert!(r >= previous_right);
            previous_right = r;
        }
    }

    #[test]
    fn block_applies_per_sample_pan() {
        let mut left = [1.0, 1.0];
        let mut right = [1.0, 1.0];
        Panner::new().process_block(&mut left, &mut right, &[-1.0, 1.0]);
        assert_eq!((left[0], right[0]), (1.0, 0.0));
        assert_eq!((left[1], right[1]), (0.0, 1.0));
    }
}
