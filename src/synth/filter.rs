use crate::synth::prelude::{FRAC_1_SQRT_2, PI};

/// Lowest cutoff the swept filter is allowed to reach.
pub const MIN_CUTOFF: f32 = 20.0;
/// Highest cutoff as a fraction of the sample rate (just under Nyquist).
pub const MAX_CUTOFF_RATIO: f32 = 0.49;

/// Clamps `cutoff` into the range where the biquad stays stable.
/// Non-finite input falls back to [`MIN_CUTOFF`].
pub fn clamp_cutoff(cutoff: f32, sample_rate: f32) -> f32 {
    let upper = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF);
    if cutoff.is_finite() {
        cutoff.clamp(MIN_CUTOFF, upper)
    } else {
        MIN_CUTOFF
    }
}

#[derive(Clone, Debug, Default)]
pub struct LowPassBiquad {
    cutoff: f32,
    q: f32,
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl LowPassBiquad {
    pub fn new(cutoff: f32, sample_rate: f32) -> Self {
        let mut filter = Self {
            q: FRAC_1_SQRT_2,
            ..Default::default()
        };
        filter.set_cutoff(cutoff, sample_rate);
        filter
    }

    /// Recomputes the coefficients (RBJ Audio EQ Cookbook) for a new cutoff.
    /// The delay state is kept so a sweep does not click.
    pub fn set_cutoff(&mut self, cutoff: f32, sample_rate: f32) {
        let sample_rate = sample_rate.max(1.0);
        let cutoff = clamp_cutoff(cutoff, sample_rate);

        let omega = 2.0 * PI * cutoff / sample_rate;
        let cos_omega = omega.cos();
        let sin_omega = omega.sin();
        let alpha = sin_omega / (2.0 * self.q);

        let b0 = (1.0 - cos_omega) / 2.0;
        let b1 = 1.0 - cos_omega;
        let b2 = (1.0 - cos_omega) / 2.0;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_omega;
        let a2 = 1.0 - alpha;

        self.cutoff = cutoff;
        self.b0 = b0 / a0;
        self.b1 = b1 / a0;
        self.b2 = b2 / a0;
        self.a1 = a1 / a0;
        self.a2 = a2 / a0;
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    /// Processes a single sample through a 2-pole IIR low-pass filter (Biquad, Direct Form I).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        // y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2] - a1*y[n-1] - a2*y[n-2]
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }

    /// Filters `buffer` in place. If the state ever goes non-finite the
    /// filter is reset and the offending samples are silenced, so a bad
    /// block cannot poison the following ones.
    pub fn process_block(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            let output = self.process(*sample);
            if output.is_finite() {
                *sample = output;
            } else {
                self.reset();
                *sample = 0.0;
            }
        }
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}
