use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::config::ReverbConfig;
use super::prelude::finite_or_zero;

// --- DSP Primitives ---

/// Simple delay line using nearest-neighbor interpolation (integer delay).
#[derive(Clone, Debug)]
struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    fn new() -> Self {
        Self {
            buffer: vec![0.0; 1],
            write_pos: 0,
        }
    }

    fn resize(&mut self, max_delay_samples: usize) {
        let new_size = (max_delay_samples + 1).next_power_of_two();
        if new_size != self.buffer.len() {
            self.buffer.resize(new_size, 0.0);
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    #[inline]
    fn write(&mut self, sample: f32) {
        let mask = self.buffer.len() - 1;
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) & mask;
    }

    /// Reads the sample written `delay_samples` writes ago (1 = most recent).
    #[inline]
    fn read(&self, delay_samples: usize) -> f32 {
        let mask = self.buffer.len() - 1;
        let delay = delay_samples.clamp(1, self.buffer.len());
        self.buffer[(self.write_pos + self.buffer.len() - delay) & mask]
    }
}

fn random_in_range(rng: &mut SmallRng, low: f32, high: f32) -> f32 {
    if low >= high {
        return low;
    }
    rng.random_range(low..high)
}

// --- Matrix Generation ---

fn generate_householder(order: usize, rng: &mut SmallRng) -> Vec<Vec<f32>> {
    if order == 0 {
        return vec![];
    }
    if order == 1 {
        return vec![vec![-1.0]];
    }
    let mut v = vec![0.0f32; order];
    let mut v_norm_sq = 0.0f32;
    while v_norm_sq < 1e-9 {
        v_norm_sq = 0.0;
        for value in v.iter_mut() {
            *value = rng.random_range(-1.0..1.0);
            v_norm_sq += *value * *value;
        }
    }
    let factor = -2.0 / v_norm_sq;
    let mut h = vec![vec![0.0; order]; order];
    for (r, row) in h.iter_mut().enumerate() {
        for (c, value) in row.iter_mut().enumerate() {
            *value = factor * v[r] * v[c];
        }
        row[r] += 1.0;
    }
    h
}

/// Orthonormal fast Walsh-Hadamard transform. `data.len()` must be a power of two.
fn hadamard_in_place(data: &mut [f32]) {
    let n = data.len();
    if n == 0 || !n.is_power_of_two() {
        return;
    }
    let mut h = 1;
    while h < n {
        for i in (0..n).step_by(h * 2) {
            for j in 0..h {
                let x = data[i + j];
                let y = data[i + j + h];
                data[i + j] = x + y;
                data[i + j + h] = x - y;
            }
        }
        h *= 2;
    }
    let scale = 1.0 / (n as f32).sqrt();
    for value in data.iter_mut() {
        *value *= scale;
    }
}

#[inline]
fn matrix_vector_mult(matrix: &[Vec<f32>], vector: &[f32], out: &mut [f32]) {
    for (row, out_value) in matrix.iter().zip(out.iter_mut()) {
        *out_value = row.iter().zip(vector).map(|(m, v)| m * v).sum();
    }
}

// --- Reverb Components ---

#[derive(Clone, Debug)]
struct DiffusionStep {
    num_channels: usize,
    delay_ms_range: f32,
    delay_samples: Vec<usize>,
    delays: Vec<DelayLine>,
    flip_polarity: Vec<bool>,
    temp_buffer: Vec<f32>,
}

impl DiffusionStep {
    fn new(num_channels: usize, delay_ms_range: f32) -> Self {
        Self {
            num_channels,
            delay_ms_range,
            delay_samples: vec![1; num_channels],
            delays: (0..num_channels).map(|_| DelayLine::new()).collect(),
            flip_polarity: vec![false; num_channels],
            temp_buffer: vec![0.0; num_channels],
        }
    }

    fn configure(&mut self, sample_rate: f32, rng: &mut SmallRng) {
        let delay_samples_range = self.delay_ms_range * 0.001 * sample_rate;
        let mut max_delay = 1;
        for c in 0..self.num_channels {
            let range_low = delay_samples_range * c as f32 / self.num_channels as f32;
            let range_high = delay_samples_range * (c + 1) as f32 / self.num_channels as f32;
            let delay = (random_in_range(rng, range_low, range_high).round() as usize).max(1);
            self.delay_samples[c] = delay;
            max_delay = max_delay.max(delay);
            self.flip_polarity[c] = rng.random_bool(0.5);
        }
        for delay_line in self.delays.iter_mut() {
            delay_line.resize(max_delay);
        }
    }

    fn reset(&mut self) {
        for delay_line in self.delays.iter_mut() {
            delay_line.reset();
        }
        self.temp_buffer.fill(0.0);
    }

    #[inline]
    fn process(&mut self, buffer: &mut [f32]) {
        debug_assert_eq!(buffer.len(), self.num_channels);

        for c in 0..self.num_channels {
            self.delays[c].write(buffer[c]);
            self.temp_buffer[c] = self.delays[c].read(self.delay_samples[c]);
        }

        hadamard_in_place(&mut self.temp_buffer);

        for c in 0..self.num_channels {
            let mixed = self.temp_buffer[c];
            buffer[c] = if self.flip_polarity[c] { -mixed } else { mixed };
        }
    }
}

/// Chain of diffusion steps, each half as long as the previous.
#[derive(Clone, Debug)]
struct Diffuser {
    steps: Vec<DiffusionStep>,
}

impl Diffuser {
    fn new(num_channels: usize, step_count: usize, initial_diffusion_ms: f32) -> Self {
        let mut steps = Vec::with_capacity(step_count);
        let mut diffusion_ms = initial_diffusion_ms;
        for _ in 0..step_count {
            diffusion_ms *= 0.5;
            steps.push(DiffusionStep::new(num_channels, diffusion_ms.max(0.0)));
        }
        Self { steps }
    }

    fn configure(&mut self, sample_rate: f32, rng: &mut SmallRng) {
        for step in self.steps.iter_mut() {
            step.configure(sample_rate, rng);
        }
    }

    fn reset(&mut self) {
        for step in self.steps.iter_mut() {
            step.reset();
        }
    }

    #[inline]
    fn process(&mut self, samples: &mut [f32]) {
        for step in self.steps.iter_mut() {
            step.process(samples);
        }
    }
}

#[derive(Clone, Debug)]
struct FeedbackLoop {
    num_channels: usize,
    delay_ms: f32,
    decay_gain: f32,
    delay_samples: Vec<usize>,
    delays: Vec<DelayLine>,
    feedback_matrix: Vec<Vec<f32>>,
    delayed_buffer: Vec<f32>,
    mixed_buffer: Vec<f32>,
}

impl FeedbackLoop {
    fn new(num_channels: usize, delay_ms: f32, rng: &mut SmallRng) -> Self {
        Self {
            num_channels,
            delay_ms,
            decay_gain: 0.0,
            delay_samples: vec![1; num_channels],
            delays: (0..num_channels).map(|_| DelayLine::new()).collect(),
            feedback_matrix: generate_householder(num_channels, rng),
            delayed_buffer: vec![0.0; num_channels],
            mixed_buffer: vec![0.0; num_channels],
        }
    }

    fn configure(&mut self, sample_rate: f32) {
        let delay_samples_base = self.delay_ms * 0.001 * sample_rate;
        let mut max_delay = 1;
        for c in 0..self.num_channels {
            let r = c as f32 / self.num_channels as f32;
            let delay = ((2.0f32.powf(r) * delay_samples_base).round() as usize).max(1);
            self.delay_samples[c] = delay;
            max_delay = max_delay.max(delay);
        }
        for delay_line in self.delays.iter_mut() {
            delay_line.resize(max_delay);
        }
    }

    fn reset(&mut self) {
        for delay_line in self.delays.iter_mut() {
            delay_line.reset();
        }
        self.delayed_buffer.fill(0.0);
        self.mixed_buffer.fill(0.0);
    }

    /// Writes the delayed signals (read before the feedback mix) to `output`.
    #[inline]
    fn process(&mut self, input: &[f32], output: &mut [f32]) {
        for c in 0..self.num_channels {
            self.delayed_buffer[c] = self.delays[c].read(self.delay_samples[c]);
        }

        matrix_vector_mult(
            &self.feedback_matrix,
            &self.delayed_buffer,
            &mut self.mixed_buffer,
        );

        for c in 0..self.num_channels {
            let write_value = input[c] + self.mixed_buffer[c] * self.decay_gain;
            self.delays[c].write(finite_or_zero(write_value));
        }

        output.copy_from_slice(&self.delayed_buffer);
    }
}

/// Feedback delay network after Geraint Luff's "Let's write a reverb".
/// Left feeds the even FDN channels, right the odd ones; the wet outputs are
/// taken from channels 0 and 1.
#[derive(Clone, Debug)]
pub struct Reverb {
    room_size_ms: f32,
    dry_wet: f32,
    diffuser: Diffuser,
    feedback_loop: FeedbackLoop,
    channel_buffer: Vec<f32>,
    feedback_output_buffer: Vec<f32>,
    rng: SmallRng,
}

impl Reverb {
    pub fn new(config: &ReverbConfig) -> Self {
        let num_channels = config.channels.max(2).next_power_of_two();
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let diffuser = Diffuser::new(num_channels, config.diffusion_steps, config.room_size_ms);
        let feedback_loop = FeedbackLoop::new(num_channels, config.room_size_ms, &mut rng);

        let mut instance = Self {
            room_size_ms: config.room_size_ms.max(0.0),
            dry_wet: config.dry_wet.clamp(0.0, 1.0),
            diffuser,
            feedback_loop,
            channel_buffer: vec![0.0; num_channels],
            feedback_output_buffer: vec![0.0; num_channels],
            rng,
        };
        instance.set_rt60(config.rt60);
        instance
    }

    fn set_rt60(&mut self, rt60_seconds: f32) {
        let rt60_seconds = rt60_seconds.max(0.0);
        let typical_loop_ms = self.room_size_ms * 1.5;
        let decay_gain = if typical_loop_ms <= 1e-6 || rt60_seconds <= 1e-6 {
            0.0
        } else {
            let loops_per_rt60 = rt60_seconds / (typical_loop_ms * 0.001);
            let db_per_cycle = -60.0 / loops_per_rt60;
            10.0f32.powf(db_per_cycle * 0.05)
        };
        self.feedback_loop.decay_gain = decay_gain.clamp(0.0, 1.0);
    }

    /// Clears every delay line so no tail carries into the next call.
    pub fn reset(&mut self) {
        self.diffuser.reset();
        self.feedback_loop.reset();
        self.channel_buffer.fill(0.0);
        self.feedback_output_buffer.fill(0.0);
    }

    /// Picks delay lengths for `sample_rate` and clears the state.
    pub fn configure(&mut self, sample_rate: f32) {
        let sample_rate = sample_rate.max(1.0);
        self.diffuser.configure(sample_rate, &mut self.rng);
        self.feedback_loop.configure(sample_rate);
        self.reset();
    }

    #[inline]
    pub fn process_stereo(&mut self, left: &mut [f32], right: &mut [f32]) {
        let dry_level = 1.0 - self.dry_wet;
        let wet_level = self.dry_wet;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (dry_left, dry_right) = (*l, *r);

            for (c, value) in self.channel_buffer.iter_mut().enumerate() {
                *value = if c % 2 == 0 { dry_left } else { dry_right };
            }
            self.diffuser.process(&mut self.channel_buffer);
            self.feedback_loop
                .process(&self.channel_buffer, &mut self.feedback_output_buffer);

            let wet_left = self.feedback_output_buffer[0];
            let wet_right = self.feedback_output_buffer[1];

            *l = finite_or_zero(dry_left * dry_level + wet_left * wet_level).clamp(-1.0, 1.0);
            *r = finite_or_zero(dry_right * dry_level + wet_right * wet_level).clamp(-1.0, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hadamard_preserves_energy() {
        let mut data = [0.3, -0.2, 0.9, 0.1, 0.0, 0.5, -0.7, 0.25];
        let before: f32 = data.iter().map(|x| x * x).sum();
        hadamard_in_place(&mut data);
        let after: f32 = data.iter().map(|x| x * x).sum();
        assert!((before - after).abs() < 1e-4);
    }

    #[test]
    fn householder_is_orthogonal() {
        let mut rng = SmallRng::seed_from_u64(3);
        let h = generate_householder(4, &mut rng);
        for i in 0..4 {
            for j in 0..4 {
                let dot: f32 = (0..4).map(|k| h[i][k] * h[j][k]).sum();
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((dot - expected).abs() < 1e-4, "H*H^T[{i}][{j}] = {dot}");
            }
        }
    }

    #[test]
    fn delay_line_reads_back_written_samples() {
        let mut line = DelayLine::new();
        line.resize(4);
        for sample in [1.0, 2.0, 3.0] {
            line.write(sample);
        }
        assert_eq!(line.read(1), 3.0);
        assert_eq!(line.read(3), 1.0);
    }

    #[test]
    fn dry_only_mix_passes_input_through() {
        let config = ReverbConfig {
            dry_wet: 0.0,
            ..ReverbConfig::default()
        };
        let mut reverb = Reverb::new(&config);
        reverb.configure(48000.0);
        let mut left = [0.25, -0.5, 0.125];
        let mut right = [0.1, 0.2, -0.3];
        reverb.process_stereo(&mut left, &mut right);
        assert_eq!(left, [0.25, -0.5, 0.125]);
        assert_eq!(right, [0.1, 0.2, -0.3]);
    }

    #[test]
    fn reset_discards_the_tail() {
        let config = ReverbConfig {
            room_size_ms: 10.0,
            rt60: 10.0,
            dry_wet: 1.0,
            ..ReverbConfig::default()
        };
        let mut carried = Reverb::new(&config);
        carried.configure(48000.0);
        let mut cleared = carried.clone();

        for reverb in [&mut carried, &mut cleared] {
            let mut left = vec![0.0; 2048];
            let mut right = vec![0.0; 2048];
            left[0] = 1.0;
            right[0] = 1.0;
            reverb.process_stereo(&mut left, &mut right);
        }
        cleared.reset();

        let mut carried_left = vec![0.0; 2048];
        let mut carried_right = vec![0.0; 2048];
        carried.process_stereo(&mut carried_left, &mut carried_right);
        let mut cleared_left = vec![0.0; 2048];
        let mut cleared_right = vec![0.0; 2048];
        cleared.process_stereo(&mut cleared_left, &mut cleared_right);

        assert!(carried_left.iter().any(|s| *s != 0.0));
        assert!(cleared_left.iter().chain(&cleared_right).all(|s| *s == 0.0));
    }
}
