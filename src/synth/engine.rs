use super::config::SynthConfig;
use super::effect::{Effect, EffectType, SoftClip};
use super::error::SynthError;
use super::filter::LowPassBiquad;
use super::oscillator::Oscillator;
use super::panner::Panner;
use super::prelude::finite_or_zero;
use super::reverb::Reverb;
use crate::life::GridView;
use tracing::{debug, info};

/// Fixed offset keeping the swept cutoff away from zero when the filter
/// modulator sits at -1.
const FILTER_SWEEP_OFFSET: f32 = 1.001;

/// The grid-driven synthesis engine.
///
/// Each oscillator owns a contiguous block of grid columns. Every sample,
/// the fades in that block set the oscillator's gain (how much of the block
/// was recently alive, squared once the spectral decay is applied on top) and
/// its pan (top half against bottom half). The mixed
/// voices then go through a swept low-pass, a tanh soft clip and a reverb.
pub struct Synthesis {
    config: SynthConfig,
    grid: GridView,
    oscillators: Vec<Oscillator>,
    lfos: Vec<Oscillator>,
    filter_modulator: Oscillator,
    filter_left: LowPassBiquad,
    filter_right: LowPassBiquad,
    panner: Panner,
    effects: Vec<Effect>, // Soft clip, then reverb
    scratch_left: Vec<f32>,
    scratch_right: Vec<f32>,
    pan_values: Vec<f32>,
    interleave_left: Vec<f32>,
    interleave_right: Vec<f32>,
    sample_rate: f32,
    block_size: usize,
    prepared: bool,
}

impl Synthesis {
    pub fn new(config: SynthConfig, grid: GridView) -> Result<Self, SynthError> {
        config.validate()?;
        if grid.rows() != config.rows || grid.columns() != config.columns {
            return Err(SynthError::GridMismatch {
                grid_rows: grid.rows(),
                grid_columns: grid.columns(),
                rows: config.rows,
                columns: config.columns,
            });
        }

        let oscillators = (0..config.num_oscillators)
            .map(|_| Oscillator::audio().with_waveform(config.oscillator_waveform))
            .collect();
        let lfos = (0..config.num_lfos())
            .map(|_| Oscillator::modulation().with_waveform(config.lfo_waveform))
            .collect();

        let effects = vec![
            Effect::new(EffectType::SoftClip(SoftClip::new(config.distortion_drive))),
            Effect::new(EffectType::Reverb(Reverb::new(&config.reverb))),
        ];

        let sample_rate = 44100.0;
        Ok(Self {
            filter_left: LowPassBiquad::new(config.filter_cutoff, sample_rate),
            filter_right: LowPassBiquad::new(config.filter_cutoff, sample_rate),
            config,
            grid,
            oscillators,
            lfos,
            filter_modulator: Oscillator::modulation(),
            panner: Panner::new(),
            effects,
            scratch_left: Vec::new(),
            scratch_right: Vec::new(),
            pan_values: Vec::new(),
            interleave_left: Vec::new(),
            interleave_right: Vec::new(),
            sample_rate,
            block_size: 0,
            prepared: false,
        })
    }

    /// Tunes the oscillator bank, resets filters and reverb and sizes the
    /// scratch buffers. The only place the engine allocates.
    pub fn prepare_to_play(&mut self, sample_rate: f32, block_size: usize) -> Result<(), SynthError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }
        if block_size == 0 {
            return Err(SynthError::InvalidBlockSize);
        }

        // Inharmonic series: each step adds f/(i+1) scaled by the inharmonicity,
        // which lands exactly on the harmonics when the factor is 1.
        let mut frequency = self.config.start_frequency;
        for (i, oscillator) in self.oscillators.iter_mut().enumerate() {
            oscillator.prepare_to_play(frequency, sample_rate, block_size);
            debug!(oscillator = i, frequency, "Oscillator tuned");
            frequency += frequency / (i as f32 + 1.0) * self.config.inharmonicity;
        }

        for (lfo, &frequency) in self.lfos.iter_mut().zip(&self.config.lfo_frequencies) {
            lfo.prepare_to_play(frequency, sample_rate, block_size);
        }

        // Advanced once per block, so it runs at the block rate.
        let control_rate = sample_rate / block_size as f32;
        self.filter_modulator.prepare_to_play(
            self.config.filter_modulator_frequency,
            control_rate,
            block_size,
        );

        self.filter_left.set_cutoff(self.config.filter_cutoff, sample_rate);
        self.filter_right.set_cutoff(self.config.filter_cutoff, sample_rate);
        self.filter_left.reset();
        self.filter_right.reset();

        for effect in self.effects.iter_mut() {
            effect.configure(sample_rate);
        }

        for buffer in [
            &mut self.scratch_left,
            &mut self.scratch_right,
            &mut self.pan_values,
            &mut self.interleave_left,
            &mut self.interleave_right,
        ] {
            buffer.clear();
            buffer.resize(block_size, 0.0);
        }

        self.sample_rate = sample_rate;
        self.block_size = block_size;
        self.prepared = true;
        info!(
            sample_rate,
            block_size,
            oscillators = self.oscillators.len(),
            lfos = self.lfos.len(),
            "Synthesis prepared"
        );
        Ok(())
    }

    /// Sums of fade values over an oscillator's block: all rows, then the
    /// top and bottom halves separately.
    fn block_fade_sums(&self, oscillator_index: usize) -> (f32, f32, f32) {
        let half = self.config.rows / 2;
        let mut top = 0.0;
        let mut bottom = 0.0;
        for column in self.config.column_block(oscillator_index) {
            for row in 0..self.config.rows {
                let fade = self.grid.fade(row, column);
                if row < half {
                    top += fade;
                } else {
                    bottom += fade;
                }
            }
        }
        (top + bottom, top, bottom)
    }

    /// Mean fade over the oscillator's block, in [0, 1].
    pub fn oscillator_gain(&self, oscillator_index: usize) -> f32 {
        if oscillator_index >= self.oscillators.len() {
            return 0.0;
        }
        let (total, _, _) = self.block_fade_sums(oscillator_index);
        self.gain_from_sum(total)
    }

    /// Vertical balance of the oscillator's block: positive when the top
    /// half is livelier (pans right), negative when the bottom half is.
    pub fn oscillator_pan(&self, oscillator_index: usize) -> f32 {
        if oscillator_index >= self.oscillators.len() {
            return 0.0;
        }
        let (_, top, bottom) = self.block_fade_sums(oscillator_index);
        self.pan_from_sums(top, bottom)
    }

    #[inline]
    fn gain_from_sum(&self, total: f32) -> f32 {
        (total / self.config.cells_per_block() as f32).clamp(0.0, 1.0)
    }

    #[inline]
    fn pan_from_sums(&self, top: f32, bottom: f32) -> f32 {
        let half_block = self.config.cells_per_block() as f32 / 2.0;
        finite_or_zero((top - bottom) / half_block).clamp(-1.0, 1.0)
    }

    /// Pink-noise style rolloff: scales `gain` by `start_frequency / frequency`.
    pub fn spectral_gain_decay(&self, gain: f32, frequency: f32) -> f32 {
        if !(frequency.is_finite() && frequency > 0.0) {
            return 0.0;
        }
        gain * self.config.start_frequency / frequency
    }

    /// Advances the fade of every cell in the oscillator's block by one sample.
    pub fn update_fade_values(&self, oscillator_index: usize) {
        if oscillator_index >= self.oscillators.len() {
            return;
        }
        let decay = self.config.fade_decay;
        for column in self.config.column_block(oscillator_index) {
            for row in 0..self.config.rows {
                self.grid.advance_fade(row, column, decay);
            }
        }
    }

    /// Renders one block of planar stereo audio, overwriting `left` and
    /// `right`. Blocks longer than the prepared size are rendered in
    /// prepared-size chunks. Before `prepare_to_play` this writes silence.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        if !self.prepared {
            left.fill(0.0);
            right.fill(0.0);
            return;
        }

        let frames = left.len().min(right.len());
        left[frames..].fill(0.0);
        right[frames..].fill(0.0);

        let mut start = 0;
        while start < frames {
            let end = (start + self.block_size).min(frames);
            self.render_chunk(&mut left[start..end], &mut right[start..end]);
            start = end;
        }
    }

    fn render_chunk(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len();
        left.fill(0.0);
        right.fill(0.0);

        let num_lfos = self.lfos.len();
        for index in 0..self.oscillators.len() {
            let depth = (index as f32 + 1.0) * self.config.modulation_divisor;

            for i in 0..frames {
                let modulator = self.lfos[index % num_lfos].process_sample();
                let base_frequency = self.oscillators[index].frequency();
                let modulated = base_frequency + base_frequency / depth * modulator;
                let sample = self.oscillators[index].process_sample_at(modulated);

                let (total, top, bottom) = self.block_fade_sums(index);
                let density = self.gain_from_sum(total);
                let gain = density * self.spectral_gain_decay(density, modulated);

                self.scratch_left[i] = sample * gain;
                self.scratch_right[i] = sample * gain;
                self.pan_values[i] = self.pan_from_sums(top, bottom);

                self.update_fade_values(index);
            }

            self.panner.process_block(
                &mut self.scratch_left[..frames],
                &mut self.scratch_right[..frames],
                &self.pan_values[..frames],
            );

            for (out, scratch) in left.iter_mut().zip(&self.scratch_left[..frames]) {
                *out += scratch;
            }
            for (out, scratch) in right.iter_mut().zip(&self.scratch_right[..frames]) {
                *out += scratch;
            }
        }

        let filter_modulator = self.filter_modulator.process_sample();
        let cutoff = self.config.filter_cutoff
            * (filter_modulator + FILTER_SWEEP_OFFSET)
            * self.config.filter_sweep;
        self.filter_left.set_cutoff(cutoff, self.sample_rate);
        self.filter_right.set_cutoff(cutoff, self.sample_rate);
        self.filter_left.process_block(left);
        self.filter_right.process_block(right);

        for effect in self.effects.iter_mut() {
            effect.apply(left, right);
        }
        if self.config.reverb.reset_each_block {
            for effect in self.effects.iter_mut() {
                effect.reset();
            }
        }

        for sample in left.iter_mut().chain(right.iter_mut()) {
            *sample = finite_or_zero(*sample);
        }
    }

    /// Renders into an interleaved buffer of `channels` channels. Channel 0
    /// gets left, channel 1 right, any others silence; a mono buffer gets
    /// the average of both.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        if channels == 0 || !self.prepared {
            data.fill(0.0);
            return;
        }

        let mut left = std::mem::take(&mut self.interleave_left);
        let mut right = std::mem::take(&mut self.interleave_right);

        for chunk in data.chunks_mut(self.block_size * channels) {
            let frames = chunk.len() / channels;
            self.process_block(&mut left[..frames], &mut right[..frames]);

            for (i, frame) in chunk.chunks_mut(channels).enumerate() {
                let (l, r) = if i < frames {
                    (left[i], right[i])
                } else {
                    (0.0, 0.0)
                };
                write_frame(frame, l, r);
            }
        }

        self.interleave_left = left;
        self.interleave_right = right;
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn oscillators(&self) -> &[Oscillator] {
        &self.oscillators
    }

    pub fn lfos(&self) -> &[Oscillator] {
        &self.lfos
    }

    pub fn filter_cutoff(&self) -> f32 {
        self.filter_left.cutoff()
    }
}

fn write_frame(frame: &mut [f32], left: f32, right: f32) {
    match frame {
        [mono] => *mono = 0.5 * (left + right),
        [l, r, rest @ ..] => {
            *l = left;
            *r = right;
            rest.fill(0.0);
        }
        [] => {}
    }
}
