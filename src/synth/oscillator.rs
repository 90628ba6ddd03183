use super::waveform::{Waveform, WaveformGenerator};
use crate::synth::prelude::TAU;

/// What an oscillator is used for. Both roles share the same behaviour;
/// the role only documents the expected frequency range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OscillatorRole {
    Audio,
    Modulation,
}

/// Single phase-accumulating voice.
///
/// Phase is kept normalized to `[0, 1)`. `set_frequency` only stores the new
/// frequency; call [`Oscillator::update_phase_delta`] before the next
/// [`Oscillator::process_sample`] for it to take effect. For transient
/// per-sample frequencies (e.g. FM) use [`Oscillator::process_sample_at`],
/// which leaves the stored frequency alone.
#[derive(Clone, Debug)]
pub struct Oscillator {
    role: OscillatorRole,
    waveform_generator: WaveformGenerator,
    frequency: f32,
    phase: f32,
    phase_delta: f32,
    sample_rate: f32,
    block_size: usize,
}

impl Oscillator {
    pub fn new(role: OscillatorRole) -> Self {
        Self {
            role,
            waveform_generator: WaveformGenerator::default(),
            frequency: 0.0,
            phase: 0.0,
            phase_delta: 0.0,
            sample_rate: 44100.0,
            block_size: 0,
        }
    }

    pub fn audio() -> Self {
        Self::new(OscillatorRole::Audio)
    }

    pub fn modulation() -> Self {
        Self::new(OscillatorRole::Modulation)
    }

    pub fn with_waveform(mut self, waveform: Waveform) -> Self {
        self.set_waveform(waveform);
        self
    }

    /// Resets the phase and derives the phase delta for `frequency`.
    pub fn prepare_to_play(&mut self, frequency: f32, sample_rate: f32, block_size: usize) {
        self.frequency = frequency;
        self.sample_rate = sample_rate.max(1.0);
        self.block_size = block_size;
        self.phase = 0.0;
        self.update_phase_delta();
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn update_phase_delta(&mut self) {
        self.phase_delta = self.frequency / self.sample_rate;
    }

    /// Advances one sample at the stored frequency.
    #[inline]
    pub fn process_sample(&mut self) -> f32 {
        self.advance(self.phase_delta)
    }

    /// Advances one sample at `frequency` without persisting it.
    #[inline]
    pub fn process_sample_at(&mut self, frequency: f32) -> f32 {
        self.advance(frequency / self.sample_rate)
    }

    #[inline]
    fn advance(&mut self, delta: f32) -> f32 {
        self.phase += delta;
        // floor() also wraps negative deltas back into range
        self.phase -= self.phase.floor();
        if self.phase >= 1.0 {
            // tiny negative phases round up to exactly 1.0
            self.phase = 0.0;
        }
        self.waveform_generator.evaluate(self.phase * TAU)
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform_generator.set_waveform(waveform);
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform_generator.get_waveform()
    }

    pub fn role(&self) -> OscillatorRole {
        self.role
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn phase_delta(&self) -> f32 {
        self.phase_delta
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::audio()
    }
}
