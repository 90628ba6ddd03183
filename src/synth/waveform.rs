use crate::synth::prelude::PI;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

#[derive(Debug, Clone)]
pub struct WaveformGenerator {
    pub waveform: Waveform,
}

impl WaveformGenerator {
    pub fn new(waveform: Waveform) -> Self {
        Self { waveform }
    }

    /// Evaluates the waveform at `phase` radians. All shapes stay in [-1, 1].
    #[inline]
    pub fn evaluate(&self, phase: f32) -> f32 {
        match self.waveform {
            Waveform::Sine => phase.sin(),
            Waveform::Square => {
                if phase.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => {
                let cycles = phase / (2.0 * PI);
                2.0 * (cycles - (cycles + 0.5).floor())
            }
            // asin can drift just past 1.0 in f32
            Waveform::Triangle => ((2.0 / PI) * phase.sin().asin()).clamp(-1.0, 1.0),
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn get_waveform(&self) -> Waveform {
        self.waveform
    }
}

impl Default for WaveformGenerator {
    fn default() -> Self {
        Self::new(Waveform::Sine)
    }
}
