use super::error::ConfigError;
use super::waveform::Waveform;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;
use tracing::debug;

/// Settings for the stereo feedback-delay-network reverb.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverbConfig {
    pub channels: usize,
    pub diffusion_steps: usize,
    pub room_size_ms: f32,
    pub rt60: f32,
    pub dry_wet: f32,
    /// Clear the reverb tail after every processed block.
    pub reset_each_block: bool,
    /// Seed for the random delay times and feedback matrix.
    pub seed: u64,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            channels: 8,
            diffusion_steps: 4,
            room_size_ms: 100.0,
            rt60: 3.0,
            dry_wet: 0.5,
            reset_each_block: true,
            seed: 7,
        }
    }
}

/// Immutable per-run configuration shared by the grid, the automaton and
/// the synthesis engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    pub rows: usize,
    pub columns: usize,
    pub num_oscillators: usize,
    /// One entry per LFO; oscillator `i` is modulated by LFO `i % len`.
    pub lfo_frequencies: Vec<f32>,
    pub start_frequency: f32,
    pub inharmonicity: f32,
    pub modulation_divisor: f32,
    pub oscillator_waveform: Waveform,
    pub lfo_waveform: Waveform,
    pub filter_cutoff: f32,
    pub filter_sweep: f32,
    pub filter_modulator_frequency: f32,
    pub distortion_drive: f32,
    /// Multiplier applied to a dead cell's fade once per sample.
    pub fade_decay: f32,
    pub generation_interval_ms: u64,
    pub initial_density: f32,
    pub refresh_ms: u64,
    pub reverb: ReverbConfig,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            rows: 32,
            columns: 32,
            num_oscillators: 8,
            lfo_frequencies: vec![0.5, 0.75, 1.25, 2.0],
            start_frequency: 55.0,
            inharmonicity: 1.1,
            modulation_divisor: 5.0,
            oscillator_waveform: Waveform::Sine,
            lfo_waveform: Waveform::Sine,
            filter_cutoff: 100.0,
            filter_sweep: 100.0,
            filter_modulator_frequency: 0.1,
            distortion_drive: 5.0,
            fade_decay: 0.9999,
            generation_interval_ms: 250,
            initial_density: 0.3,
            refresh_ms: 100,
            reverb: ReverbConfig::default(),
        }
    }
}

impl SynthConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.rows,
                columns: self.columns,
            });
        }
        if self.num_oscillators == 0 {
            return Err(ConfigError::NoOscillators);
        }
        if self.lfo_frequencies.is_empty() {
            return Err(ConfigError::NoLfos);
        }
        if self.lfo_frequencies.len() > self.num_oscillators {
            return Err(ConfigError::TooManyLfos {
                lfos: self.lfo_frequencies.len(),
                oscillators: self.num_oscillators,
            });
        }
        if self.columns % self.num_oscillators != 0 {
            return Err(ConfigError::UnevenColumns {
                columns: self.columns,
                oscillators: self.num_oscillators,
            });
        }

        positive("start_frequency", self.start_frequency)?;
        positive("inharmonicity", self.inharmonicity)?;
        positive("modulation_divisor", self.modulation_divisor)?;
        positive("filter_cutoff", self.filter_cutoff)?;
        positive("filter_sweep", self.filter_sweep)?;
        positive("filter_modulator_frequency", self.filter_modulator_frequency)?;
        positive("distortion_drive", self.distortion_drive)?;
        for &frequency in &self.lfo_frequencies {
            positive("lfo_frequencies", frequency)?;
        }

        // Decay of exactly 1.0 would keep dead cells audible forever.
        in_range("fade_decay", self.fade_decay, 0.0, 0.999_999_9)?;
        in_range("initial_density", self.initial_density, 0.0, 1.0)?;

        if self.generation_interval_ms == 0 {
            return Err(ConfigError::ZeroGenerationInterval);
        }

        let reverb = &self.reverb;
        if reverb.channels < 2 || !reverb.channels.is_power_of_two() {
            return Err(ConfigError::ReverbChannels(reverb.channels));
        }
        if reverb.diffusion_steps == 0 {
            return Err(ConfigError::ReverbDiffusion);
        }
        positive("reverb.room_size_ms", reverb.room_size_ms)?;
        in_range("reverb.rt60", reverb.rt60, 0.0, f32::MAX)?;
        in_range("reverb.dry_wet", reverb.dry_wet, 0.0, 1.0)?;

        Ok(())
    }

    pub fn num_lfos(&self) -> usize {
        self.lfo_frequencies.len()
    }

    pub fn columns_per_oscillator(&self) -> usize {
        self.columns / self.num_oscillators
    }

    /// Columns owned by oscillator `oscillator_index`, across all rows.
    pub fn column_block(&self, oscillator_index: usize) -> Range<usize> {
        let width = self.columns_per_oscillator();
        let start = oscillator_index * width;
        start..start + width
    }

    /// Cells in one oscillator's block.
    pub fn cells_per_block(&self) -> usize {
        self.rows * self.columns_per_oscillator()
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn in_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}
