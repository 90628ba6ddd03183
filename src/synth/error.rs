use std::path::PathBuf;
use thiserror::Error;

/// Problems found while loading or validating a [`SynthConfig`](super::SynthConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column (got {rows}x{columns})")]
    EmptyGrid { rows: usize, columns: usize },

    #[error("at least one oscillator is required")]
    NoOscillators,

    #[error("at least one LFO frequency is required")]
    NoLfos,

    #[error("{lfos} LFOs configured but only {oscillators} oscillators")]
    TooManyLfos { lfos: usize, oscillators: usize },

    #[error("{columns} columns cannot be split evenly between {oscillators} oscillators")]
    UnevenColumns { columns: usize, oscillators: usize },

    #[error("{name} must be a positive finite number (got {value})")]
    NonPositive { name: &'static str, value: f32 },

    #[error("{name} must lie in {min}..={max} (got {value})")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("reverb channel count must be a power of two >= 2 (got {0})")]
    ReverbChannels(usize),

    #[error("reverb needs at least one diffusion step")]
    ReverbDiffusion,

    #[error("generation interval must be non-zero")]
    ZeroGenerationInterval,

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised while building or preparing the synthesis engine.
///
/// None of these can occur from `process_block`; they are all caught before
/// playback starts.
#[derive(Debug, Error)]
pub enum SynthError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("grid is {grid_rows}x{grid_columns} but config expects {rows}x{columns}")]
    GridMismatch {
        grid_rows: usize,
        grid_columns: usize,
        rows: usize,
        columns: usize,
    },

    #[error("invalid sample rate {0}")]
    InvalidSampleRate(f32),

    #[error("block size must be non-zero")]
    InvalidBlockSize,
}
