use crate::synth::{ConfigError, SynthError};
use thiserror::Error;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
use crate::audio::AudioError;

/// Failures while setting up a live or offline run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error("render length must be positive (got {0} seconds)")]
    InvalidDuration(f32),

    #[error("failed to spawn automaton thread: {0}")]
    Thread(#[source] std::io::Error),

    #[cfg(all(feature = "native", not(target_arch = "wasm32")))]
    #[error(transparent)]
    Audio(#[from] AudioError),

    #[cfg(feature = "native")]
    #[error("failed to write WAV: {0}")]
    Wav(#[from] hound::Error),
}
