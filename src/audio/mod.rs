mod cpal_backend;
pub use self::cpal_backend::CpalBackend;

use crate::synth::SynthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no output device available")]
    NoOutputDevice,

    #[error("output device {0:?} not found")]
    DeviceNotFound(String),

    #[error("unsupported sample format {0:?}")]
    UnsupportedSampleFormat(cpal::SampleFormat),

    #[error("synth state lock poisoned")]
    Poisoned,

    #[error(transparent)]
    Devices(#[from] cpal::DevicesError),

    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error(transparent)]
    PauseStream(#[from] cpal::PauseStreamError),

    #[error(transparent)]
    Synth(#[from] SynthError),
}

pub trait AudioBackend {
    fn start(&mut self) -> Result<(), AudioError>;
    fn stop(&mut self) -> Result<(), AudioError>;
}
