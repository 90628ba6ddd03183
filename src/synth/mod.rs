pub mod config;
pub mod effect;
pub mod engine;
pub mod error;
pub mod filter;
pub mod oscillator;
pub mod panner;
pub mod prelude;
pub mod reverb;
pub mod waveform;

pub use config::{ReverbConfig, SynthConfig};
pub use effect::soft_clip;
pub use engine::Synthesis;
pub use error::{ConfigError, SynthError};
pub use oscillator::{Oscillator, OscillatorRole};
pub use panner::Panner;
pub use waveform::Waveform;
