//! Generative synthesizer whose oscillator bank is played by Conway's Game
//! of Life.

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod audio;
pub mod life;
pub mod runtime;
pub mod synth;
