//! The cellular automaton the synthesizer listens to.

pub mod automaton;
pub mod grid;
pub mod render;

pub use automaton::{Automaton, AutomatonThread, GenerationClock};
pub use grid::{Cell, Grid, GridView};
pub use render::render_text;
