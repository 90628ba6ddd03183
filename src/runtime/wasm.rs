use crate::life::{Automaton, GenerationClock, Grid, GridView};
use crate::synth::{SynthConfig, Synthesis};
use js_sys::Float32Array;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::Arc;
use wasm_bindgen::prelude::*;

/// WASM runtime (no threads): the automaton is stepped on a sample clock
/// from inside `render`.
#[wasm_bindgen]
pub struct WasmLife {
    synthesis: Synthesis,
    automaton: Automaton,
    clock: GenerationClock,
    rng: SmallRng,
    left: Vec<f32>,
    right: Vec<f32>,
    interleaved: Vec<f32>,
}

#[wasm_bindgen]
impl WasmLife {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32) -> Result<WasmLife, JsValue> {
        let config = SynthConfig::default();
        let grid = Arc::new(Grid::new(config.rows, config.columns));
        let mut rng = SmallRng::seed_from_u64(u64::from(seed));
        grid.seed(config.initial_density, &mut rng);

        let clock = GenerationClock::new(config.generation_interval_ms, 44100.0);
        let synthesis = Synthesis::new(config, GridView::new(grid.clone()))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        Ok(WasmLife {
            synthesis,
            automaton: Automaton::new(grid),
            clock,
            rng,
            left: Vec::new(),
            right: Vec::new(),
            interleaved: Vec::new(),
        })
    }

    /// Renders `length` interleaved stereo frames.
    #[wasm_bindgen]
    pub fn render(&mut self, length: usize, sample_rate: f32) -> Result<Float32Array, JsValue> {
        if !self.synthesis.is_prepared()
            || self.synthesis.sample_rate() != sample_rate
            || self.synthesis.block_size() != length
        {
            self.synthesis
                .prepare_to_play(sample_rate, length)
                .map_err(|e| JsValue::from_str(&e.to_string()))?;
            self.clock = GenerationClock::new(
                self.synthesis.config().generation_interval_ms,
                sample_rate,
            );
            self.left = vec![0.0; length];
            self.right = vec![0.0; length];
            self.interleaved = vec![0.0; length * 2];
        }

        for _ in 0..self.clock.advance(length) {
            self.automaton.step();
        }
        self.synthesis.process_block(&mut self.left, &mut self.right);

        for (frame, (&l, &r)) in self
            .interleaved
            .chunks_mut(2)
            .zip(self.left.iter().zip(&self.right))
        {
            frame[0] = l;
            frame[1] = r;
        }
        Ok(Float32Array::from(self.interleaved.as_slice()))
    }

    /// Alive state of every cell, row-major, as 0/1 bytes.
    #[wasm_bindgen]
    pub fn cells(&self) -> Vec<u8> {
        self.automaton
            .grid()
            .snapshot()
            .into_iter()
            .map(u8::from)
            .collect()
    }

    #[wasm_bindgen]
    pub fn rows(&self) -> usize {
        self.automaton.grid().rows()
    }

    #[wasm_bindgen]
    pub fn columns(&self) -> usize {
        self.automaton.grid().columns()
    }

    #[wasm_bindgen]
    pub fn reseed(&mut self, density: f32) {
        let grid = self.automaton.grid();
        grid.clear();
        grid.seed(density, &mut self.rng);
    }
}
