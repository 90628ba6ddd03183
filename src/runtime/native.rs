use super::RuntimeError;
use crate::audio::{AudioBackend, CpalBackend};
use crate::life::{render_text, Automaton, AutomatonThread, Grid, GridView};
use crate::synth::{SynthConfig, SynthError, Synthesis};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Native runtime synth implementation for desktop/CPAL backends.
pub struct NativeSynth {
    synthesis: Synthesis,
}

impl NativeSynth {
    pub fn new(synthesis: Synthesis) -> Self {
        Self { synthesis }
    }

    pub fn prepare(&mut self, sample_rate: f32, block_size: usize) -> Result<(), SynthError> {
        self.synthesis.prepare_to_play(sample_rate, block_size)
    }

    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize) {
        self.synthesis.process_interleaved(data, channels);
    }

    pub fn synthesis(&self) -> &Synthesis {
        &self.synthesis
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlayOptions {
    /// Case-insensitive substring of the output device name.
    pub device: Option<String>,
    pub seed: u64,
    /// Play until interrupted when `None`.
    pub duration: Option<Duration>,
    /// Redraw the grid in the terminal every `refresh_ms`.
    pub show: bool,
}

/// Seeds a grid, starts the automaton thread and the audio stream, and
/// blocks until `options.duration` has elapsed.
pub fn start(config: SynthConfig, options: PlayOptions) -> Result<(), RuntimeError> {
    config.validate()?;

    let grid = Arc::new(Grid::new(config.rows, config.columns));
    let mut rng = SmallRng::seed_from_u64(options.seed);
    grid.seed(config.initial_density, &mut rng);
    info!(
        rows = config.rows,
        columns = config.columns,
        live = grid.live_count(),
        seed = options.seed,
        "Grid seeded"
    );

    let synthesis = Synthesis::new(config.clone(), GridView::new(grid.clone()))?;
    let synth = Arc::new(Mutex::new(NativeSynth::new(synthesis)));

    let stepper = AutomatonThread::spawn(
        Automaton::new(grid.clone()),
        Duration::from_millis(config.generation_interval_ms),
    )
    .map_err(RuntimeError::Thread)?;

    // An early return drops `stepper`, which stops and joins the thread.
    let mut audio_backend = CpalBackend::new(synth, options.device.clone());
    audio_backend.start()?;

    let refresh = Duration::from_millis(config.refresh_ms.max(1));
    let started = Instant::now();
    let mut snapshot = Vec::with_capacity(config.rows * config.columns);

    while options.duration.map_or(true, |d| started.elapsed() < d) {
        thread::sleep(refresh);
        if options.show {
            grid.snapshot_into(&mut snapshot);
            // Clear screen, home cursor
            print!("\x1B[2J\x1B[H{}", render_text(&snapshot, config.columns));
        }
    }

    let stopped = audio_backend.stop();
    match stepper.halt() {
        Some(generations) => info!(generations, "Automaton thread joined"),
        None => warn!("Automaton thread panicked"),
    }
    stopped?;
    Ok(())
}
