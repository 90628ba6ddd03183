use super::grid::Grid;
use std::sync::atomic::{AtomicBool, Ordering};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Conway's Game of Life (B3/S23) on a toroidal grid.
///
/// Next states are computed into a pre-sized scratch buffer from the current
/// generation and then published cell by cell, so readers never see a
/// half-computed neighbourhood, only a partially published generation.
#[derive(Debug)]
pub struct Automaton {
    grid: Arc<Grid>,
    next: Vec<bool>,
    row_offsets: Vec<usize>,
    column_offsets: Vec<usize>,
    generation: u64,
}

/// Distinct forward offsets reaching the previous, same and next index on a
/// ring of `n`. Narrow rings have fewer than three.
fn torus_offsets(n: usize) -> Vec<usize> {
    let mut offsets = vec![0, 1 % n.max(1), n.saturating_sub(1)];
    offsets.sort_unstable();
    offsets.dedup();
    offsets
}

impl Automaton {
    pub fn new(grid: Arc<Grid>) -> Self {
        let cells = grid.rows() * grid.columns();
        Self {
            row_offsets: torus_offsets(grid.rows()),
            column_offsets: torus_offsets(grid.columns()),
            grid,
            next: vec![false; cells],
            generation: 0,
        }
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn live_neighbours(&self, row: usize, column: usize) -> usize {
        let rows = self.grid.rows();
        let columns = self.grid.columns();
        let mut count = 0;
        for &dr in &self.row_offsets {
            for &dc in &self.column_offsets {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = (row + dr) % rows;
                let c = (column + dc) % columns;
                if self.grid.is_cell_alive(r, c) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Advances the grid by one generation.
    pub fn step(&mut self) {
        let rows = self.grid.rows();
        let columns = self.grid.columns();
        if rows == 0 || columns == 0 {
            return;
        }

        for row in 0..rows {
            for column in 0..columns {
                let neighbours = self.live_neighbours(row, column);
                let alive = self.grid.is_cell_alive(row, column);
                self.next[row * columns + column] =
                    matches!((alive, neighbours), (true, 2) | (_, 3));
            }
        }

        for row in 0..rows {
            for column in 0..columns {
                self.grid
                    .set_alive(row, column, self.next[row * columns + column]);
            }
        }
        self.generation += 1;
    }

    /// Steps every `interval` until `stop` is raised. Meant to run on its own
    /// thread next to the audio callback.
    pub fn run(&mut self, interval: Duration, stop: &AtomicBool) {
        info!("Automaton running every {:?}", interval);
        while !stop.load(Ordering::Relaxed) {
            thread::sleep(interval);
            self.step();
            debug!(
                generation = self.generation,
                live = self.grid.live_count(),
                "Stepped automaton"
            );
        }
        info!("Automaton stopped after {} generations", self.generation);
    }
}

/// An [`Automaton`] stepping on its own thread.
///
/// The thread is stopped and joined by [`AutomatonThread::halt`], or on drop
/// if the owner bails out early.
#[derive(Debug)]
pub struct AutomatonThread {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<u64>>,
}

impl AutomatonThread {
    pub fn spawn(mut automaton: Automaton, interval: Duration) -> io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let handle = {
            let stop = stop.clone();
            thread::Builder::new()
                .name("automaton".into())
                .spawn(move || {
                    automaton.run(interval, &stop);
                    automaton.generation()
                })?
        };
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Stops the thread and waits for it. Returns the number of generations
    /// stepped, or `None` if the thread panicked.
    pub fn halt(mut self) -> Option<u64> {
        self.stop.store(true, Ordering::Relaxed);
        self.handle.take().and_then(|handle| handle.join().ok())
    }
}

impl Drop for AutomatonThread {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Counts automaton ticks in sample time, for hosts without a wall clock
/// (offline rendering, the browser).
#[derive(Clone, Debug)]
pub struct GenerationClock {
    interval_samples: u64,
    remaining: u64,
}

impl GenerationClock {
    pub fn new(interval_ms: u64, sample_rate: f32) -> Self {
        let interval_samples =
            ((interval_ms as f64 * 0.001 * f64::from(sample_rate.max(1.0))).round() as u64).max(1);
        Self {
            interval_samples,
            remaining: interval_samples,
        }
    }

    pub fn interval_samples(&self) -> u64 {
        self.interval_samples
    }

    /// Advances by `samples` and returns how many generations elapsed.
    pub fn advance(&mut self, samples: usize) -> u64 {
        let mut samples = samples as u64;
        let mut ticks = 0;
        while samples >= self.remaining {
            samples -= self.remaining;
            self.remaining = self.interval_samples;
            ticks += 1;
        }
        self.remaining -= samples;
        ticks
    }
}
