use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Fades below this are flushed to exactly zero.
const FADE_FLOOR: f32 = 1e-6;

/// One automaton cell.
///
/// `alive` is written by the automaton, `fade` by the audio thread. Both are
/// atomics with relaxed ordering: readers may observe a mix of old and new
/// generations, which is acceptable for audio.
#[derive(Debug)]
pub struct Cell {
    alive: AtomicBool,
    fade: AtomicU32,
}

impl Cell {
    fn new() -> Self {
        Self {
            alive: AtomicBool::new(false),
            fade: AtomicU32::new(0.0f32.to_bits()),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn fade(&self) -> f32 {
        f32::from_bits(self.fade.load(Ordering::Relaxed))
    }

    #[inline]
    fn store_fade(&self, fade: f32) {
        self.fade.store(fade.to_bits(), Ordering::Relaxed);
    }

    /// Alive cells snap to full fade; dead cells decay towards zero.
    #[inline]
    pub fn advance_fade(&self, decay: f32) {
        if self.is_alive() {
            self.store_fade(1.0);
        } else {
            let fade = self.fade() * decay;
            self.store_fade(if fade < FADE_FLOOR { 0.0 } else { fade });
        }
    }
}

/// Fixed-size rows x columns field of cells. Dimensions never change after
/// construction.
#[derive(Debug)]
pub struct Grid {
    rows: usize,
    columns: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: (0..rows * columns).map(|_| Cell::new()).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    fn index(&self, row: usize, column: usize) -> usize {
        debug_assert!(row < self.rows && column < self.columns);
        row * self.columns + column
    }

    /// Panics if `row`/`column` are out of bounds.
    #[inline]
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.cells[self.index(row, column)]
    }

    #[inline]
    pub fn is_cell_alive(&self, row: usize, column: usize) -> bool {
        self.cell(row, column).is_alive()
    }

    #[inline]
    pub fn fade(&self, row: usize, column: usize) -> f32 {
        self.cell(row, column).fade()
    }

    #[inline]
    pub fn advance_fade(&self, row: usize, column: usize, decay: f32) {
        self.cell(row, column).advance_fade(decay);
    }

    pub fn set_alive(&self, row: usize, column: usize, alive: bool) {
        self.cell(row, column).alive.store(alive, Ordering::Relaxed);
    }

    pub fn set_fade(&self, row: usize, column: usize, fade: f32) {
        let fade = if fade.is_finite() { fade.clamp(0.0, 1.0) } else { 0.0 };
        self.cell(row, column).store_fade(fade);
    }

    pub fn clear(&self) {
        for cell in &self.cells {
            cell.alive.store(false, Ordering::Relaxed);
            cell.store_fade(0.0);
        }
    }

    /// Randomly brings cells to life with probability `density`.
    pub fn seed<R: Rng + ?Sized>(&self, density: f32, rng: &mut R) {
        let density = f64::from(density.clamp(0.0, 1.0));
        for cell in &self.cells {
            let alive = rng.random_bool(density);
            cell.alive.store(alive, Ordering::Relaxed);
            if alive {
                cell.store_fade(1.0);
            }
        }
    }

    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Copies every cell's alive state, row-major, into `out`.
    pub fn snapshot_into(&self, out: &mut Vec<bool>) {
        out.clear();
        out.extend(self.cells.iter().map(Cell::is_alive));
    }

    pub fn snapshot(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity(self.cells.len());
        self.snapshot_into(&mut out);
        out
    }
}

/// The synthesis engine's handle on the grid: it may read cells and advance
/// their fades, nothing else.
///
/// Not synchronized against the automaton. The automaton may publish a new
/// generation while a block is being rendered and the engine will simply
/// see part of it.
#[derive(Clone, Debug)]
pub struct GridView {
    grid: Arc<Grid>,
}

impl GridView {
    pub fn new(grid: Arc<Grid>) -> Self {
        Self { grid }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn columns(&self) -> usize {
        self.grid.columns()
    }

    #[inline]
    pub fn is_cell_alive(&self, row: usize, column: usize) -> bool {
        self.grid.is_cell_alive(row, column)
    }

    #[inline]
    pub fn fade(&self, row: usize, column: usize) -> f32 {
        self.grid.fade(row, column)
    }

    #[inline]
    pub fn advance_fade(&self, row: usize, column: usize, decay: f32) {
        self.grid.advance_fade(row, column, decay);
    }
}

impl From<Arc<Grid>> for GridView {
    fn from(grid: Arc<Grid>) -> Self {
        Self::new(grid)
    }
}
