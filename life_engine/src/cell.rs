// cell.rs - Cell state for the in-place generation protocol

use std::sync::atomic::{AtomicU8, Ordering};

const ALIVE: u8     = 0b001;
const WAS_ALIVE: u8 = 0b010;
const PROCESSED: u8 = 0b100;

/// Decoded flags of one cell, all taken from the same atomic load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellState {
    pub alive: bool,        // state at the end of the last committed generation
    pub was_alive: bool,    // state at the start of the generation being computed
    pub processed: bool,    // committed for the generation in progress
}

impl CellState {
    fn from_bits(bits: u8) -> Self {
        Self {
            alive: bits & ALIVE != 0,
            was_alive: bits & WAS_ALIVE != 0,
            processed: bits & PROCESSED != 0,
        }
    }

    fn bits(self) -> u8 {
        let mut bits = 0;
        if self.alive { bits |= ALIVE; }
        if self.was_alive { bits |= WAS_ALIVE; }
        if self.processed { bits |= PROCESSED; }
        bits
    }

    /// The cell's value before the current generation, whichever phase it is in.
    pub fn pre_generation_alive(self) -> bool {
        if self.processed { self.was_alive } else { self.alive }
    }
}

/// Read-only view of a cell handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellView {
    pub x: usize,
    pub y: usize,
    pub alive: bool,
}

/// One grid cell. `alive`, `was_alive` and `processed` share a single atomic
/// byte so a neighbor on another thread never sees a new `alive` without the
/// matching `processed`.
#[derive(Debug)]
pub struct Cell {
    x: usize,
    y: usize,
    state: AtomicU8,
    neighbor_count: AtomicU8,
}

impl Cell {
    pub fn new(x: usize, y: usize, alive: bool) -> Self {
        let state = CellState { alive, was_alive: alive, processed: false };
        Self {
            x,
            y,
            state: AtomicU8::new(state.bits()),
            neighbor_count: AtomicU8::new(0),
        }
    }

    pub fn coords(&self) -> (usize, usize) {
        (self.x, self.y)
    }

    pub fn state(&self) -> CellState {
        CellState::from_bits(self.state.load(Ordering::Acquire))
    }

    pub fn is_alive(&self) -> bool {
        self.state().alive
    }

    /// Scratch value from the most recent compute phase.
    pub fn neighbor_count(&self) -> u8 {
        self.neighbor_count.load(Ordering::Relaxed)
    }

    pub fn view(&self) -> CellView {
        CellView { x: self.x, y: self.y, alive: self.is_alive() }
    }

    pub fn pre_generation_alive(&self) -> bool {
        self.state().pre_generation_alive()
    }

    /// Phase A. Only ever writes `false`, so concurrent resets commute.
    pub(crate) fn clear_processed(&self) {
        self.state.fetch_and(!PROCESSED, Ordering::AcqRel);
    }

    /// Phase B step 1: record `was_alive := alive` and return the snapshot.
    pub(crate) fn snapshot(&self) -> bool {
        let alive = self.is_alive();
        let bits = CellState { alive, was_alive: alive, processed: false }.bits();
        self.state.store(bits, Ordering::Release);
        alive
    }

    /// Phase B steps 3 and 4. The new `alive` and `processed` land in one store.
    pub(crate) fn commit(&self, was_alive: bool, alive: bool, neighbor_count: u8) {
        self.neighbor_count.store(neighbor_count, Ordering::Relaxed);
        let bits = CellState { alive, was_alive, processed: true }.bits();
        self.state.store(bits, Ordering::Release);
    }
}
