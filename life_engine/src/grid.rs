// grid.rs - Square cell arena shared by all workers

use std::collections::BTreeSet;

use crate::cell::{Cell, CellView};
use crate::error::ConfigError;

/// Fixed-size `size x size` arena, indexed by `(row, column)`.
///
/// Workers borrow it as `&Grid`; all mutation goes through the cells' atomics.
#[derive(Debug)]
pub struct Grid {
    size: usize,
    cells: Box<[Cell]>,
}

impl Grid {
    /// Builds the grid with every coordinate in `live` set alive.
    pub fn new<I>(size: usize, live: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        if size == 0 {
            return Err(ConfigError::ZeroSize);
        }

        let len = size.checked_mul(size).ok_or(ConfigError::SizeTooLarge(size))?;
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| ConfigError::SizeTooLarge(size))?;
        cells.extend((0..len).map(|i| Cell::new(i / size, i % size, false)));

        for (x, y) in live {
            if x >= size || y >= size {
                return Err(ConfigError::CellOutOfBounds { x, y, size });
            }
            cells[x * size + y] = Cell::new(x, y, true);
        }

        Ok(Self { size, cells: cells.into_boxed_slice() })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Panics on coordinates outside the grid; callers compute them from bounds.
    pub fn cell(&self, x: usize, y: usize) -> &Cell {
        assert!(
            x < self.size && y < self.size,
            "cell ({x}, {y}) outside {0}x{0} grid",
            self.size
        );
        &self.cells[x * self.size + y]
    }

    pub fn row(&self, x: usize) -> &[Cell] {
        assert!(x < self.size, "row {x} outside {0}x{0} grid", self.size);
        &self.cells[x * self.size..(x + 1) * self.size]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// The up to 8 cells around `(x, y)`, clipped to the grid (no wraparound).
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = &Cell> + '_ {
        let rows = x.saturating_sub(1)..=(x + 1).min(self.size - 1);
        rows.flat_map(move |nx| {
            let cols = y.saturating_sub(1)..=(y + 1).min(self.size - 1);
            cols.map(move |ny| (nx, ny))
        })
        .filter(move |&pos| pos != (x, y))
        .map(move |(nx, ny)| self.cell(nx, ny))
    }

    /// Phase A over the whole grid.
    pub fn reset_processed(&self) {
        for cell in self.cells.iter() {
            cell.clear_processed();
        }
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_alive()
    }

    pub fn live_cells(&self) -> BTreeSet<(usize, usize)> {
        self.cells
            .iter()
            .filter(|cell| cell.is_alive())
            .map(Cell::coords)
            .collect()
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Copies the current `alive` values. Taken without synchronizing with the
    /// workers, so bands may belong to different generations.
    pub fn snapshot(&self) -> GridSnapshot {
        let rows = self
            .cells
            .chunks(self.size)
            .map(|row| row.iter().map(Cell::view).collect())
            .collect();
        GridSnapshot { rows }
    }
}

/// Plain-data copy of the grid for renderers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSnapshot {
    rows: Vec<Vec<CellView>>,
}

impl GridSnapshot {
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<CellView>] {
        &self.rows
    }

    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.rows
            .get(x)
            .and_then(|row| row.get(y))
            .is_some_and(|cell| cell.alive)
    }

    pub fn live_cells(&self) -> BTreeSet<(usize, usize)> {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| cell.alive)
            .map(|cell| (cell.x, cell.y))
            .collect()
    }

    pub fn population(&self) -> usize {
        self.rows.iter().flatten().filter(|cell| cell.alive).count()
    }
}
