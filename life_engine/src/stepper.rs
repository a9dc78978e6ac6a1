// stepper.rs - Advances one band of rows by a generation, in place

use std::ops::Range;

use crate::grid::Grid;

/// Classic B3/S23: fewer than 2 or more than 3 neighbors die, exactly 3 is
/// born or survives, 2 keeps whatever the cell was.
pub fn apply_rule(alive: bool, neighbors: u8) -> bool {
    match neighbors {
        2 => alive,
        3 => true,
        _ => false,
    }
}

/// Live neighbors of `(x, y)` as they stood before the current generation.
///
/// A neighbor that is already processed this generation is read through its
/// `was_alive` snapshot; an unprocessed one still holds its old `alive`.
pub fn count_live_neighbors(grid: &Grid, x: usize, y: usize) -> u8 {
    grid.neighbors(x, y)
        .filter(|cell| cell.pre_generation_alive())
        .count() as u8
}

/// Phase A: clear `processed` over the whole grid.
pub fn reset_phase(grid: &Grid) {
    grid.reset_processed();
}

/// Phase B for the rows in `band`. Every cell of the grid must have been
/// reset before any worker enters this phase.
pub fn compute_phase(grid: &Grid, band: Range<usize>) {
    assert!(
        band.end <= grid.size(),
        "band {band:?} reaches past a grid of {} rows",
        grid.size()
    );

    for x in band {
        for cell in grid.row(x) {
            let was_alive = cell.snapshot();
            let (_, y) = cell.coords();
            let neighbors = count_live_neighbors(grid, x, y);
            cell.commit(was_alive, apply_rule(was_alive, neighbors), neighbors);
        }
    }
}

/// Runs both phases over the whole grid in the calling thread.
pub fn step_serial(grid: &Grid) {
    reset_phase(grid);
    compute_phase(grid, 0..grid.size());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn live(grid: &Grid) -> BTreeSet<(usize, usize)> {
        grid.live_cells()
    }

    #[test]
    fn rule_table() {
        for n in 0..=8u8 {
            let survives = apply_rule(true, n);
            let born = apply_rule(false, n);
            assert_eq!(survives, n == 2 || n == 3, "live cell with {n} neighbors");
            assert_eq!(born, n == 3, "dead cell with {n} neighbors");
        }
    }

    #[test]
    fn corner_sees_only_three_neighbors() {
        // a fully live 3x3 grid: corners have 3, edges 5, center 8
        let all: Vec<_> = (0..3).flat_map(|x| (0..3).map(move |y| (x, y))).collect();
        let grid = Grid::new(3, all).unwrap();
        assert_eq!(count_live_neighbors(&grid, 0, 0), 3);
        assert_eq!(count_live_neighbors(&grid, 0, 1), 5);
        assert_eq!(count_live_neighbors(&grid, 1, 1), 8);

        step_serial(&grid);
        assert_eq!(grid.cell(0, 0).neighbor_count(), 3);
        assert_eq!(grid.cell(1, 0).neighbor_count(), 5);
        assert_eq!(live(&grid), [(0, 0), (0, 2), (2, 0), (2, 2)].into_iter().collect());
    }

    #[test]
    fn blinker_flips() {
        let grid = Grid::new(5, [(2, 1), (2, 2), (2, 3)]).unwrap();
        step_serial(&grid);
        assert_eq!(live(&grid), [(1, 2), (2, 2), (3, 2)].into_iter().collect());
        step_serial(&grid);
        assert_eq!(live(&grid), [(2, 1), (2, 2), (2, 3)].into_iter().collect());
    }

    #[test]
    fn bands_can_run_in_any_order() {
        let start = [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)];
        let forward = Grid::new(6, start).unwrap();
        let backward = Grid::new(6, start).unwrap();

        reset_phase(&forward);
        compute_phase(&forward, 0..3);
        compute_phase(&forward, 3..6);

        reset_phase(&backward);
        compute_phase(&backward, 3..6);
        compute_phase(&backward, 0..3);

        assert_eq!(live(&forward), live(&backward));
    }

    #[test]
    #[should_panic(expected = "reaches past")]
    fn band_past_grid_panics() {
        let grid = Grid::new(4, [(0, 0)]).unwrap();
        compute_phase(&grid, 2..5);
    }
}
