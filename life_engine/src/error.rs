// error.rs - Error types for the life engine

use thiserror::Error;

/// Rejected simulation settings. Raised at construction, before any worker runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid size must be a positive integer")]
    ZeroSize,

    #[error("step delay must be a positive, finite number of seconds (got {0})")]
    NonPositiveDelay(f64),

    #[error("step delay of {0} seconds is too large")]
    DelayTooLarge(f64),

    #[error("a {0}x{0} grid does not fit in memory")]
    SizeTooLarge(usize),

    #[error("live cell ({x}, {y}) lies outside a {size}x{size} grid")]
    CellOutOfBounds { x: usize, y: usize, size: usize },

    #[error("worker count must be at least 1")]
    ZeroWorkers,
}

/// A worker count the row partitioner cannot honor for the given grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PartitionError {
    #[error("at least one worker is required")]
    NoWorkers,

    #[error("{workers} workers cannot share a grid of {size} rows (need fewer workers than rows)")]
    TooManyWorkers { workers: usize, size: usize },
}
