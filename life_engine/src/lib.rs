//! In-place, multi-threaded Conway's Game of Life.
//!
//! Each worker owns a contiguous band of rows and updates its cells in place.
//! A cell keeps a `was_alive` snapshot and a `processed` flag, so a neighbor
//! in another band can always recover the cell's pre-generation state:
//! `was_alive` once processed, `alive` before. Workers meet at a cyclic
//! barrier after the reset phase and after the compute phase, which makes the
//! result identical to a synchronous update for any number of workers.
//!
//! ```
//! use std::time::Duration;
//! use life_engine::Simulation;
//!
//! let sim = Simulation::new([(2, 1), (2, 2), (2, 3)], 5, Duration::from_millis(100)).unwrap();
//! sim.advance(1);
//! assert!(sim.snapshot().is_alive(1, 2));
//! ```

pub mod barrier;
pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod partition;
pub mod patterns;
pub mod reference;
pub mod signal;
pub mod simulation;
pub mod stepper;

pub use cell::{Cell, CellState, CellView};
pub use config::SimConfig;
pub use error::{ConfigError, PartitionError};
pub use grid::{Grid, GridSnapshot};
pub use partition::{PartitionPlan, partition_rows};
pub use patterns::{PATTERNS, Pattern};
pub use signal::StopSignal;
pub use simulation::Simulation;
