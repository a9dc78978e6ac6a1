// partition.rs - Splits grid rows into one contiguous band per worker

use std::ops::Range;

use log::{debug, warn};

use crate::error::PartitionError;

/// Row bands, one per worker, covering `0..size` in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    size: usize,
    bands: Vec<Range<usize>>,
}

/// Splits `size` rows between `worker_count` workers.
///
/// Bands differ in length by at most one row; the remainder goes one row each
/// to the last workers. Fails unless `1 <= worker_count < size`.
pub fn partition_rows(size: usize, worker_count: usize) -> Result<PartitionPlan, PartitionError> {
    if worker_count < 1 {
        return Err(PartitionError::NoWorkers);
    }
    if worker_count >= size {
        return Err(PartitionError::TooManyWorkers { workers: worker_count, size });
    }

    let base = size / worker_count;
    let first_long = worker_count - size % worker_count;   // workers from here on get base + 1

    let mut bands = Vec::with_capacity(worker_count);
    let mut start = 0;
    for worker in 0..worker_count {
        let len = if worker >= first_long { base + 1 } else { base };
        bands.push(start..start + len);
        start += len;
    }
    debug_assert_eq!(start, size);

    Ok(PartitionPlan { size, bands })
}

impl PartitionPlan {
    /// One band holding every row, for single-worker execution.
    pub fn single(size: usize) -> Self {
        Self { size, bands: vec![0..size] }
    }

    /// The plan the simulation uses on a host with `logical_cpus` processors.
    ///
    /// Parallel bands only pay off with more than two processors and a grid
    /// taller than the processor count; one processor is left for the caller.
    pub fn for_host(size: usize, logical_cpus: usize) -> Self {
        if logical_cpus <= 2 || size <= logical_cpus {
            debug!("{logical_cpus} logical cpus for a {size}-row grid, running single worker");
            return Self::single(size);
        }

        match partition_rows(size, logical_cpus - 1) {
            Ok(plan) => plan,
            Err(err) => {
                warn!("falling back to a single worker: {err}");
                Self::single(size)
            }
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn worker_count(&self) -> usize {
        self.bands.len()
    }

    pub fn is_parallel(&self) -> bool {
        self.bands.len() > 1
    }

    pub fn bands(&self) -> &[Range<usize>] {
        &self.bands
    }

    pub fn band(&self, worker: usize) -> Range<usize> {
        self.bands[worker].clone()
    }

    /// Row indices owned by `worker`.
    pub fn rows(&self, worker: usize) -> Vec<usize> {
        self.band(worker).collect()
    }
}
