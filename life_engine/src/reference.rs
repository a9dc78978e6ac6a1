// reference.rs - Synchronous whole-grid update used as an oracle

use std::collections::BTreeSet;

use crate::stepper::apply_rule;

/// One generation computed from a frozen copy of `live`: every neighbor count
/// is taken before any cell changes. Neighbors outside `0..size` don't exist.
pub fn reference_step(size: usize, live: &BTreeSet<(usize, usize)>) -> BTreeSet<(usize, usize)> {
    let mut next = BTreeSet::new();
    for x in 0..size {
        for y in 0..size {
            let mut neighbors = 0u8;
            for nx in x.saturating_sub(1)..=(x + 1).min(size - 1) {
                for ny in y.saturating_sub(1)..=(y + 1).min(size - 1) {
                    if (nx, ny) != (x, y) && live.contains(&(nx, ny)) {
                        neighbors += 1;
                    }
                }
            }
            if apply_rule(live.contains(&(x, y)), neighbors) {
                next.insert((x, y));
            }
        }
    }
    next
}

/// `generations` applications of [`reference_step`].
pub fn reference_run(size: usize, live: &BTreeSet<(usize, usize)>, generations: u64) -> BTreeSet<(usize, usize)> {
    let mut current = live.clone();
    for _ in 0..generations {
        current = reference_step(size, &current);
    }
    current
}
