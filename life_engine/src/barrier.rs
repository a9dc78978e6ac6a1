// barrier.rs - Cyclic rendezvous between the workers of one simulation

use std::sync::{Condvar, Mutex, PoisonError};

use crate::signal::StopSignal;

/// What every party of a rendezvous does next. All parties released by the
/// same rendezvous get the same verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendezvous {
    Proceed,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWait {
    pub verdict: Rendezvous,
    pub leader: bool,       // true for exactly one party: the last to arrive
}

#[derive(Debug)]
struct State {
    arrived: usize,
    epoch: u64,
    verdict: Rendezvous,
}

/// Counter + condition variable barrier, reusable for any number of rounds.
///
/// The last party to arrive samples the stop signal, so workers never
/// disagree about whether to continue.
#[derive(Debug)]
pub struct PhaseBarrier {
    parties: usize,
    stop: StopSignal,
    state: Mutex<State>,
    released: Condvar,
}

impl PhaseBarrier {
    pub fn new(parties: usize, stop: StopSignal) -> Self {
        assert!(parties > 0, "a barrier needs at least one party");
        Self {
            parties,
            stop,
            state: Mutex::new(State { arrived: 0, epoch: 0, verdict: Rendezvous::Proceed }),
            released: Condvar::new(),
        }
    }

    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Blocks until all parties have called `wait` for this round.
    pub fn wait(&self) -> BarrierWait {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let epoch = state.epoch;
        state.arrived += 1;

        if state.arrived == self.parties {
            state.arrived = 0;
            state.epoch = epoch.wrapping_add(1);
            state.verdict = if self.stop.is_raised() { Rendezvous::Stop } else { Rendezvous::Proceed };
            self.released.notify_all();
            return BarrierWait { verdict: state.verdict, leader: true };
        }

        while state.epoch == epoch {
            state = self.released.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        // the next round can't finish without us, so the verdict is still ours
        BarrierWait { verdict: state.verdict, leader: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn single_party_never_blocks() {
        let barrier = PhaseBarrier::new(1, StopSignal::new());
        for _ in 0..3 {
            assert_eq!(barrier.wait(), BarrierWait { verdict: Rendezvous::Proceed, leader: true });
        }
    }

    #[test]
    fn nobody_passes_until_everyone_arrives() {
        let barrier = PhaseBarrier::new(4, StopSignal::new());
        let arrived = AtomicUsize::new(0);
        let leaders = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for round in 1..=10 {
                        arrived.fetch_add(1, Ordering::SeqCst);
                        let wait = barrier.wait();
                        assert!(arrived.load(Ordering::SeqCst) >= round * 4);
                        if wait.leader {
                            leaders.fetch_add(1, Ordering::SeqCst);
                        }
                        barrier.wait();
                    }
                });
            }
        });

        assert_eq!(leaders.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn verdict_is_shared() {
        let stop = StopSignal::new();
        stop.raise();
        let barrier = PhaseBarrier::new(3, stop);

        let verdicts: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..3).map(|_| s.spawn(|| barrier.wait().verdict)).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(verdicts, vec![Rendezvous::Stop; 3]);
    }
}
