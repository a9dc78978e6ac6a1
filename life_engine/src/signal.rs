// signal.rs - Shared stop flag that also wakes sleeping workers

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Inner {
    raised: Mutex<bool>,
    wake: Condvar,
}

/// Cloneable handle; every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, bool> {
        self.inner.raised.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Asks every worker to leave at its next sleep or barrier boundary.
    pub fn raise(&self) {
        *self.lock() = true;
        self.inner.wake.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.lock()
    }

    /// Sleeps for `duration` unless the signal is raised first.
    /// Returns `true` if the signal is raised.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut raised = self.lock();
        while !*raised {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            raised = self
                .inner
                .wake
                .wait_timeout(raised, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *raised
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn clones_share_the_flag() {
        let signal = StopSignal::new();
        let other = signal.clone();
        assert!(!other.is_raised());
        signal.raise();
        assert!(other.is_raised());
    }

    #[test]
    fn sleep_runs_full_duration_when_quiet() {
        let signal = StopSignal::new();
        let started = Instant::now();
        assert!(!signal.sleep(Duration::from_millis(20)));
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn raise_cuts_sleep_short() {
        let signal = StopSignal::new();
        let sleeper = signal.clone();
        let started = Instant::now();
        let handle = thread::spawn(move || sleeper.sleep(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        signal.raise();
        assert!(handle.join().unwrap());
        assert!(started.elapsed() < Duration::from_secs(30));
    }
}
