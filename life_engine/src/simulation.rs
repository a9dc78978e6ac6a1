// simulation.rs - Generation cadence and worker lifecycle

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::barrier::{PhaseBarrier, Rendezvous};
use crate::config::{SimConfig, delay_from_secs};
use crate::error::ConfigError;
use crate::grid::{Grid, GridSnapshot};
use crate::partition::{PartitionPlan, partition_rows};
use crate::signal::StopSignal;
use crate::stepper::{compute_phase, reset_phase};

#[derive(Debug, Clone, Copy)]
enum Cadence {
    Paced,              // sleep the step delay before every generation, until stopped
    Generations(u64),   // back to back, this many generations
}

/// Owns the grid and drives generations over it with one worker per row band.
///
/// `start` blocks the calling thread, which doubles as the last band's worker.
/// Renderers may call `snapshot` from any thread at any time; they may see
/// some bands one generation ahead of others.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    plan: PartitionPlan,
    step_delay_nanos: AtomicU64,
    generation: AtomicU64,
    stop: StopSignal,
    driving: AtomicBool,    // held by the one drive allowed to touch the grid
}

/// Releases `Simulation::driving` when a drive ends, even by panic.
struct DriveGuard<'a>(&'a AtomicBool);

impl Drop for DriveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn logical_cpus() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or_else(|err| {
            debug!("available parallelism unknown ({err}), assuming 1");
            1
        })
}

fn duration_nanos(delay: Duration) -> u64 {
    u64::try_from(delay.as_nanos()).unwrap_or(u64::MAX)
}

impl Simulation {
    pub fn new<I>(live: I, size: usize, step_delay: Duration) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        Self::from_config(&SimConfig::new(size, step_delay), live)
    }

    pub fn from_config<I>(config: &SimConfig, live: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        config.validate()?;
        let grid = Grid::new(config.size, live)?;

        let plan = match config.workers {
            Some(workers) if workers > 1 => {
                partition_rows(config.size, workers).unwrap_or_else(|err| {
                    warn!("falling back to a single worker: {err}");
                    PartitionPlan::single(config.size)
                })
            }
            Some(_) => PartitionPlan::single(config.size),
            None => PartitionPlan::for_host(config.size, logical_cpus()),
        };

        Ok(Self {
            grid,
            plan,
            step_delay_nanos: AtomicU64::new(duration_nanos(config.step_delay)),
            generation: AtomicU64::new(0),
            stop: StopSignal::new(),
            driving: AtomicBool::new(false),
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn size(&self) -> usize {
        self.grid.size()
    }

    pub fn plan(&self) -> &PartitionPlan {
        &self.plan
    }

    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.snapshot()
    }

    pub fn live_cells(&self) -> BTreeSet<(usize, usize)> {
        self.grid.live_cells()
    }

    /// Number of fully completed generations.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_nanos(self.step_delay_nanos.load(Ordering::Relaxed))
    }

    /// Takes effect at each worker's next sleep. A zero delay is ignored and
    /// the previous one stays; returns whether the value was accepted.
    pub fn set_step_delay(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            debug!("ignoring zero step delay, keeping {:?}", self.step_delay());
            return false;
        }
        self.step_delay_nanos.store(duration_nanos(delay), Ordering::Relaxed);
        true
    }

    /// Same as [`Simulation::set_step_delay`] for a user-supplied number of
    /// seconds; zero, negative and non-finite values are ignored.
    pub fn set_step_delay_secs(&self, secs: f64) -> bool {
        match delay_from_secs(secs) {
            Ok(delay) => self.set_step_delay(delay),
            Err(err) => {
                debug!("ignoring step delay: {err}");
                false
            }
        }
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Makes `start` return once every worker reaches its next sleep or
    /// barrier. A stopped simulation stays stopped.
    pub fn stop(&self) {
        info!("stop requested after generation {}", self.generation());
        self.stop.raise();
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_raised()
    }

    /// Runs generations at the configured cadence until stopped. Blocks.
    ///
    /// Only one of `start`, `advance` and `advance_with` may run at a time;
    /// a call made while another is running returns `false` at once.
    pub fn start(&self) -> bool {
        self.drive(&self.plan, Cadence::Paced)
    }

    /// Runs `generations` generations back to back with the simulation's plan.
    pub fn advance(&self, generations: u64) -> bool {
        self.drive(&self.plan, Cadence::Generations(generations))
    }

    /// Like [`Simulation::advance`] but with an explicit row partition.
    pub fn advance_with(&self, plan: &PartitionPlan, generations: u64) -> bool {
        self.drive(plan, Cadence::Generations(generations))
    }

    /// Whether a drive currently owns the grid.
    pub fn is_running(&self) -> bool {
        self.driving.load(Ordering::Acquire)
    }

    fn drive(&self, plan: &PartitionPlan, cadence: Cadence) -> bool {
        assert_eq!(plan.size(), self.grid.size(), "plan was built for another grid size");
        if self
            .driving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("refusing {cadence:?} drive: the grid is already being driven");
            return false;
        }
        let _guard = DriveGuard(&self.driving);

        info!(
            "running {}x{} grid with {} worker(s), {:?}",
            self.size(),
            self.size(),
            plan.worker_count(),
            cadence
        );

        let Some((last, rest)) = plan.bands().split_last() else {
            return true;
        };

        if !plan.is_parallel() {
            self.run_worker(last.clone(), None, cadence);
        } else {
            let barrier = PhaseBarrier::new(plan.worker_count(), self.stop.clone());
            thread::scope(|s| {
                for band in rest {
                    let barrier = &barrier;
                    s.spawn(move || self.run_worker(band.clone(), Some(barrier), cadence));
                }
                self.run_worker(last.clone(), Some(&barrier), cadence);
            });
        }

        info!("workers finished at generation {}", self.generation());
        true
    }

    fn run_worker(&self, band: Range<usize>, barrier: Option<&PhaseBarrier>, cadence: Cadence) {
        debug!("worker for rows {band:?} started");
        let mut completed = 0u64;

        loop {
            // A lone worker leaves straight away; with a barrier everyone
            // leaves together on the next rendezvous verdict.
            let stopped = match cadence {
                Cadence::Paced => self.stop.sleep(self.step_delay()),
                Cadence::Generations(limit) => {
                    if completed == limit {
                        break;
                    }
                    self.stop.is_raised()
                }
            };
            if stopped && barrier.is_none() {
                break;
            }

            reset_phase(&self.grid);
            if let Some(barrier) = barrier {
                if barrier.wait().verdict == Rendezvous::Stop {
                    break;
                }
            }

            compute_phase(&self.grid, band.clone());
            completed += 1;

            match barrier {
                Some(barrier) => {
                    let wait = barrier.wait();
                    if wait.leader {
                        self.finish_generation();
                    }
                    if wait.verdict == Rendezvous::Stop {
                        break;
                    }
                }
                None => self.finish_generation(),
            }
        }

        debug!("worker for rows {band:?} leaving after {completed} generation(s)");
    }

    fn finish_generation(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("generation {generation} committed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::reference_run;
    use std::sync::Arc;
    use std::time::Instant;

    fn blinker() -> Vec<(usize, usize)> {
        vec![(2, 1), (2, 2), (2, 3)]
    }

    fn glider() -> BTreeSet<(usize, usize)> {
        [(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)].into_iter().collect()
    }

    fn wait_until(mut done: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !done() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn construction_validates() {
        assert_eq!(
            Simulation::new(blinker(), 0, Duration::from_millis(10)).unwrap_err(),
            ConfigError::ZeroSize
        );
        assert!(Simulation::new(blinker(), 5, Duration::ZERO).is_err());
        assert!(Simulation::new([(9, 9)], 5, Duration::from_millis(10)).is_err());
    }

    #[test]
    fn delay_guard_keeps_previous_value() {
        let sim = Simulation::new(blinker(), 5, Duration::from_millis(300)).unwrap();

        assert!(!sim.set_step_delay(Duration::ZERO));
        assert!(!sim.set_step_delay_secs(0.0));
        assert!(!sim.set_step_delay_secs(-2.0));
        assert_eq!(sim.step_delay(), Duration::from_millis(300));

        assert!(sim.set_step_delay_secs(0.05));
        assert_eq!(sim.step_delay(), Duration::from_millis(50));
    }

    #[test]
    fn worker_override_is_honored() {
        let config = SimConfig::new(10, Duration::from_millis(5)).with_workers(3);
        let sim = Simulation::from_config(&config, blinker()).unwrap();
        assert_eq!(sim.plan().worker_count(), 3);

        let config = SimConfig::new(3, Duration::from_millis(5)).with_workers(8);
        let sim = Simulation::from_config(&config, [(1, 1)]).unwrap();
        assert_eq!(sim.plan(), &PartitionPlan::single(3));
    }

    #[test]
    fn advance_counts_generations() {
        let sim = Simulation::new(blinker(), 5, Duration::from_millis(5)).unwrap();
        sim.advance_with(&partition_rows(5, 2).unwrap(), 3);
        assert_eq!(sim.generation(), 3);
        assert_eq!(sim.live_cells(), [(1, 2), (2, 2), (3, 2)].into_iter().collect());
    }

    #[test]
    fn stop_ends_start_on_a_whole_generation() {
        for workers in [1, 3] {
            let config = SimConfig::new(12, Duration::from_millis(2)).with_workers(workers);
            let sim = Arc::new(Simulation::from_config(&config, glider()).unwrap());

            let runner = Arc::clone(&sim);
            let handle = thread::spawn(move || runner.start());

            wait_until(|| sim.generation() >= 3);
            sim.stop();
            assert!(handle.join().unwrap());

            assert!(sim.generation() >= 3, "{workers} worker(s) made no progress");
            assert!(sim.is_stopped());
            assert!(!sim.is_running());
            assert_eq!(
                sim.live_cells(),
                reference_run(12, &glider(), sim.generation()),
                "{workers} worker(s) stopped mid-generation"
            );
        }
    }

    #[test]
    fn advance_is_refused_while_started() {
        let config = SimConfig::new(12, Duration::from_millis(2)).with_workers(3);
        let sim = Arc::new(Simulation::from_config(&config, glider()).unwrap());

        let runner = Arc::clone(&sim);
        let handle = thread::spawn(move || runner.start());
        wait_until(|| sim.is_running());

        assert!(!sim.advance_with(&PartitionPlan::single(12), 5));
        assert!(!sim.advance(5));

        sim.stop();
        assert!(handle.join().unwrap());
        assert_eq!(sim.live_cells(), reference_run(12, &glider(), sim.generation()));
    }

    #[test]
    fn overlapping_advances_never_interleave() {
        for _ in 0..20 {
            let sim = Simulation::new(glider(), 16, Duration::from_millis(1)).unwrap();
            let parallel = partition_rows(16, 3).unwrap();
            let serial = PartitionPlan::single(16);

            let ran: Vec<bool> = thread::scope(|s| {
                let a = s.spawn(|| sim.advance_with(&parallel, 5));
                let b = s.spawn(|| sim.advance_with(&serial, 5));
                vec![a.join().unwrap(), b.join().unwrap()]
            });

            let drives = ran.iter().filter(|&&ran| ran).count() as u64;
            assert!(drives >= 1);
            assert_eq!(sim.generation(), drives * 5);
            assert_eq!(sim.live_cells(), reference_run(16, &glider(), sim.generation()));
        }
    }

    #[test]
    fn stopped_simulation_does_not_advance() {
        let sim = Simulation::new(blinker(), 5, Duration::from_millis(5)).unwrap();
        sim.stop();
        sim.advance(4);
        sim.advance_with(&partition_rows(5, 2).unwrap(), 4);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.live_cells(), blinker().into_iter().collect());
    }
}
