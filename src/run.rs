//! Run configuration, worker launch, and completion observation.
//!
//! The driver owns the single initialization phase: it builds the grid and
//! the full lock fabric, records the initial checksum, launches the
//! configured workers fire-and-forget, then waits on the lifecycle tracker.
//! Workers are never joined individually; the tracker's zero-crossing is the
//! only completion signal, and the shared state lives in one `Arc` handed to
//! every worker at launch.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::engine::SwapEngine;
use crate::error::Error;
use crate::fabric::{Granularity, LockFabric};
use crate::grid::Grid;
use crate::report::RunReport;
use crate::tracker::WorkerTracker;
use crate::{MAX_GRID_SIZE, MAX_THREADS};

/// Immutable configuration for one run, supplied once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Grid side length, `1..=10`.
    pub grid_size: usize,
    /// Number of workers, `1..=1000`.
    pub threads: usize,
    /// Locking granularity.
    pub granularity: Granularity,
    /// Deterministic seed for grid fill and swap selection; `None` draws
    /// from OS entropy.
    pub seed: Option<u64>,
    /// Artificial delay between a swap's paired reads and writes.
    pub hold: Option<Duration>,
}

impl RunConfig {
    /// Creates a configuration with no seed and no hold window.
    #[must_use]
    pub fn new(grid_size: usize, threads: usize, granularity: Granularity) -> Self {
        Self {
            grid_size,
            threads,
            granularity,
            seed: None,
            hold: None,
        }
    }

    /// Rejects out-of-range dimensions before any worker is launched.
    pub fn validate(&self) -> Result<(), Error> {
        if self.grid_size < 1 || self.grid_size > MAX_GRID_SIZE {
            return Err(Error::GridSize {
                got: self.grid_size,
            });
        }
        if self.threads < 1 || self.threads > MAX_THREADS {
            return Err(Error::ThreadCount { got: self.threads });
        }
        Ok(())
    }
}

/// Process-wide shared state for one run: constructed once, handed to every
/// worker by shared ownership, torn down only after the run completes.
struct SharedRun {
    grid: Grid,
    fabric: LockFabric,
    tracker: WorkerTracker,
    granularity: Granularity,
    hold: Option<Duration>,
}

/// Per-worker RNG. Workers must not share a stream or they all make the
/// same choices; mix the worker index into the base seed.
fn worker_rng(seed: Option<u64>, worker: u64) -> StdRng {
    match seed {
        Some(base) => StdRng::seed_from_u64(
            base ^ (worker.wrapping_add(1)).wrapping_mul(0x9E37_79B9_7F4A_7C15),
        ),
        None => StdRng::from_entropy(),
    }
}

/// Runs the full workload: random grid, `config.threads` workers, verdict.
pub fn execute(config: &RunConfig) -> Result<RunReport, Error> {
    config.validate()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let grid = Grid::random(config.grid_size, &mut rng);
    execute_on(config, grid)
}

/// Runs the workload against a caller-supplied grid (deterministic tests).
///
/// # Panics
///
/// Panics if the grid's side length disagrees with `config.grid_size`.
pub fn execute_on(config: &RunConfig, grid: Grid) -> Result<RunReport, Error> {
    config.validate()?;
    assert_eq!(
        grid.side(),
        config.grid_size,
        "grid side must match the configured size"
    );

    let initial_cells = grid.snapshot();
    let initial_sum = grid.checksum();

    let shared = Arc::new(SharedRun {
        grid,
        fabric: LockFabric::new(),
        tracker: WorkerTracker::new(config.threads),
        granularity: config.granularity,
        hold: config.hold,
    });

    info!(
        grid_size = config.grid_size,
        threads = config.threads,
        granularity = %config.granularity,
        "launching workers"
    );
    let start = Instant::now();

    for worker in 0..config.threads {
        let shared = Arc::clone(&shared);
        let mut rng = worker_rng(config.seed, worker as u64);
        // Detached fire-and-forget: the handle is dropped, the tracker is
        // the only completion signal.
        thread::Builder::new()
            .name(format!("swap-worker-{worker}"))
            .spawn(move || {
                shared.tracker.register();
                debug!(worker, "worker started");
                let engine = SwapEngine::new(
                    &shared.grid,
                    &shared.fabric,
                    shared.granularity,
                    shared.hold,
                );
                engine.run(&mut rng);
                shared.tracker.deregister();
            })?;
    }

    let finished_at = shared.tracker.wait_idle();
    let elapsed = finished_at.duration_since(start);

    let final_sum = shared.grid.checksum();
    let report = RunReport {
        granularity: config.granularity,
        grid_size: config.grid_size,
        threads: config.threads,
        initial_sum,
        final_sum,
        elapsed,
        initial_cells,
        final_cells: shared.grid.snapshot(),
    };

    if report.intact() {
        info!(elapsed = ?report.elapsed, "run complete, integrity maintained");
    } else {
        warn!(
            initial_sum,
            final_sum, "run complete, integrity violated"
        );
    }
    Ok(report)
}
