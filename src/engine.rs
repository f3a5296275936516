//! The swap engine: randomized pairwise cell exchanges under the fabric.

use std::thread;
use std::time::Duration;

use rand::Rng;
use tracing::trace;

use crate::fabric::{Granularity, LockFabric};
use crate::grid::{Grid, Pos};

/// Number of swap attempts each worker performs.
pub const SWAPS_PER_WORKER: usize = 20;

/// Executes swap attempts against a shared grid under a fixed granularity.
pub struct SwapEngine<'a> {
    grid: &'a Grid,
    fabric: &'a LockFabric,
    granularity: Granularity,
    hold: Option<Duration>,
}

impl<'a> SwapEngine<'a> {
    /// Creates an engine over shared state.
    ///
    /// `hold` widens the window between a swap's paired reads and writes;
    /// `None` means no artificial delay.
    #[must_use]
    pub fn new(
        grid: &'a Grid,
        fabric: &'a LockFabric,
        granularity: Granularity,
        hold: Option<Duration>,
    ) -> Self {
        Self {
            grid,
            fabric,
            granularity,
            hold,
        }
    }

    /// Runs the full per-worker budget of [`SWAPS_PER_WORKER`] attempts,
    /// drawing both positions uniformly from the grid for each attempt.
    pub fn run<R: Rng>(&self, rng: &mut R) {
        let side = self.grid.side();
        for _ in 0..SWAPS_PER_WORKER {
            let a = Pos::new(rng.gen_range(0..side), rng.gen_range(0..side));
            let b = Pos::new(rng.gen_range(0..side), rng.gen_range(0..side));
            self.swap_once(a, b);
        }
    }

    /// Executes a single swap attempt at fixed positions.
    ///
    /// Identical positions are consumed as an identity swap: no locks are
    /// taken, nothing is written, and the attempt is not retried. Otherwise
    /// every required lock is held across the read-both/write-both pair, so
    /// the exchange is atomic with respect to any other swap contending for
    /// an overlapping domain — except under [`Granularity::None`], where the
    /// exchange runs unsynchronized on purpose.
    pub fn swap_once(&self, a: Pos, b: Pos) {
        if a == b {
            trace!(%a, "identity swap");
            return;
        }
        let guard = self.fabric.lock_pair(self.granularity, a, b);
        let va = self.grid.load(a);
        let vb = self.grid.load(b);
        if let Some(hold) = self.hold {
            thread::sleep(hold);
        }
        self.grid.store(a, vb);
        self.grid.store(b, va);
        drop(guard);
    }
}
