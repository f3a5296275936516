//! # `gridlock` - Lock-Granularity Laboratory
//!
//! Demonstrates and measures the effect of lock granularity on correctness
//! and throughput in a concurrent mutation workload over a shared 2D grid.
//! A configurable number of workers each perform twenty randomized pairwise
//! cell swaps; the sum of all cell values must never change, no matter how
//! the workers interleave.
//!
//! ## Granularities
//!
//! - **grid** — one lock for the whole matrix; swaps serialize completely.
//! - **row** — one lock per row; swaps in disjoint rows run in parallel.
//! - **cell** — one lock per cell; only swaps sharing a cell contend.
//! - **none** — no synchronization; the deliberately unsafe baseline whose
//!   lost updates show why the fabric exists.
//!
//! ## Deadlock avoidance
//!
//! A swap spanning two lock domains acquires them in a fixed global total
//! order (rows by index, cells lexicographically by `(row, col)`), the
//! resource-ordering strategy from the dining-philosophers problem. Every
//! worker that needs domains A and B takes them in the same relative order,
//! so circular wait — the necessary condition for deadlock — cannot arise.
//! There are no timeouts, no try-lock fallbacks, and no retries anywhere.
//!
//! ## Completion detection
//!
//! Workers register with a shared counter on start and deregister on
//! finish; the counter has its own dedicated lock, independent of the grid
//! fabric. The worker whose deregistration performs the final zero-crossing
//! records the completion timestamp and wakes the observer.
//!
//! ## Example
//!
//! ```rust
//! use gridlock::{execute, Granularity, RunConfig};
//!
//! let mut config = RunConfig::new(3, 8, Granularity::Cell);
//! config.seed = Some(7);
//! let report = execute(&config).unwrap();
//! assert!(report.intact());
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod engine;
pub mod error;
pub mod fabric;
pub mod grid;
pub mod report;
pub mod run;
pub mod tracker;

pub use engine::{SwapEngine, SWAPS_PER_WORKER};
pub use error::Error;
pub use fabric::{AcquirePlan, DomainKey, Granularity, LockFabric, PairGuard};
pub use grid::{Grid, Pos};
pub use report::RunReport;
pub use run::{execute, execute_on, RunConfig};
pub use tracker::WorkerTracker;

/// Largest supported grid side length.
pub const MAX_GRID_SIZE: usize = 10;

/// Largest supported worker count.
pub const MAX_THREADS: usize = 1000;

// Compile-time layout checks for the hot-path types.
const _: () = {
    use core::mem;

    // The granularity tag travels into every worker; it must stay a byte.
    assert!(mem::size_of::<Granularity>() == 1);

    // Positions are passed by value everywhere.
    assert!(mem::size_of::<Pos>() == 2 * mem::size_of::<usize>());
};
