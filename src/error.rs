//! Errors that abort a run before its workers produce a report.

use std::io;

use thiserror::Error;

/// The closed error taxonomy.
///
/// An integrity violation is deliberately *not* here: a run that loses
/// updates still completes and reports its verdict through
/// [`RunReport`](crate::report::RunReport).
#[derive(Debug, Error)]
pub enum Error {
    /// Grid side length outside the supported range.
    #[error("grid size must be between 1 and 10, got {got}")]
    GridSize {
        /// The rejected value.
        got: usize,
    },

    /// Worker count outside the supported range.
    #[error("number of workers must be between 1 and 1000, got {got}")]
    ThreadCount {
        /// The rejected value.
        got: usize,
    },

    /// Unrecognized granularity token.
    #[error("unknown granularity {got:?} (expected grid, row, cell, or none)")]
    Granularity {
        /// The rejected token.
        got: String,
    },

    /// Worker thread creation failed.
    ///
    /// Fatal: completion detection assumes the configured worker count is
    /// the count actually launched, so a partial pool cannot be waited on.
    #[error("failed to spawn worker thread: {source}")]
    Spawn {
        /// The underlying spawn failure.
        #[from]
        source: io::Error,
    },
}
