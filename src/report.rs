//! Run reports: integrity verdict, timing, and grid dumps.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::fabric::Granularity;

/// Everything the observer learned from one run.
///
/// Serializes to JSON for machine consumption; `Display` reproduces the
/// console shape of the original demonstration program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Granularity the run used.
    pub granularity: Granularity,
    /// Grid side length.
    pub grid_size: usize,
    /// Number of workers launched.
    pub threads: usize,
    /// Checksum recorded before any worker started.
    pub initial_sum: i64,
    /// Checksum recorded after the last worker finished.
    pub final_sum: i64,
    /// Wall-clock time from launch to the final zero-crossing.
    pub elapsed: Duration,
    /// Row-major cell values before the run.
    pub initial_cells: Vec<i64>,
    /// Row-major cell values after the run.
    pub final_cells: Vec<i64>,
}

impl RunReport {
    /// Whether the sum invariant held.
    #[must_use]
    pub fn intact(&self) -> bool {
        self.initial_sum == self.final_sum
    }

    /// The verdict line, exactly as the original printed it.
    #[must_use]
    pub fn verdict(&self) -> &'static str {
        if self.intact() {
            "DATA INTEGRITY MAINTAINED!!!!!"
        } else {
            "DATA INTEGRITY VIOLATION!!!!!"
        }
    }

    fn render_cells(f: &mut fmt::Formatter<'_>, cells: &[i64], side: usize) -> fmt::Result {
        for row in cells.chunks(side) {
            for value in row {
                write!(f, "{value}\t")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Initial Grid:")?;
        writeln!(f)?;
        Self::render_cells(f, &self.initial_cells, self.grid_size)?;
        writeln!(f)?;
        writeln!(f, "Initial Sum:  {}", self.initial_sum)?;
        writeln!(f)?;
        writeln!(f, "Final Grid:")?;
        writeln!(f)?;
        Self::render_cells(f, &self.final_cells, self.grid_size)?;
        writeln!(f)?;
        writeln!(f, "Final Sum:  {}", self.final_sum)?;
        writeln!(f, "{}", self.verdict())?;
        writeln!(f, "Secs elapsed:  {:.3}", self.elapsed.as_secs_f64())
    }
}
