//! The shared grid store: a square matrix of atomic cells.
//!
//! Cells are individual atomics accessed with `Relaxed` ordering. A single
//! cell read or write is always well-defined; whether the *pair* of reads
//! and writes that makes up a swap is atomic with respect to other swaps is
//! decided entirely by the lock fabric. Under [`Granularity::None`] no
//! composite atomicity exists and concurrent swaps can lose updates, which
//! is the failure mode the checksum detects.
//!
//! [`Granularity::None`]: crate::fabric::Granularity::None

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use rand::Rng;

/// A grid position.
///
/// The derived ordering is lexicographic by row, then column — the total
/// order the cell-granularity acquisition rule is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    /// Row index, `0..side`.
    pub row: usize,
    /// Column index, `0..side`.
    pub col: usize,
}

impl Pos {
    /// Creates a position from row and column indices.
    #[inline(always)]
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The shared square matrix of cell values.
///
/// Row-major contiguous storage. Created once at startup, mutated in place
/// by swaps, never resized.
pub struct Grid {
    cells: Box<[AtomicI64]>,
    side: usize,
}

impl Grid {
    /// Creates a `side x side` grid filled with pseudo-random values in
    /// `[0, 100)`.
    pub fn random<R: Rng>(side: usize, rng: &mut R) -> Self {
        let cells = (0..side * side)
            .map(|_| AtomicI64::new(rng.gen_range(0..100)))
            .collect();
        Self { cells, side }
    }

    /// Creates a grid from explicit row data.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not form a square matrix.
    #[must_use]
    pub fn from_rows(rows: &[Vec<i64>]) -> Self {
        let side = rows.len();
        for row in rows {
            assert_eq!(row.len(), side, "grid rows must form a square matrix");
        }
        let cells = rows
            .iter()
            .flatten()
            .map(|&v| AtomicI64::new(v))
            .collect();
        Self { cells, side }
    }

    /// Side length of the grid.
    #[inline(always)]
    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline(always)]
    fn index(&self, pos: Pos) -> usize {
        debug_assert!(pos.row < self.side && pos.col < self.side);
        pos.row * self.side + pos.col
    }

    /// Reads the value at `pos`.
    #[inline(always)]
    pub fn load(&self, pos: Pos) -> i64 {
        self.cells[self.index(pos)].load(Ordering::Relaxed)
    }

    /// Writes `value` at `pos`.
    #[inline(always)]
    pub fn store(&self, pos: Pos, value: i64) {
        self.cells[self.index(pos)].store(value, Ordering::Relaxed);
    }

    /// Sum of all cell values.
    ///
    /// Invariant under any sequence of swaps, provided each swap was applied
    /// atomically with respect to other swaps touching the same positions.
    #[must_use]
    pub fn checksum(&self) -> i64 {
        self.cells
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .sum()
    }

    /// Copies out the current cell values in row-major order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<i64> {
        self.cells
            .iter()
            .map(|cell| cell.load(Ordering::Relaxed))
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.side {
            for col in 0..self.side {
                write!(f, "{}\t", self.load(Pos::new(row, col)))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_fill_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = Grid::random(10, &mut rng);
        for v in grid.snapshot() {
            assert!((0..100).contains(&v));
        }
    }

    #[test]
    fn checksum_matches_snapshot_sum() {
        let grid = Grid::from_rows(&[vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]);
        assert_eq!(grid.checksum(), 45);
        assert_eq!(grid.snapshot().iter().sum::<i64>(), 45);
    }

    #[test]
    fn load_store_round_trip() {
        let grid = Grid::from_rows(&[vec![0, 0], vec![0, 0]]);
        grid.store(Pos::new(1, 0), 42);
        assert_eq!(grid.load(Pos::new(1, 0)), 42);
        assert_eq!(grid.checksum(), 42);
    }

    #[test]
    fn display_is_tab_separated_rows() {
        let grid = Grid::from_rows(&[vec![1, 2], vec![3, 4]]);
        assert_eq!(grid.to_string(), "1\t2\t\n3\t4\t\n");
    }

    #[test]
    fn pos_order_is_row_major() {
        assert!(Pos::new(0, 9) < Pos::new(1, 0));
        assert!(Pos::new(2, 1) < Pos::new(2, 3));
    }
}
