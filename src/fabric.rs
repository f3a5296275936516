//! The lock fabric: granularity selection and deadlock-safe acquisition.
//!
//! A swap touches two positions, and depending on the selected granularity
//! those positions map to zero, one, or two lock domains. Whenever two
//! distinct domains must be held at once, they are acquired in a fixed
//! global order — lowest-ranked domain first, as in the dining-philosophers
//! lowest-fork-first rule — so no two workers can ever hold
//! `{A, waiting for B}` and `{B, waiting for A}` simultaneously. That is the
//! entire deadlock-prevention story: acquisition blocks, there is no
//! try-lock fallback and no timeout.
//!
//! The ordering rule lives on [`Granularity`] itself (each variant knows how
//! positions map to domains), and [`DomainKey`]'s derived `Ord` *is* the
//! global acquisition order.

use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam_utils::CachePadded;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::grid::Pos;
use crate::MAX_GRID_SIZE;

/// Locking granularity for a run. Selected once at startup, fixed thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One lock for the whole matrix.
    Grid,
    /// One lock per row.
    Row,
    /// One lock per cell.
    Cell,
    /// No synchronization at all — the intentionally unsafe baseline used to
    /// demonstrate lost updates.
    None,
}

impl Granularity {
    /// Every granularity, in the order they appear on the command line.
    pub const ALL: [Self; 4] = [Self::Grid, Self::Row, Self::Cell, Self::None];

    /// The lock domain guarding `pos` under this granularity, if any.
    #[must_use]
    pub fn domain_of(self, pos: Pos) -> Option<DomainKey> {
        match self {
            Self::Grid => Some(DomainKey::Grid),
            Self::Row => Some(DomainKey::Row(pos.row)),
            Self::Cell => Some(DomainKey::Cell(pos)),
            Self::None => None,
        }
    }

    /// Plans the acquisition for a swap touching `a` and `b`.
    ///
    /// Coalesces the two domain keys when they coincide (same row under
    /// [`Granularity::Row`], the single grid domain, the same cell) and
    /// orders distinct keys by the global total order.
    #[must_use]
    pub fn plan(self, a: Pos, b: Pos) -> AcquirePlan {
        let Some(ka) = self.domain_of(a) else {
            return AcquirePlan::Nothing;
        };
        // Both positions map through the same granularity, so if `a` has a
        // domain then so does `b`.
        let kb = self.domain_of(b).unwrap_or(ka);
        if ka == kb {
            AcquirePlan::Single(ka)
        } else if ka < kb {
            AcquirePlan::Ordered(ka, kb)
        } else {
            AcquirePlan::Ordered(kb, ka)
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Grid => "grid",
            Self::Row => "row",
            Self::Cell => "cell",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

impl FromStr for Granularity {
    type Err = Error;

    /// Case-insensitive; tolerates a leading `-` (the original CLI passed
    /// `-row`-style flags).
    fn from_str(s: &str) -> Result<Self, Error> {
        match s.trim_start_matches('-').to_ascii_lowercase().as_str() {
            "grid" => Ok(Self::Grid),
            "row" => Ok(Self::Row),
            "cell" => Ok(Self::Cell),
            "none" => Ok(Self::None),
            _ => Err(Error::Granularity { got: s.to_owned() }),
        }
    }
}

/// An addressable lock domain.
///
/// The derived `Ord` (variant order, then key order within a variant) is the
/// fixed global acquisition order. Within a run all keys come from a single
/// granularity and therefore a single variant, so only the within-variant
/// order is ever exercised: rows by index, cells lexicographically by
/// `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DomainKey {
    /// The whole-matrix domain.
    Grid,
    /// A row domain.
    Row(usize),
    /// A cell domain.
    Cell(Pos),
}

/// How a swap acquires its locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquirePlan {
    /// No synchronization ([`Granularity::None`]).
    Nothing,
    /// Both positions share one domain.
    Single(DomainKey),
    /// Two distinct domains, already in acquisition order.
    Ordered(DomainKey, DomainKey),
}

/// The set of mutual-exclusion locks for every granularity.
///
/// All locks are initialized eagerly for [`MAX_GRID_SIZE`] regardless of the
/// granularity actually selected — simplicity over memory economy, a
/// trade-off carried over from the original design.
pub struct LockFabric {
    grid: Mutex<()>,
    rows: Box<[CachePadded<Mutex<()>>]>,
    cells: Box<[CachePadded<Mutex<()>>]>,
}

impl LockFabric {
    /// Creates the fabric with every lock for the maximum supported grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            grid: Mutex::new(()),
            rows: (0..MAX_GRID_SIZE)
                .map(|_| CachePadded::new(Mutex::new(())))
                .collect(),
            cells: (0..MAX_GRID_SIZE * MAX_GRID_SIZE)
                .map(|_| CachePadded::new(Mutex::new(())))
                .collect(),
        }
    }

    fn lock_of(&self, key: DomainKey) -> &Mutex<()> {
        match key {
            DomainKey::Grid => &self.grid,
            DomainKey::Row(row) => &*self.rows[row],
            DomainKey::Cell(pos) => &*self.cells[pos.row * MAX_GRID_SIZE + pos.col],
        }
    }

    fn acquire(&self, key: DomainKey) -> MutexGuard<'_, ()> {
        // A poisoned lock still excludes other holders; the unit payload
        // carries no state to have been corrupted.
        self.lock_of(key)
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires every lock a swap of `a` and `b` requires, in the global
    /// acquisition order. Blocks until granted.
    #[must_use]
    pub fn lock_pair(&self, granularity: Granularity, a: Pos, b: Pos) -> PairGuard<'_> {
        match granularity.plan(a, b) {
            AcquirePlan::Nothing => PairGuard::Unlocked,
            AcquirePlan::Single(key) => PairGuard::One(self.acquire(key)),
            AcquirePlan::Ordered(first, second) => {
                let lo = self.acquire(first);
                let hi = self.acquire(second);
                PairGuard::Two(lo, hi)
            }
        }
    }
}

impl Default for LockFabric {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII holder for the locks one swap needs; dropping it releases them.
///
/// Release order does not affect correctness once both locks are held.
#[must_use]
pub enum PairGuard<'a> {
    /// No locks held.
    Unlocked,
    /// One domain guards both positions.
    One(MutexGuard<'a, ()>),
    /// Two distinct domains.
    Two(MutexGuard<'a, ()>, MutexGuard<'a, ()>),
}
