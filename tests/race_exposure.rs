//! Demonstrates that the `none` baseline actually loses updates.
//!
//! A single unsynchronized run may get lucky, so the assertion is over a
//! batch of trials: at least one must violate the sum invariant. The hold
//! window widens the gap between each swap's reads and writes, making
//! overlapping swaps overwhelmingly likely to interleave destructively.

use std::time::Duration;

use gridlock::{execute, Granularity, RunConfig};

const MAX_TRIALS: usize = 100;

#[test]
fn unsynchronized_swaps_eventually_lose_updates() {
    let mut config = RunConfig::new(2, 32, Granularity::None);
    config.hold = Some(Duration::from_micros(500));

    for trial in 0..MAX_TRIALS {
        let report = execute(&config).unwrap();
        if !report.intact() {
            println!("violation observed on trial {trial}");
            return;
        }
    }
    panic!("no integrity violation in {MAX_TRIALS} unsynchronized trials");
}

#[test]
fn same_configuration_is_safe_with_cell_locks() {
    // The control arm: identical contention, locks on.
    let mut config = RunConfig::new(2, 32, Granularity::Cell);
    config.hold = Some(Duration::from_micros(500));

    for _ in 0..10 {
        let report = execute(&config).unwrap();
        assert!(report.intact());
    }
}
