//! Contention stress: many workers on a tiny grid maximize the chance of
//! overlapping two-lock acquisitions. Ordered acquisition must drain every
//! worker in bounded time; the run executes on a helper thread so a
//! deadlock shows up as a timeout instead of a hung test binary.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use gridlock::{execute, Granularity, RunConfig};

const STRESS_TIMEOUT: Duration = Duration::from_secs(120);

fn drain_under_contention(granularity: Granularity) {
    let mut config = RunConfig::new(2, 200, granularity);
    config.seed = Some(u64::from(granularity as u8));

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        tx.send(execute(&config)).ok();
    });

    let report = rx
        .recv_timeout(STRESS_TIMEOUT)
        .unwrap_or_else(|_| panic!("{granularity} run did not drain within {STRESS_TIMEOUT:?}"))
        .expect("run failed");
    assert!(report.intact());
    assert_eq!(report.threads, 200);
}

#[test]
fn row_granularity_drains_under_contention() {
    drain_under_contention(Granularity::Row);
}

#[test]
fn cell_granularity_drains_under_contention() {
    drain_under_contention(Granularity::Cell);
}

#[test]
fn grid_granularity_drains_under_contention() {
    drain_under_contention(Granularity::Grid);
}
