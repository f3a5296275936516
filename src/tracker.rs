//! Worker lifecycle tracking and completion detection.
//!
//! A single shared counter, guarded by its own dedicated lock, records how
//! many workers are still active. The tracker lock is independent of the
//! grid's lock fabric — it is never acquired while a fabric lock is held and
//! vice versa, which keeps it out of the acquisition-ordering problem
//! entirely.
//!
//! The decrement and the zero-check happen under the same lock, so exactly
//! one worker observes the final zero-crossing and records the completion
//! timestamp, even when several workers deregister near-simultaneously.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug)]
struct TrackerState {
    started: usize,
    active: usize,
    finished_at: Option<Instant>,
}

/// Tracks how many workers are still active and detects completion.
///
/// Completion requires both that every configured worker has registered and
/// that the active count has returned to zero. The original design checked
/// only the counter, which can read zero spuriously when an early worker
/// finishes before a late one registers; requiring full registration closes
/// that window without changing the observable contract.
pub struct WorkerTracker {
    expected: usize,
    state: Mutex<TrackerState>,
    done: Condvar,
}

impl WorkerTracker {
    /// Creates a tracker expecting `expected` workers.
    #[must_use]
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: Mutex::new(TrackerState {
                started: 0,
                active: 0,
                finished_at: None,
            }),
            done: Condvar::new(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a worker as active. Called by each worker on start.
    pub fn register(&self) {
        let mut state = self.lock();
        state.started += 1;
        state.active += 1;
        debug_assert!(state.started <= self.expected);
        debug_assert!(state.active <= self.expected);
    }

    /// Deregisters a worker. The worker whose deregistration brings the
    /// active count to zero after all expected workers have registered
    /// records the completion timestamp and wakes the observer.
    pub fn deregister(&self) {
        let mut state = self.lock();
        debug_assert!(state.active > 0, "deregister without matching register");
        state.active -= 1;
        if state.active == 0 && state.started == self.expected && state.finished_at.is_none() {
            state.finished_at = Some(Instant::now());
            debug!(workers = self.expected, "last worker finished");
            self.done.notify_all();
        }
    }

    /// Number of currently active workers.
    #[must_use]
    pub fn active(&self) -> usize {
        self.lock().active
    }

    /// Number of workers that have registered so far.
    #[must_use]
    pub fn started(&self) -> usize {
        self.lock().started
    }

    /// The completion timestamp, if the run has finished.
    #[must_use]
    pub fn finished_at(&self) -> Option<Instant> {
        self.lock().finished_at
    }

    /// Blocks until every expected worker has registered and deregistered,
    /// returning the timestamp recorded at the final zero-crossing.
    pub fn wait_idle(&self) -> Instant {
        let mut state = self.lock();
        while !(state.started == self.expected && state.active == 0) {
            state = self.done.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        // `finished_at` is written under this lock in the same critical
        // section that makes the loop condition true; it can only be absent
        // when zero workers were expected.
        state.finished_at.unwrap_or_else(Instant::now)
    }

    /// Like [`wait_idle`](Self::wait_idle), but gives up after `timeout`.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> Option<Instant> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        while !(state.started == self.expected && state.active == 0) {
            let now = Instant::now();
            let remaining = deadline.checked_duration_since(now)?;
            let (next, result) = self
                .done
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            state = next;
            if result.timed_out()
                && !(state.started == self.expected && state.active == 0)
            {
                return None;
            }
        }
        Some(state.finished_at.unwrap_or_else(Instant::now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn counter_stays_within_bounds() {
        let tracker = Arc::new(WorkerTracker::new(8));
        thread::scope(|s| {
            for _ in 0..8 {
                let t = Arc::clone(&tracker);
                s.spawn(move || {
                    t.register();
                    thread::yield_now();
                    t.deregister();
                });
            }
            // Observed values never leave [0, expected].
            for _ in 0..100 {
                let active = tracker.active();
                assert!(active <= 8);
            }
        });
        assert_eq!(tracker.active(), 0);
        assert_eq!(tracker.started(), 8);
    }

    #[test]
    fn zero_crossing_recorded_exactly_once() {
        let tracker = WorkerTracker::new(2);
        tracker.register();
        tracker.register();
        tracker.deregister();
        assert!(tracker.finished_at().is_none());
        tracker.deregister();
        let first = tracker.finished_at().expect("completion recorded");
        assert_eq!(tracker.finished_at(), Some(first));
    }

    #[test]
    fn early_finisher_does_not_complete_run() {
        // Worker 1 starts and finishes before worker 2 registers: the count
        // touches zero but the run is not complete.
        let tracker = WorkerTracker::new(2);
        tracker.register();
        tracker.deregister();
        assert_eq!(tracker.active(), 0);
        assert!(tracker.finished_at().is_none());
        tracker.register();
        tracker.deregister();
        assert!(tracker.finished_at().is_some());
    }

    #[test]
    fn wait_idle_blocks_until_all_deregister() {
        let tracker = Arc::new(WorkerTracker::new(4));
        let finished = thread::scope(|s| {
            for _ in 0..4 {
                let t = Arc::clone(&tracker);
                s.spawn(move || {
                    t.register();
                    thread::sleep(Duration::from_millis(10));
                    t.deregister();
                });
            }
            tracker.wait_idle()
        });
        assert!(finished.elapsed() < Duration::from_secs(5));
        assert_eq!(tracker.active(), 0);
    }

    #[test]
    fn wait_idle_timeout_expires_when_workers_hang() {
        let tracker = WorkerTracker::new(1);
        tracker.register();
        // Never deregisters.
        assert_eq!(
            tracker.wait_idle_timeout(Duration::from_millis(50)),
            None
        );
    }
}
