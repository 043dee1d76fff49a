//! Launch and substrate counters.
//!
//! [`LaunchMetrics`] describes a single launch and is attached to its
//! [`FutureMap`](crate::FutureMap). [`PoolMetrics`] is a cumulative
//! snapshot of what a substrate has executed.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::invocation::Completion;

/// Submission metrics for one launch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LaunchMetrics {
    /// Number of points in the launch domain.
    pub points: u64,
    /// Invocations the substrate accepted.
    pub submitted: u64,
    /// Invocations the substrate refused. Their futures are already Failed.
    pub rejected: u64,
    /// Wall-clock time spent enumerating and submitting, in microseconds.
    pub submit_us: u64,
}

/// Cumulative execution counters for a substrate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolMetrics {
    /// Invocations whose body was run.
    pub executed: u64,
    /// Bodies that returned a value.
    pub succeeded: u64,
    /// Bodies that returned an error.
    pub failed: u64,
    /// Bodies that panicked.
    pub panicked: u64,
    /// Invocations aborted with `Cancelled` instead of running.
    pub cancelled: u64,
    /// Submissions refused.
    pub rejected: u64,
}

/// Lock-free counters behind [`PoolMetrics`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    executed: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    panicked: AtomicU64,
    cancelled: AtomicU64,
    rejected: AtomicU64,
}

impl Counters {
    pub(crate) fn record(&self, completion: Completion) {
        self.executed.fetch_add(1, Ordering::Relaxed);
        let slot = match completion {
            Completion::Succeeded => &self.succeeded,
            Completion::Failed => &self.failed,
            Completion::Panicked => &self.panicked,
        };
        slot.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PoolMetrics {
        PoolMetrics {
            executed: self.executed.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = LaunchMetrics::default();
        assert_eq!(m.points, 0);
        assert_eq!(m.submitted, 0);
        assert_eq!(m.rejected, 0);
        assert_eq!(m.submit_us, 0);
        assert_eq!(Counters::default().snapshot(), PoolMetrics::default());
    }

    #[test]
    fn counters_track_completions() {
        let c = Counters::default();
        c.record(Completion::Succeeded);
        c.record(Completion::Succeeded);
        c.record(Completion::Failed);
        c.record(Completion::Panicked);
        c.record_cancelled();
        c.record_rejected();
        let m = c.snapshot();
        assert_eq!(m.executed, 4);
        assert_eq!(m.succeeded, 2);
        assert_eq!(m.failed, 1);
        assert_eq!(m.panicked, 1);
        assert_eq!(m.cancelled, 1);
        assert_eq!(m.rejected, 1);
    }
}
