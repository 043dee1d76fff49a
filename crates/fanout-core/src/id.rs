//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a registered task.
///
/// Ids are chosen by the registering code; the registry rejects duplicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaskId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`LaunchId`] allocation.
static LAUNCH_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one index launch.
///
/// Allocated from a monotonic atomic counter via [`LaunchId::next`]. Every
/// invocation submitted by a launch carries the launch's id, which ties
/// log lines and substrate bookkeeping back to the launch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LaunchId(u64);

impl LaunchId {
    /// Allocate a fresh, unique launch ID. Thread-safe.
    pub fn next() -> Self {
        Self(LAUNCH_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LaunchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
