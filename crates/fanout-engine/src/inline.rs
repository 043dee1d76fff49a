//! A substrate that runs every invocation on the submitting thread.

use crate::invocation::Invocation;
use crate::metrics::{Counters, PoolMetrics};
use crate::substrate::{Rejected, Substrate};

/// Runs each invocation to completion inside [`submit`](Substrate::submit).
///
/// Deterministic and thread-free, which makes it the substrate of choice
/// for tests and for debugging task bodies. Nested launches from inside a
/// task run depth-first on the same thread.
#[derive(Debug, Default)]
pub struct InlineSubstrate {
    counters: Counters,
}

impl InlineSubstrate {
    /// A fresh inline substrate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for everything run so far.
    pub fn metrics(&self) -> PoolMetrics {
        self.counters.snapshot()
    }
}

impl Substrate for InlineSubstrate {
    fn name(&self) -> &str {
        "inline"
    }

    fn submit(&self, invocation: Invocation) -> Result<(), Rejected> {
        invocation.run_observed(&|completion| self.counters.record(completion));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invocation::{submit_point, InvocationMeta};
    use fanout_core::{LaunchId, Point, TaskError};

    fn meta() -> InvocationMeta {
        InvocationMeta {
            launch: LaunchId::next(),
            index: 0,
            point: Point::from(0),
        }
    }

    #[test]
    fn future_is_ready_when_submit_returns() {
        let s = InlineSubstrate::new();
        let f = submit_point(&s, meta(), |_| Ok(7u32));
        assert!(f.is_ready());
        assert_eq!(f.get(), Ok(7));
    }

    #[test]
    fn metrics_count_outcomes() {
        let s = InlineSubstrate::new();
        let _ = submit_point(&s, meta(), |_| Ok(1u8));
        let _ = submit_point::<u8, _>(&s, meta(), |_| Err(TaskError::failed("x")));
        let m = s.metrics();
        assert_eq!(m.executed, 2);
        assert_eq!(m.succeeded, 1);
        assert_eq!(m.failed, 1);
        assert_eq!(s.name(), "inline");
    }
}
