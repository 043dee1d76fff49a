//! Thread pool configuration, validation, and error types.

use std::error::Error;
use std::fmt;

// ── PoolConfig ─────────────────────────────────────────────────────

/// Configuration for [`ThreadPool`](crate::ThreadPool).
#[derive(Clone, Debug)]
pub struct PoolConfig {
    /// Number of worker threads. `None` = auto-detect
    /// (`available_parallelism`, clamped to `[1, 64]`).
    pub worker_count: Option<usize>,
    /// Maximum number of queued invocations. `None` = unbounded.
    /// When the queue is full, submissions are rejected with
    /// [`SubmissionError::QueueFull`](fanout_core::SubmissionError::QueueFull).
    pub queue_capacity: Option<usize>,
    /// Worker threads are named `{prefix}-{index}`. Default: `fanout-worker`.
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            worker_count: None,
            queue_capacity: None,
            thread_name_prefix: "fanout-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// A config with exactly `n` workers (after clamping).
    pub fn with_workers(n: usize) -> Self {
        Self {
            worker_count: Some(n),
            ..Self::default()
        }
    }

    /// Resolve the actual worker count, applying auto-detection if `None`.
    ///
    /// Explicit values are clamped to `[1, 64]`. A pool with zero workers
    /// would accept invocations that never run.
    pub fn resolved_worker_count(&self) -> usize {
        match self.worker_count {
            Some(n) => n.clamp(1, 64),
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .clamp(1, 64),
        }
    }

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == Some(0) {
            return Err(ConfigError::QueueCapacityZero);
        }
        if self.thread_name_prefix.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building a [`ThreadPool`](crate::ThreadPool).
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// `queue_capacity` is `Some(0)`; every submission would be rejected.
    QueueCapacityZero,
    /// `thread_name_prefix` is empty.
    EmptyThreadName,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of which thread failed.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueCapacityZero => write!(f, "queue capacity must be at least 1"),
            Self::EmptyThreadName => write!(f, "thread name prefix is empty"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let cfg = PoolConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.thread_name_prefix, "fanout-worker");
        assert!(cfg.queue_capacity.is_none());
    }

    #[test]
    fn worker_count_is_clamped() {
        assert_eq!(PoolConfig::with_workers(0).resolved_worker_count(), 1);
        assert_eq!(PoolConfig::with_workers(3).resolved_worker_count(), 3);
        assert_eq!(PoolConfig::with_workers(1000).resolved_worker_count(), 64);
        let auto = PoolConfig::default().resolved_worker_count();
        assert!((1..=64).contains(&auto));
    }

    #[test]
    fn zero_capacity_rejected() {
        let cfg = PoolConfig {
            queue_capacity: Some(0),
            ..PoolConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::QueueCapacityZero));
    }

    #[test]
    fn empty_prefix_rejected() {
        let cfg = PoolConfig {
            thread_name_prefix: String::new(),
            ..PoolConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyThreadName));
    }

    #[test]
    fn display_messages() {
        let e = ConfigError::ThreadSpawnFailed {
            reason: "worker 2".into(),
        };
        assert_eq!(e.to_string(), "thread spawn failed: worker 2");
    }
}
