//! Worker-thread substrate.
//!
//! Invocations travel over a crossbeam channel to a fixed set of worker
//! threads. Each worker runs until the channel is closed (sender dropped)
//! and the queue is empty, so shutdown is: optionally raise the cancel
//! flag, drop the sender, join the workers.
//!
//! Queued invocations hold a [`Context`](crate::Context), and through it an
//! `Arc` of the pool. Call [`ThreadPool::shutdown`] (or drop the owning
//! [`Runtime`](crate::Runtime)) to retire the queue and release it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use fanout_core::{SubmissionError, TaskError};

use crate::config::{ConfigError, PoolConfig};
use crate::invocation::Invocation;
use crate::metrics::{Counters, PoolMetrics};
use crate::substrate::{Rejected, Substrate};

// ── ShutdownMode / ShutdownReport ─────────────────────────────────

/// What happens to invocations still queued at shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Run everything already queued, then stop.
    Drain,
    /// Fail everything not yet started with [`TaskError::Cancelled`].
    /// Invocations already running finish normally.
    Cancel,
}

/// Report from [`ThreadPool::shutdown`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// The mode the pool was shut down with.
    pub mode: ShutdownMode,
    /// Number of worker threads joined.
    pub workers_joined: usize,
    /// Invocations failed with `Cancelled` during shutdown.
    pub cancelled: u64,
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
}

// ── ThreadPool ────────────────────────────────────────────────────

/// State shared between the pool handle and its workers.
#[derive(Debug, Default)]
struct Shared {
    cancel: AtomicBool,
    counters: Counters,
}

impl Shared {
    fn execute(&self, invocation: Invocation) {
        if self.cancel.load(Ordering::Acquire) {
            invocation
                .abort_observed(TaskError::Cancelled, &|| self.counters.record_cancelled());
        } else {
            invocation.run_observed(&|completion| self.counters.record(completion));
        }
    }
}

/// A fixed set of worker threads fed by a channel.
#[derive(Debug)]
pub struct ThreadPool {
    /// `None` once shut down.
    tx: RwLock<Option<Sender<Invocation>>>,
    /// Kept for [`Substrate::run_pending_one`] and the final drain.
    rx: Receiver<Invocation>,
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
}

impl ThreadPool {
    /// Validate `config` and spawn the workers.
    pub fn new(config: &PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let worker_count = config.resolved_worker_count();
        let (tx, rx) = match config.queue_capacity {
            Some(n) => crossbeam_channel::bounded(n),
            None => crossbeam_channel::unbounded(),
        };
        let shared = Arc::new(Shared::default());

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let worker_rx = rx.clone();
            let worker_shared = Arc::clone(&shared);
            let spawned = thread::Builder::new()
                .name(format!("{}-{i}", config.thread_name_prefix))
                .spawn(move || worker_loop(worker_rx, worker_shared));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    drop(tx);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(ConfigError::ThreadSpawnFailed {
                        reason: format!("{}-{i}: {e}", config.thread_name_prefix),
                    });
                }
            }
        }
        tracing::debug!(
            workers = worker_count,
            queue_capacity = ?config.queue_capacity,
            "thread pool started"
        );

        Ok(Self {
            tx: RwLock::new(Some(tx)),
            rx,
            shared,
            workers: Mutex::new(workers),
            worker_count,
        })
    }

    /// Number of worker threads spawned.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Invocations waiting in the queue.
    pub fn queued(&self) -> usize {
        self.rx.len()
    }

    /// `true` once [`shutdown`](Self::shutdown) has started.
    pub fn is_shut_down(&self) -> bool {
        self.read_tx().is_none()
    }

    /// Cumulative execution counters.
    pub fn metrics(&self) -> PoolMetrics {
        self.shared.counters.snapshot()
    }

    /// Stop accepting work, retire the queue per `mode`, and join the
    /// workers.
    ///
    /// Idempotent: later calls return an empty report. Submissions made
    /// after shutdown starts, including nested launches from tasks still
    /// draining, are rejected with [`SubmissionError::Shutdown`].
    pub fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
        let start = Instant::now();
        let cancelled_before = self.shared.counters.snapshot().cancelled;

        if mode == ShutdownMode::Cancel {
            self.shared.cancel.store(true, Ordering::Release);
        }
        // Dropping the only sender closes the channel; workers exit once
        // the queue is empty.
        let was_running = self.write_tx().take().is_some();

        let handles = std::mem::take(&mut *self.lock_workers());
        let current = thread::current().id();
        let mut workers_joined = 0;
        for handle in handles {
            // A task that shuts its own pool down cannot join itself.
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_ok() {
                workers_joined += 1;
            }
        }

        // Anything left over had no worker to run it.
        while let Ok(invocation) = self.rx.try_recv() {
            self.shared.execute(invocation);
        }

        let report = ShutdownReport {
            mode,
            workers_joined,
            cancelled: self.shared.counters.snapshot().cancelled - cancelled_before,
            total_ms: start.elapsed().as_millis() as u64,
        };
        if was_running {
            tracing::debug!(
                ?mode,
                workers_joined,
                cancelled = report.cancelled,
                total_ms = report.total_ms,
                "thread pool stopped"
            );
        }
        report
    }

    fn read_tx(&self) -> RwLockReadGuard<'_, Option<Sender<Invocation>>> {
        self.tx.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_tx(&self) -> RwLockWriteGuard<'_, Option<Sender<Invocation>>> {
        self.tx.write().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_workers(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.workers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Substrate for ThreadPool {
    fn name(&self) -> &str {
        "thread-pool"
    }

    fn submit(&self, invocation: Invocation) -> Result<(), Rejected> {
        let guard = self.read_tx();
        let Some(tx) = guard.as_ref() else {
            self.shared.counters.record_rejected();
            return Err(Rejected::new(SubmissionError::Shutdown, invocation));
        };
        match tx.try_send(invocation) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(invocation)) => {
                self.shared.counters.record_rejected();
                Err(Rejected::new(SubmissionError::QueueFull, invocation))
            }
            Err(TrySendError::Disconnected(invocation)) => {
                self.shared.counters.record_rejected();
                Err(Rejected::new(SubmissionError::Shutdown, invocation))
            }
        }
    }

    fn run_pending_one(&self) -> bool {
        match self.rx.try_recv() {
            Ok(invocation) => {
                self.shared.execute(invocation);
                true
            }
            Err(_) => false,
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        if !self.is_shut_down() {
            self.shutdown(ShutdownMode::Drain);
        }
    }
}

fn worker_loop(rx: Receiver<Invocation>, shared: Arc<Shared>) {
    while let Ok(invocation) = rx.recv() {
        shared.execute(invocation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::invocation::{submit_point, InvocationMeta};
    use fanout_core::{LaunchId, Point};
    use fanout_domain::Domain;
    use std::time::Duration;

    fn meta(index: usize) -> InvocationMeta {
        InvocationMeta {
            launch: LaunchId::next(),
            index,
            point: Point::from(index as i64),
        }
    }

    fn pool(workers: usize, capacity: Option<usize>) -> Arc<ThreadPool> {
        let config = PoolConfig {
            worker_count: Some(workers),
            queue_capacity: capacity,
            ..PoolConfig::default()
        };
        Arc::new(ThreadPool::new(&config).unwrap())
    }

    /// Submits a task that blocks until the returned sender is dropped or
    /// sent to, and waits until a worker has picked it up.
    fn occupy_worker(pool: &ThreadPool) -> crossbeam_channel::Sender<()> {
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(0);
        let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
        let _ = submit_point(pool, meta(0), move |_| {
            let _ = started_tx.send(());
            let _ = gate_rx.recv();
            Ok(())
        });
        started_rx.recv().unwrap();
        gate_tx
    }

    #[test]
    fn launch_runs_on_workers() {
        let pool = pool(4, None);
        let ctx = Context::with_substrate(pool.clone());
        let map = ctx.launch(&Domain::create([4, 4]).unwrap(), |tc| {
            Ok(tc.point()[0] * 4 + tc.point()[1])
        });
        let got: Vec<i64> = map.results().into_iter().map(Result::unwrap).collect();
        assert_eq!(got, (0..16).collect::<Vec<_>>());
        let report = pool.shutdown(ShutdownMode::Drain);
        assert_eq!(report.workers_joined, 4);
        assert_eq!(pool.metrics().succeeded, 16);
    }

    #[test]
    fn workers_are_named() {
        let pool = pool(1, None);
        let f = submit_point(&*pool, meta(0), |_| {
            Ok(thread::current().name().map(String::from))
        });
        assert_eq!(f.get().unwrap().as_deref(), Some("fanout-worker-0"));
        pool.shutdown(ShutdownMode::Drain);
    }

    #[test]
    fn metrics_are_current_once_futures_are_read() {
        let pool = pool(3, None);
        let ctx = Context::with_substrate(pool.clone());
        let map = ctx.launch(&Domain::create(12).unwrap(), |tc| match tc.index() % 3 {
            0 => Ok(tc.index()),
            1 => Err(TaskError::failed("odd one out")),
            _ => panic!("point {} exploded", tc.point()),
        });
        map.wait_all();
        let m = pool.metrics();
        assert_eq!(m.executed, 12);
        assert_eq!(m.succeeded, 4);
        assert_eq!(m.failed, 4);
        assert_eq!(m.panicked, 4);
        pool.shutdown(ShutdownMode::Drain);
    }

    #[test]
    fn full_queue_rejects() {
        let pool = pool(1, Some(1));
        let gate = occupy_worker(&pool);
        let queued = submit_point(&*pool, meta(1), |_| Ok(1u8));
        let refused = submit_point(&*pool, meta(2), |_| Ok(2u8));
        assert_eq!(
            refused.get(),
            Err(TaskError::Submission(SubmissionError::QueueFull))
        );
        drop(gate);
        assert_eq!(queued.get(), Ok(1));
        pool.shutdown(ShutdownMode::Drain);
        assert_eq!(pool.metrics().rejected, 1);
    }

    #[test]
    fn submit_after_shutdown_rejects() {
        let pool = pool(2, None);
        pool.shutdown(ShutdownMode::Drain);
        assert!(pool.is_shut_down());
        let f = submit_point(&*pool, meta(0), |_| Ok(0u8));
        assert_eq!(
            f.get(),
            Err(TaskError::Submission(SubmissionError::Shutdown))
        );
        let again = pool.shutdown(ShutdownMode::Drain);
        assert_eq!(again.workers_joined, 0);
    }

    #[test]
    fn cancel_fails_queued_work() {
        let pool = pool(1, None);
        let gate = occupy_worker(&pool);
        let queued: Vec<_> = (1..4)
            .map(|i| submit_point(&*pool, meta(i), move |_| Ok(i)))
            .collect();
        assert_eq!(pool.queued(), 3);

        let stopper = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.shutdown(ShutdownMode::Cancel))
        };
        while !pool.is_shut_down() {
            thread::sleep(Duration::from_millis(1));
        }
        drop(gate);
        let report = stopper.join().unwrap();

        assert_eq!(report.mode, ShutdownMode::Cancel);
        assert_eq!(report.cancelled, 3);
        for f in queued {
            assert_eq!(f.get(), Err(TaskError::Cancelled));
        }
    }

    #[test]
    fn drain_runs_queued_work() {
        let pool = pool(1, None);
        let gate = occupy_worker(&pool);
        let queued: Vec<_> = (1..4)
            .map(|i| submit_point(&*pool, meta(i), move |_| Ok(i)))
            .collect();
        let stopper = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.shutdown(ShutdownMode::Drain))
        };
        while !pool.is_shut_down() {
            thread::sleep(Duration::from_millis(1));
        }
        drop(gate);
        let report = stopper.join().unwrap();
        assert_eq!(report.cancelled, 0);
        let got: Vec<usize> = queued.iter().map(|f| f.get().unwrap()).collect();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn run_pending_one_helps_from_caller() {
        let pool = pool(1, None);
        let gate = occupy_worker(&pool);
        let f = submit_point(&*pool, meta(1), |_| Ok(thread::current().id()));
        assert!(pool.run_pending_one());
        assert!(!pool.run_pending_one());
        assert_eq!(f.get(), Ok(thread::current().id()));
        drop(gate);
        pool.shutdown(ShutdownMode::Drain);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PoolConfig {
            queue_capacity: Some(0),
            ..PoolConfig::default()
        };
        assert_eq!(
            ThreadPool::new(&config).unwrap_err(),
            ConfigError::QueueCapacityZero
        );
    }
}
