//! A thread pool and task registry with a defined lifetime.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::{ConfigError, PoolConfig};
use crate::context::Context;
use crate::pool::{ShutdownMode, ShutdownReport, ThreadPool};
use crate::registry::TaskRegistry;

/// Owns a [`ThreadPool`] and a frozen [`TaskRegistry`].
///
/// Task registration happens before the runtime exists; launches go
/// through the [`Context`] it hands out. Dropping the runtime drains the
/// pool, so every future from a launch through it reaches a terminal
/// state before `drop` returns.
///
/// ```
/// use fanout_domain::Domain;
/// use fanout_engine::{PoolConfig, Runtime, TaskRegistry};
///
/// let runtime = Runtime::new(PoolConfig::with_workers(2), TaskRegistry::empty()).unwrap();
/// let ctx = runtime.context();
/// let futures = ctx.launch(&Domain::create([3, 3]).unwrap(), |tc| Ok(tc.point().clone()));
/// assert_eq!(futures.len(), 9);
/// assert!(futures.results().iter().all(Result::is_ok));
/// ```
#[derive(Debug)]
pub struct Runtime {
    pool: Arc<ThreadPool>,
    context: Context,
    shut_down: AtomicBool,
}

impl Runtime {
    /// Start the pool described by `config` with `registry`.
    pub fn new(config: PoolConfig, registry: TaskRegistry) -> Result<Self, ConfigError> {
        let pool = Arc::new(ThreadPool::new(&config)?);
        let context = Context::new(pool.clone(), Arc::new(registry));
        Ok(Self {
            pool,
            context,
            shut_down: AtomicBool::new(false),
        })
    }

    /// A handle for launching through this runtime.
    pub fn context(&self) -> Context {
        self.context.clone()
    }

    /// The underlying pool.
    pub fn pool(&self) -> &ThreadPool {
        &self.pool
    }

    /// The registered tasks.
    pub fn registry(&self) -> &TaskRegistry {
        self.context.registry()
    }

    /// Shut the pool down. See [`ThreadPool::shutdown`].
    pub fn shutdown(&self, mode: ShutdownMode) -> ShutdownReport {
        self.shut_down.store(true, Ordering::Release);
        self.pool.shutdown(mode)
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if !self.shut_down.load(Ordering::Acquire) {
            self.shutdown(ShutdownMode::Drain);
        }
    }
}
