//! [`Future`] and [`Promise`]: the two halves of a result slot.

use std::fmt;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use fanout_core::{DoubleResolution, TaskError};

/// The shared result slot.
///
/// `outcome` is written at most once, under `lock`, and `ready` is
/// notified after the write. Readers that find the cell empty wait on
/// `ready` while holding `lock`, so a wakeup can never be missed.
struct Slot<T> {
    outcome: OnceLock<Result<T, TaskError>>,
    lock: Mutex<()>,
    ready: Condvar,
}

impl<T> Slot<T> {
    fn pending() -> Self {
        Self {
            outcome: OnceLock::new(),
            lock: Mutex::new(()),
            ready: Condvar::new(),
        }
    }

    fn terminal(outcome: Result<T, TaskError>) -> Self {
        Self {
            outcome: OnceLock::from(outcome),
            lock: Mutex::new(()),
            ready: Condvar::new(),
        }
    }

    /// The mutex guards no data, so a poisoned lock is still usable.
    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, outcome: Result<T, TaskError>) -> Result<(), DoubleResolution> {
        let guard = self.guard();
        let stored = self.outcome.set(outcome).map_err(|_| DoubleResolution);
        drop(guard);
        if stored.is_ok() {
            self.ready.notify_all();
        }
        stored
    }

    fn wait(&self) -> &Result<T, TaskError> {
        if let Some(outcome) = self.outcome.get() {
            return outcome;
        }
        let mut guard = self.guard();
        loop {
            if let Some(outcome) = self.outcome.get() {
                return outcome;
            }
            guard = self
                .ready
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn wait_timeout(&self, timeout: Duration) -> Option<&Result<T, TaskError>> {
        if let Some(outcome) = self.outcome.get() {
            return Some(outcome);
        }
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return Some(self.wait());
        };
        let mut guard = self.guard();
        loop {
            if let Some(outcome) = self.outcome.get() {
                return Some(outcome);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            guard = self
                .ready
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// Read side of a single-assignment result slot.
///
/// Cloning a `Future` shares the slot; it never duplicates it. The slot
/// lives as long as the longest-lived clone or its [`Promise`].
///
/// # States
///
/// - **Pending**: no outcome yet. [`is_ready`](Self::is_ready) is `false`
///   and [`get`](Self::get) blocks.
/// - **Ready**: the producer stored a value.
/// - **Failed**: the producer stored a [`TaskError`].
///
/// Ready and Failed are terminal.
pub struct Future<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Future<T> {
    /// A future that is already Ready with `value`.
    pub fn ready(value: T) -> Self {
        Self {
            slot: Arc::new(Slot::terminal(Ok(value))),
        }
    }

    /// A future that is already Failed with `error`.
    pub fn failed(error: TaskError) -> Self {
        Self {
            slot: Arc::new(Slot::terminal(Err(error))),
        }
    }

    /// `true` once the future is Ready or Failed. Never blocks.
    pub fn is_ready(&self) -> bool {
        self.slot.outcome.get().is_some()
    }

    /// Block until the outcome is available and borrow it.
    ///
    /// Returns immediately on every call after the first completion.
    pub fn wait(&self) -> Result<&T, &TaskError> {
        self.slot.wait().as_ref()
    }

    /// Borrow the outcome if available, without blocking.
    pub fn try_get(&self) -> Option<Result<&T, &TaskError>> {
        self.slot.outcome.get().map(Result::as_ref)
    }

    /// Block for at most `timeout`.
    ///
    /// Returns `None` if the future is still Pending when the timeout
    /// elapses; a pending future never yields a placeholder value.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<Result<&T, &TaskError>> {
        self.slot.wait_timeout(timeout).map(Result::as_ref)
    }

    /// `true` if both handles share the same slot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.slot, &other.slot)
    }
}

impl<T: Clone> Future<T> {
    /// Block until the outcome is available and return a copy of it.
    ///
    /// Idempotent: every call, from any thread, returns the same value or
    /// the same error. Reading never clears the slot.
    pub fn get(&self) -> Result<T, TaskError> {
        match self.wait() {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(e.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.try_get() {
            None => f.write_str("Future(Pending)"),
            Some(Ok(v)) => f.debug_tuple("Future::Ready").field(v).finish(),
            Some(Err(e)) => f.debug_tuple("Future::Failed").field(e).finish(),
        }
    }
}

/// Write side of a result slot.
///
/// Resolving consumes the promise, so a single promise can complete its
/// slot at most once. A promise dropped without completing fails the slot
/// with [`TaskError::Abandoned`] so that readers are never left waiting on
/// a producer that no longer exists.
pub struct Promise<T> {
    slot: Option<Arc<Slot<T>>>,
}

/// Create a connected (promise, future) pair in the Pending state.
pub fn promise<T>() -> (Promise<T>, Future<T>) {
    let slot = Arc::new(Slot::pending());
    let future = Future {
        slot: Arc::clone(&slot),
    };
    (Promise { slot: Some(slot) }, future)
}

impl<T> Promise<T> {
    /// Store `value`, moving the slot to Ready and waking all readers.
    pub fn resolve(self, value: T) -> Result<(), DoubleResolution> {
        self.complete(Ok(value))
    }

    /// Store `error`, moving the slot to Failed and waking all readers.
    pub fn fail(self, error: TaskError) -> Result<(), DoubleResolution> {
        self.complete(Err(error))
    }

    /// Store either outcome.
    ///
    /// Returns `Err(DoubleResolution)` if the slot is already terminal.
    pub fn complete(mut self, outcome: Result<T, TaskError>) -> Result<(), DoubleResolution> {
        match self.slot.take() {
            Some(slot) => slot.complete(outcome),
            None => Err(DoubleResolution),
        }
    }
}

impl<T> Drop for Promise<T> {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            // Already terminal means another writer raced us; nothing to do.
            let _ = slot.complete(Err(TaskError::Abandoned));
        }
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Promise")
            .field("completed", &self.slot.is_none())
            .finish()
    }
}
