//! Test substrates and fixtures for fanout development.
//!
//! Substrates with controllable misbehavior ([`RejectingSubstrate`],
//! [`ManualSubstrate`], [`JitterSubstrate`]) and task fixtures for
//! exercising launch ordering, failure isolation and completion order.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use fanout_core::SubmissionError;
use fanout_engine::{InlineSubstrate, Invocation, PoolMetrics, Rejected, Substrate};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

// ── RejectingSubstrate ────────────────────────────────────────────

/// Refuses the invocations at chosen enumeration indices and runs the rest
/// inline.
pub struct RejectingSubstrate {
    indices: HashSet<usize>,
    inner: InlineSubstrate,
    rejected: AtomicU64,
}

impl RejectingSubstrate {
    pub fn at(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            indices: indices.into_iter().collect(),
            inner: InlineSubstrate::new(),
            rejected: AtomicU64::new(0),
        }
    }

    /// Number of invocations refused so far.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Counters of the inline substrate that ran the accepted invocations.
    pub fn metrics(&self) -> PoolMetrics {
        self.inner.metrics()
    }
}

impl Substrate for RejectingSubstrate {
    fn name(&self) -> &str {
        "rejecting"
    }

    fn submit(&self, invocation: Invocation) -> Result<(), Rejected> {
        if self.indices.contains(&invocation.meta().index) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            let reason = format!("index {} is refused", invocation.meta().index);
            return Err(Rejected::new(
                SubmissionError::Rejected { reason },
                invocation,
            ));
        }
        self.inner.submit(invocation)
    }
}

// ── ManualSubstrate ───────────────────────────────────────────────

/// Queues every invocation until the test decides when, and in what order,
/// to run it.
#[derive(Default)]
pub struct ManualSubstrate {
    queue: Mutex<Vec<Invocation>>,
}

impl ManualSubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invocations accepted and not yet run.
    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Run everything queued, in submission order. Returns how many ran.
    pub fn run_in_order(&self) -> usize {
        let batch = std::mem::take(&mut *lock(&self.queue));
        let n = batch.len();
        for invocation in batch {
            invocation.run();
        }
        n
    }

    /// Run everything queued, last submission first. Returns how many ran.
    pub fn run_reversed(&self) -> usize {
        let batch = std::mem::take(&mut *lock(&self.queue));
        let n = batch.len();
        for invocation in batch.into_iter().rev() {
            invocation.run();
        }
        n
    }

    /// Run only the invocation at enumeration `index`, if queued.
    pub fn run_index(&self, index: usize) -> bool {
        let invocation = {
            let mut queue = lock(&self.queue);
            match queue.iter().position(|inv| inv.meta().index == index) {
                Some(pos) => queue.remove(pos),
                None => return false,
            }
        };
        invocation.run();
        true
    }

    /// Drop every queued invocation unrun. Their futures become Abandoned.
    pub fn discard_all(&self) -> usize {
        let batch = std::mem::take(&mut *lock(&self.queue));
        batch.len()
    }
}

impl Substrate for ManualSubstrate {
    fn name(&self) -> &str {
        "manual"
    }

    fn submit(&self, invocation: Invocation) -> Result<(), Rejected> {
        lock(&self.queue).push(invocation);
        Ok(())
    }
}

// ── JitterSubstrate ───────────────────────────────────────────────

/// Runs each invocation on its own thread after a random delay.
///
/// Delays come from a seeded ChaCha8 RNG, so a given seed produces the
/// same delay sequence; thread scheduling still makes completion order
/// nondeterministic.
pub struct JitterSubstrate {
    rng: Mutex<ChaCha8Rng>,
    max_delay: Duration,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl JitterSubstrate {
    pub fn new(seed: u64, max_delay: Duration) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            max_delay,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every spawned invocation thread.
    pub fn join(&self) {
        let handles = std::mem::take(&mut *lock(&self.handles));
        let current = thread::current().id();
        for handle in handles {
            if handle.thread().id() != current {
                let _ = handle.join();
            }
        }
    }

    fn next_delay(&self) -> Duration {
        let max_us = self.max_delay.as_micros() as u64;
        if max_us == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(lock(&self.rng).gen_range(0..=max_us))
    }
}

impl Substrate for JitterSubstrate {
    fn name(&self) -> &str {
        "jitter"
    }

    fn submit(&self, invocation: Invocation) -> Result<(), Rejected> {
        let delay = self.next_delay();
        let name = format!("jitter-{}", invocation.meta().index);
        // Park the invocation in a channel so a failed spawn can hand it back.
        let (tx, rx) = crossbeam_channel::bounded(1);
        let _ = tx.send(invocation);
        let worker_rx = rx.clone();
        let spawned = thread::Builder::new().name(name).spawn(move || {
            thread::sleep(delay);
            if let Ok(invocation) = worker_rx.recv() {
                invocation.run();
            }
        });
        match spawned {
            Ok(handle) => {
                lock(&self.handles).push(handle);
                Ok(())
            }
            Err(e) => match rx.try_recv() {
                Ok(invocation) => Err(Rejected::new(
                    SubmissionError::Rejected {
                        reason: e.to_string(),
                    },
                    invocation,
                )),
                Err(_) => Ok(()),
            },
        }
    }
}

impl Drop for JitterSubstrate {
    fn drop(&mut self) {
        self.join();
    }
}
