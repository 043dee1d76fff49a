//! The [`Substrate`] trait: the boundary to whatever runs invocations.

use std::fmt;

use fanout_core::SubmissionError;

use crate::invocation::Invocation;

/// An execution substrate that schedules and runs submitted invocations.
///
/// # Contract
///
/// For every invocation accepted by [`submit`](Self::submit), the substrate
/// eventually calls exactly one of [`Invocation::run`] or
/// [`Invocation::abort`]. Running an invocation invokes the task body with
/// its point and captured arguments and stores the body's result (or
/// failure) in the matching future. Task failures never propagate to the
/// submitting thread.
///
/// A rejected invocation is handed back inside [`Rejected`], like a
/// channel returning an undelivered message, so the caller can fail its
/// future instead of losing the point.
///
/// # Thread Safety
///
/// `Send + Sync` is required because substrates are shared through
/// [`Context`](crate::Context) handles that travel into task bodies on
/// other threads.
pub trait Substrate: Send + Sync + 'static {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Accept an invocation for execution, or hand it back.
    ///
    /// Must not wait for the invocation to complete.
    fn submit(&self, invocation: Invocation) -> Result<(), Rejected>;

    /// Run one queued invocation on the calling thread, if any.
    ///
    /// Called by [`Context::wait`](crate::Context::wait) while the caller's
    /// future is pending, so a task blocked on another task's result keeps
    /// the queue moving. Returns `false` if nothing was run. The default
    /// implementation never runs anything.
    fn run_pending_one(&self) -> bool {
        false
    }
}

/// An invocation the substrate refused, with the reason.
pub struct Rejected {
    /// Why the invocation was refused.
    pub error: SubmissionError,
    /// The refused invocation, not yet run or aborted.
    pub invocation: Invocation,
}

impl Rejected {
    /// Pair a refused invocation with the reason.
    pub fn new(error: SubmissionError, invocation: Invocation) -> Self {
        Self { error, invocation }
    }
}

impl fmt::Debug for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rejected")
            .field("error", &self.error)
            .field("invocation", self.invocation.meta())
            .finish()
    }
}
