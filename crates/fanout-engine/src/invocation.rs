//! The invocation protocol between launchers and substrates.
//!
//! An [`Invocation`] is one point's unit of work: metadata plus a boxed,
//! type-erased job that owns the task body and the [`Promise`] for the
//! point's future. Running the job stores the body's outcome through the
//! promise; aborting it stores a failure without running the body.
//! Observers passed to [`Invocation::run_observed`] and
//! [`Invocation::abort_observed`] see the outcome before any reader of the
//! future can.
//!
//! Task panics are caught here and stored as [`TaskError::Panicked`], so a
//! panicking body fails only its own future.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use fanout_core::{LaunchId, Point, TaskError};
use fanout_future::{promise, Future, Promise};

use crate::substrate::{Rejected, Substrate};

/// Identifies which point of which launch an invocation belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocationMeta {
    /// The launch that produced this invocation.
    pub launch: LaunchId,
    /// Position of the point in the domain's row-major order.
    pub index: usize,
    /// The point itself.
    pub point: Point,
}

/// How a run invocation finished, for substrate bookkeeping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The body returned a value.
    Succeeded,
    /// The body returned an error.
    Failed,
    /// The body panicked.
    Panicked,
}

/// Type-erased job: owns the body and the promise for one point.
trait Job: Send {
    fn run(self: Box<Self>, meta: &InvocationMeta, observe: &dyn Fn(Completion)) -> Completion;
    fn abort(self: Box<Self>, meta: &InvocationMeta, error: TaskError, observe: &dyn Fn());
}

struct PointJob<T, F> {
    promise: Promise<T>,
    body: F,
}

impl<T, F> Job for PointJob<T, F>
where
    T: Send + Sync + 'static,
    F: FnOnce(&InvocationMeta) -> Result<T, TaskError> + Send + 'static,
{
    fn run(self: Box<Self>, meta: &InvocationMeta, observe: &dyn Fn(Completion)) -> Completion {
        let PointJob { promise, body } = *self;
        let (outcome, completion) = match panic::catch_unwind(AssertUnwindSafe(|| body(meta))) {
            Ok(Ok(value)) => (Ok(value), Completion::Succeeded),
            Ok(Err(e)) => (Err(e), Completion::Failed),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(
                    launch = %meta.launch,
                    point = %meta.point,
                    %message,
                    "task panicked"
                );
                (Err(TaskError::Panicked { message }), Completion::Panicked)
            }
        };
        observe(completion);
        if promise.complete(outcome).is_err() {
            report_double_resolution(meta);
        }
        completion
    }

    fn abort(self: Box<Self>, meta: &InvocationMeta, error: TaskError, observe: &dyn Fn()) {
        observe();
        if self.promise.fail(error).is_err() {
            report_double_resolution(meta);
        }
    }
}

/// A double resolution means a substrate completed a slot twice. That is a
/// defect in the substrate, never a task-level condition.
fn report_double_resolution(meta: &InvocationMeta) {
    tracing::error!(
        launch = %meta.launch,
        point = %meta.point,
        "future resolved twice"
    );
    debug_assert!(false, "future for {} resolved twice", meta.point);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// One point's unit of work, handed to a [`Substrate`].
pub struct Invocation {
    meta: InvocationMeta,
    job: Box<dyn Job>,
}

impl Invocation {
    /// Which launch and point this invocation belongs to.
    pub fn meta(&self) -> &InvocationMeta {
        &self.meta
    }

    /// Run the task body on the calling thread and complete the future.
    pub fn run(self) -> Completion {
        self.run_observed(&|_| {})
    }

    /// Like [`run`](Self::run), calling `observe` with the completion before
    /// the future is completed.
    pub fn run_observed(self, observe: &dyn Fn(Completion)) -> Completion {
        let Invocation { meta, job } = self;
        job.run(&meta, observe)
    }

    /// Complete the future with `error` without running the body.
    ///
    /// Used for cancellation and for rejected submissions.
    pub fn abort(self, error: TaskError) {
        self.abort_observed(error, &|| {});
    }

    /// Like [`abort`](Self::abort), calling `observe` before the future is
    /// failed.
    pub fn abort_observed(self, error: TaskError, observe: &dyn Fn()) {
        let Invocation { meta, job } = self;
        job.abort(&meta, error, observe);
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation").field("meta", &self.meta).finish()
    }
}

/// Build an invocation for `body` and the future it will complete.
pub(crate) fn bind<T, F>(meta: InvocationMeta, body: F) -> (Invocation, Future<T>)
where
    T: Send + Sync + 'static,
    F: FnOnce(&InvocationMeta) -> Result<T, TaskError> + Send + 'static,
{
    let (promise, future) = promise();
    let invocation = Invocation {
        meta,
        job: Box::new(PointJob { promise, body }),
    };
    (invocation, future)
}

/// Submit `body` for one point and return the future for its result.
///
/// The returned flag is `false` if the substrate refused the invocation;
/// in that case the future is already Failed with
/// [`TaskError::Submission`].
pub(crate) fn dispatch<T, F>(
    substrate: &dyn Substrate,
    meta: InvocationMeta,
    body: F,
) -> (Future<T>, bool)
where
    T: Send + Sync + 'static,
    F: FnOnce(&InvocationMeta) -> Result<T, TaskError> + Send + 'static,
{
    let (invocation, future) = bind(meta, body);
    match substrate.submit(invocation) {
        Ok(()) => (future, true),
        Err(Rejected { error, invocation }) => {
            tracing::warn!(
                substrate = substrate.name(),
                launch = %invocation.meta().launch,
                point = %invocation.meta().point,
                %error,
                "submission rejected"
            );
            invocation.abort(TaskError::Submission(error));
            (future, false)
        }
    }
}

/// Submit one point's task to `substrate` and return its future.
///
/// This is the single-point form of the protocol an
/// [`IndexLauncher`](crate::IndexLauncher) follows for every point. `body`
/// receives the invocation metadata (point, index, launch id) and must
/// carry any captured arguments itself. A refused submission yields a
/// future that is already Failed with [`TaskError::Submission`].
pub fn submit_point<T, F>(substrate: &dyn Substrate, meta: InvocationMeta, body: F) -> Future<T>
where
    T: Send + Sync + 'static,
    F: FnOnce(&InvocationMeta) -> Result<T, TaskError> + Send + 'static,
{
    dispatch(substrate, meta, body).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use fanout_core::SubmissionError;

    fn meta(index: usize) -> InvocationMeta {
        InvocationMeta {
            launch: LaunchId::next(),
            index,
            point: Point::from(index as i64),
        }
    }

    /// Holds nothing, refuses everything.
    struct Closed;

    impl Substrate for Closed {
        fn name(&self) -> &str {
            "closed"
        }

        fn submit(&self, invocation: Invocation) -> Result<(), Rejected> {
            Err(Rejected::new(SubmissionError::Shutdown, invocation))
        }
    }

    #[test]
    fn run_stores_value() {
        let (inv, fut) = bind(meta(3), |m| Ok(m.point[0] * 2));
        assert!(!fut.is_ready());
        assert_eq!(inv.run(), Completion::Succeeded);
        assert_eq!(fut.get(), Ok(6));
    }

    #[test]
    fn run_stores_error() {
        let (inv, fut) = bind::<u8, _>(meta(0), |_| Err(TaskError::failed("nope")));
        assert_eq!(inv.run(), Completion::Failed);
        assert_eq!(fut.get(), Err(TaskError::failed("nope")));
    }

    #[test]
    fn panic_is_captured_as_failure() {
        let (inv, fut) = bind::<u8, _>(meta(0), |_| panic!("kaboom"));
        assert_eq!(inv.run(), Completion::Panicked);
        assert_eq!(
            fut.get(),
            Err(TaskError::Panicked {
                message: "kaboom".into()
            })
        );
    }

    #[test]
    fn formatted_panic_message_is_kept() {
        let (inv, fut) = bind::<u8, _>(meta(4), |m| panic!("bad point {}", m.point));
        inv.run();
        assert_eq!(
            fut.get(),
            Err(TaskError::Panicked {
                message: "bad point (4)".into()
            })
        );
    }

    #[test]
    fn abort_skips_body() {
        let (inv, fut) = bind::<u8, _>(meta(0), |_| panic!("must not run"));
        inv.abort(TaskError::Cancelled);
        assert_eq!(fut.get(), Err(TaskError::Cancelled));
    }

    #[test]
    fn observer_runs_before_future_completes() {
        let (inv, fut) = bind::<u8, _>(meta(0), |_| Err(TaskError::failed("x")));
        let seen = inv.run_observed(&|c| {
            assert_eq!(c, Completion::Failed);
            assert!(!fut.is_ready());
        });
        assert_eq!(seen, Completion::Failed);
        assert!(fut.is_ready());

        let (inv, fut) = bind::<u8, _>(meta(1), |_| Ok(1));
        inv.abort_observed(TaskError::Cancelled, &|| assert!(!fut.is_ready()));
        assert_eq!(fut.get(), Err(TaskError::Cancelled));
    }

    #[test]
    fn dropped_invocation_abandons_future() {
        let (inv, fut) = bind::<u8, _>(meta(0), |_| Ok(1));
        drop(inv);
        assert_eq!(fut.get(), Err(TaskError::Abandoned));
    }

    #[test]
    fn rejected_submission_prefails_future() {
        let fut = submit_point::<u8, _>(&Closed, meta(1), |_| Ok(1));
        assert_eq!(
            fut.get(),
            Err(TaskError::Submission(SubmissionError::Shutdown))
        );
    }
}
