//! Explicit execution context handles.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fanout_core::{LaunchId, Point, TaskError};
use fanout_domain::Domain;
use fanout_future::Future;

use crate::invocation::InvocationMeta;
use crate::launcher::{FutureMap, IndexLauncher};
use crate::registry::TaskRegistry;
use crate::substrate::Substrate;

/// How long [`Context::wait`] sleeps on the future when the substrate has
/// no queued work to run in the meantime.
const IDLE_WAIT: Duration = Duration::from_millis(1);

/// Handle to the substrate and task registry that launches go through.
///
/// Cheap to clone. Every task body receives the context its launch was
/// issued from, so nested launches and cooperative waits reach the same
/// substrate without any global state.
#[derive(Clone)]
pub struct Context {
    substrate: Arc<dyn Substrate>,
    registry: Arc<TaskRegistry>,
}

impl Context {
    /// Bundle a substrate with a registry.
    pub fn new(substrate: Arc<dyn Substrate>, registry: Arc<TaskRegistry>) -> Self {
        Self {
            substrate,
            registry,
        }
    }

    /// A context with an empty registry, for closure-only launches.
    pub fn with_substrate(substrate: Arc<dyn Substrate>) -> Self {
        Self::new(substrate, Arc::new(TaskRegistry::empty()))
    }

    /// The substrate launches are submitted to.
    pub fn substrate(&self) -> &dyn Substrate {
        &*self.substrate
    }

    /// The registered tasks available to [`IndexLauncher::launch_registered`].
    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Launch `task` over every point of `domain` with no arguments.
    ///
    /// Shorthand for `IndexLauncher::new(domain.clone()).launch(self, task)`.
    pub fn launch<T, F>(&self, domain: &Domain, task: F) -> FutureMap<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&TaskContext<'_, (), ()>) -> Result<T, TaskError> + Send + Sync + 'static,
    {
        IndexLauncher::new(domain.clone()).launch(self, task)
    }

    /// Wait for `future` while helping the substrate make progress.
    ///
    /// While the future is pending, queued invocations are run on the
    /// calling thread. A task that waits on another task's result therefore
    /// never starves a fixed-size pool, even with a single worker.
    pub fn wait<'f, T>(&self, future: &'f Future<T>) -> Result<&'f T, &'f TaskError> {
        while !future.is_ready() {
            if !self.substrate.run_pending_one() {
                if let Some(outcome) = future.wait_timeout(IDLE_WAIT) {
                    return outcome;
                }
            }
        }
        future.wait()
    }

    /// [`wait`](Self::wait), then return a copy of the outcome.
    pub fn get<T: Clone>(&self, future: &Future<T>) -> Result<T, TaskError> {
        match self.wait(future) {
            Ok(v) => Ok(v.clone()),
            Err(e) => Err(e.clone()),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("substrate", &self.substrate.name())
            .field("registered_tasks", &self.registry.len())
            .finish()
    }
}

/// What a task body sees when it runs for one point.
///
/// `A` is the launch-wide argument type and `P` the per-point argument
/// type. Both may be unsized (`dyn Any`) for registered tasks; see
/// [`ErasedTaskContext`].
pub struct TaskContext<'a, A: ?Sized, P: ?Sized> {
    pub(crate) context: &'a Context,
    pub(crate) meta: &'a InvocationMeta,
    pub(crate) args: &'a A,
    pub(crate) point_arg: Option<&'a P>,
}

/// Task context with type-erased arguments, passed to registered tasks.
pub type ErasedTaskContext<'a> =
    TaskContext<'a, dyn Any + Send + Sync, dyn Any + Send + Sync>;

impl<'a, A: ?Sized, P: ?Sized> TaskContext<'a, A, P> {
    /// The point this invocation runs for.
    pub fn point(&self) -> &'a Point {
        &self.meta.point
    }

    /// Position of the point in the launch's row-major order.
    pub fn index(&self) -> usize {
        self.meta.index
    }

    /// The launch this invocation belongs to.
    pub fn launch_id(&self) -> LaunchId {
        self.meta.launch
    }

    /// Launch-wide arguments captured at launch time.
    pub fn args(&self) -> &'a A {
        self.args
    }

    /// This point's entry in the launch's argument map, if any.
    pub fn point_arg(&self) -> Option<&'a P> {
        self.point_arg
    }

    /// The context the launch was issued from.
    pub fn context(&self) -> &'a Context {
        self.context
    }
}

impl<'a, A, P> TaskContext<'a, A, P>
where
    A: Any + Send + Sync,
    P: Any + Send + Sync,
{
    /// View this context with type-erased arguments.
    pub fn erase(&self) -> ErasedTaskContext<'a> {
        TaskContext {
            context: self.context,
            meta: self.meta,
            args: self.args as &(dyn Any + Send + Sync),
            point_arg: self.point_arg.map(|p| p as &(dyn Any + Send + Sync)),
        }
    }
}

impl<'a> ErasedTaskContext<'a> {
    /// Launch-wide arguments as `T`.
    ///
    /// Returns `Err(TaskError::TypeMismatch)` if the launch was issued with
    /// a different argument type.
    pub fn args_as<T: Any>(&self) -> Result<&'a T, TaskError> {
        self.args.downcast_ref::<T>().ok_or(TaskError::TypeMismatch {
            expected: type_name::<T>(),
        })
    }

    /// This point's argument as `T`, if the point has one.
    pub fn point_arg_as<T: Any>(&self) -> Result<Option<&'a T>, TaskError> {
        match self.point_arg {
            None => Ok(None),
            Some(arg) => arg
                .downcast_ref::<T>()
                .map(Some)
                .ok_or(TaskError::TypeMismatch {
                    expected: type_name::<T>(),
                }),
        }
    }
}
