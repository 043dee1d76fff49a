//! Index launches: one invocation per domain point.

use std::any::Any;
use std::ops::Index;
use std::sync::Arc;
use std::time::Instant;

use fanout_core::{LaunchId, Point, RegistryError, TaskError, TaskId};
use fanout_domain::Domain;
use fanout_future::{AnyValue, Future};

use crate::argmap::ArgumentMap;
use crate::context::{Context, TaskContext};
use crate::invocation::{self, InvocationMeta};
use crate::metrics::LaunchMetrics;

/// Upper bound on the entry slots reserved before submission starts.
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 16;

/// Slots to reserve for a launch over `volume` points. Huge domains grow
/// the map as they are enumerated instead of reserving it all up front.
fn entry_capacity(volume: usize) -> usize {
    volume.min(MAX_PREALLOCATED_ENTRIES)
}

/// Launches a task over every point of a [`Domain`].
///
/// `A` is the launch-wide argument shared by every point, `P` the type of
/// the optional per-point arguments. Both default to `()`.
///
/// ```
/// use std::sync::Arc;
/// use fanout_domain::Domain;
/// use fanout_engine::{Context, IndexLauncher, InlineSubstrate};
///
/// let ctx = Context::with_substrate(Arc::new(InlineSubstrate::new()));
/// let domain = Domain::create(10).unwrap();
/// let futures = IndexLauncher::new(domain)
///     .args(100i64)
///     .launch(&ctx, |tc| Ok(tc.point()[0] + *tc.args()));
/// let values: Vec<i64> = futures.results().into_iter().map(Result::unwrap).collect();
/// assert_eq!(values, (100..110).collect::<Vec<_>>());
/// ```
#[derive(Debug)]
pub struct IndexLauncher<A = (), P = ()> {
    domain: Domain,
    args: Arc<A>,
    argument_map: Arc<ArgumentMap<P>>,
}

impl<A, P> Clone for IndexLauncher<A, P> {
    fn clone(&self) -> Self {
        Self {
            domain: self.domain.clone(),
            args: Arc::clone(&self.args),
            argument_map: Arc::clone(&self.argument_map),
        }
    }
}

impl IndexLauncher {
    /// A launcher over `domain` with no arguments.
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            args: Arc::new(()),
            argument_map: Arc::new(ArgumentMap::new()),
        }
    }
}

impl<A, P> IndexLauncher<A, P> {
    /// Replace the launch-wide argument.
    pub fn args<B>(self, args: B) -> IndexLauncher<B, P> {
        IndexLauncher {
            domain: self.domain,
            args: Arc::new(args),
            argument_map: self.argument_map,
        }
    }

    /// Replace the per-point arguments.
    pub fn argument_map<Q>(self, map: ArgumentMap<Q>) -> IndexLauncher<A, Q> {
        IndexLauncher {
            domain: self.domain,
            args: self.args,
            argument_map: Arc::new(map),
        }
    }

    /// The launch domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }
}

impl<A, P> IndexLauncher<A, P>
where
    A: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Submit `task` once per domain point and return the futures.
    ///
    /// Points are submitted in row-major order and the k-th entry of the
    /// returned map belongs to the k-th point, whatever order the tasks
    /// complete in. Returns as soon as every invocation is submitted; an
    /// empty domain submits nothing. A point the substrate refuses keeps
    /// its entry, with a future already Failed with
    /// [`TaskError::Submission`].
    pub fn launch<T, F>(&self, ctx: &Context, task: F) -> FutureMap<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&TaskContext<'_, A, P>) -> Result<T, TaskError> + Send + Sync + 'static,
    {
        self.submit_all(ctx, Arc::new(task))
    }

    fn submit_all<T, F>(&self, ctx: &Context, task: Arc<F>) -> FutureMap<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&TaskContext<'_, A, P>) -> Result<T, TaskError> + Send + Sync + 'static,
    {
        let start = Instant::now();
        let launch = LaunchId::next();
        let volume = self.domain.volume();
        tracing::debug!(
            %launch,
            domain = %self.domain,
            points = volume,
            substrate = ctx.substrate().name(),
            "index launch"
        );

        let mut metrics = LaunchMetrics {
            points: volume as u64,
            ..LaunchMetrics::default()
        };
        let mut entries = Vec::with_capacity(entry_capacity(volume));
        for (index, point) in self.domain.iter().enumerate() {
            tracing::trace!(%launch, index, %point, "submitting point");
            let meta = InvocationMeta {
                launch,
                index,
                point: point.clone(),
            };
            let task = Arc::clone(&task);
            let args = Arc::clone(&self.args);
            let argument_map = Arc::clone(&self.argument_map);
            let task_ctx = ctx.clone();
            let body = move |meta: &InvocationMeta| {
                let tc = TaskContext {
                    context: &task_ctx,
                    meta,
                    args: &*args,
                    point_arg: argument_map.get(&meta.point),
                };
                (*task)(&tc)
            };
            let (future, accepted) = invocation::dispatch(ctx.substrate(), meta, body);
            if accepted {
                metrics.submitted += 1;
            } else {
                metrics.rejected += 1;
            }
            entries.push((point, future));
        }
        metrics.submit_us = start.elapsed().as_micros() as u64;

        FutureMap {
            launch,
            domain: self.domain.clone(),
            entries,
            metrics,
        }
    }
}

impl<A, P> IndexLauncher<A, P>
where
    A: Any + Send + Sync,
    P: Any + Send + Sync,
{
    /// Launch the task registered under `id` in the context's registry.
    ///
    /// The registered body sees the launch's arguments type-erased; see
    /// [`ErasedTaskContext`](crate::ErasedTaskContext). Results are
    /// [`AnyValue`]s, read back with
    /// [`Future::get_as`](fanout_future::Future::get_as).
    pub fn launch_registered(
        &self,
        ctx: &Context,
        id: TaskId,
    ) -> Result<FutureMap<AnyValue>, RegistryError> {
        let registered = Arc::clone(ctx.registry().lookup(id)?);
        if let Some(expected) = registered.point_dim() {
            if expected != self.domain.dim() {
                return Err(RegistryError::DimensionMismatch {
                    id,
                    expected,
                    got: self.domain.dim(),
                });
            }
        }
        registered.check_args::<A, P>()?;
        Ok(self.launch(ctx, move |tc| registered.call(&tc.erase())))
    }
}

/// The ordered result of a launch: every domain point paired with its
/// future, in row-major order.
#[derive(Debug)]
pub struct FutureMap<T> {
    launch: LaunchId,
    domain: Domain,
    entries: Vec<(Point, Future<T>)>,
    metrics: LaunchMetrics,
}

impl<T> Clone for FutureMap<T> {
    fn clone(&self) -> Self {
        Self {
            launch: self.launch,
            domain: self.domain.clone(),
            entries: self.entries.clone(),
            metrics: self.metrics.clone(),
        }
    }
}

impl<T> FutureMap<T> {
    /// The launch that produced these futures.
    pub fn launch_id(&self) -> LaunchId {
        self.launch
    }

    /// The launch domain.
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Number of entries; always the domain's volume.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` for a launch over an empty domain.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(point, future)` pairs in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, (Point, Future<T>)> {
        self.entries.iter()
    }

    /// Points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.entries.iter().map(|(p, _)| p)
    }

    /// Futures in row-major order.
    pub fn futures(&self) -> impl Iterator<Item = &Future<T>> {
        self.entries.iter().map(|(_, f)| f)
    }

    /// The future for `point`, if it belongs to the domain.
    pub fn get(&self, point: &Point) -> Option<&Future<T>> {
        let rank = self.domain.rank_of(point)?;
        self.entries.get(rank).map(|(_, f)| f)
    }

    /// The entry at position `index`.
    pub fn at(&self, index: usize) -> Option<&(Point, Future<T>)> {
        self.entries.get(index)
    }

    /// `true` once every future is terminal.
    pub fn is_ready(&self) -> bool {
        self.entries.iter().all(|(_, f)| f.is_ready())
    }

    /// Block until every future is terminal.
    ///
    /// Blocks the calling thread without helping the substrate. Inside a
    /// task body, wait through [`Context::wait`] instead.
    pub fn wait_all(&self) {
        for (_, f) in &self.entries {
            let _ = f.wait();
        }
    }

    /// Submission metrics for this launch.
    pub fn metrics(&self) -> &LaunchMetrics {
        &self.metrics
    }
}

impl<T: Clone> FutureMap<T> {
    /// Block on every future and collect the outcomes in row-major order.
    pub fn results(&self) -> Vec<Result<T, TaskError>> {
        self.entries.iter().map(|(_, f)| f.get()).collect()
    }

    /// Like [`results`](Self::results), but waits cooperatively through
    /// `ctx`. Safe to call from inside a task body.
    pub fn results_in(&self, ctx: &Context) -> Vec<Result<T, TaskError>> {
        self.entries.iter().map(|(_, f)| ctx.get(f)).collect()
    }
}

impl<T> Index<usize> for FutureMap<T> {
    type Output = Future<T>;

    fn index(&self, index: usize) -> &Future<T> {
        &self.entries[index].1
    }
}

impl<T> IntoIterator for FutureMap<T> {
    type Item = (Point, Future<T>);
    type IntoIter = std::vec::IntoIter<(Point, Future<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a FutureMap<T> {
    type Item = &'a (Point, Future<T>);
    type IntoIter = std::slice::Iter<'a, (Point, Future<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
