//! Registered, identified tasks.
//!
//! A [`TaskRegistry`] maps [`TaskId`]s to type-erased task bodies so a
//! launch can name its task instead of passing a closure. The registry is
//! built once through [`TaskRegistryBuilder`] and is immutable afterwards;
//! launches share it through [`Context`](crate::Context).

use std::any::{self, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use fanout_core::{RegistryError, TaskError, TaskId};
use fanout_future::{erase, AnyValue};

use crate::context::ErasedTaskContext;

type ErasedBody = dyn Fn(&ErasedTaskContext<'_>) -> Result<AnyValue, TaskError> + Send + Sync;

/// A task body registered under an id and a name.
pub struct RegisteredTask {
    id: TaskId,
    name: String,
    point_dim: Option<usize>,
    args: Option<ArgShape>,
    point_arg: Option<ArgShape>,
    body: Arc<ErasedBody>,
}

/// Declared type of a launch argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArgShape {
    type_id: TypeId,
    type_name: &'static str,
}

impl ArgShape {
    /// The shape of `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
        }
    }

    /// Name of the declared type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl RegisteredTask {
    /// Wrap `body` as a registered task. Its output is erased to
    /// [`AnyValue`]; readers recover it with
    /// [`Future::get_as`](fanout_future::Future::get_as).
    pub fn new<T, F>(id: impl Into<TaskId>, name: impl Into<String>, body: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&ErasedTaskContext<'_>) -> Result<T, TaskError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            point_dim: None,
            args: None,
            point_arg: None,
            body: Arc::new(erase_output(body)),
        }
    }

    /// Restrict the task to launch domains of dimension `dim`.
    pub fn with_point_dim(mut self, dim: usize) -> Self {
        self.point_dim = Some(dim);
        self
    }

    /// Declare the shared argument type launches must carry.
    pub fn with_args<A: Any>(mut self) -> Self {
        self.args = Some(ArgShape::of::<A>());
        self
    }

    /// Declare the per-point argument type launches must carry.
    pub fn with_point_arg<P: Any>(mut self) -> Self {
        self.point_arg = Some(ArgShape::of::<P>());
        self
    }

    /// The task's id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// The task's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Required domain dimension, if the task declared one.
    pub fn point_dim(&self) -> Option<usize> {
        self.point_dim
    }

    /// Declared shared argument type, if any.
    pub fn args_shape(&self) -> Option<ArgShape> {
        self.args
    }

    /// Declared per-point argument type, if any.
    pub fn point_arg_shape(&self) -> Option<ArgShape> {
        self.point_arg
    }

    /// Check a launcher's argument types against the declared ones.
    pub fn check_args<A: Any, P: Any>(&self) -> Result<(), RegistryError> {
        let checks = [
            ("args", self.args, ArgShape::of::<A>()),
            ("point argument", self.point_arg, ArgShape::of::<P>()),
        ];
        for (which, declared, given) in checks {
            if let Some(expected) = declared {
                if expected.type_id != given.type_id {
                    return Err(RegistryError::ArgumentMismatch {
                        id: self.id,
                        which,
                        expected: expected.type_name,
                        got: given.type_name,
                    });
                }
            }
        }
        Ok(())
    }

    /// Run the body for one point.
    pub fn call(&self, tc: &ErasedTaskContext<'_>) -> Result<AnyValue, TaskError> {
        (self.body)(tc)
    }
}

fn erase_output<T, F>(
    body: F,
) -> impl Fn(&ErasedTaskContext<'_>) -> Result<AnyValue, TaskError> + Send + Sync + 'static
where
    T: Any + Send + Sync,
    F: Fn(&ErasedTaskContext<'_>) -> Result<T, TaskError> + Send + Sync + 'static,
{
    move |tc| body(tc).map(erase)
}

impl fmt::Debug for RegisteredTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("point_dim", &self.point_dim)
            .field("args", &self.args.map(|s| s.type_name))
            .field("point_arg", &self.point_arg.map(|s| s.type_name))
            .finish_non_exhaustive()
    }
}

/// Immutable set of registered tasks, in registration order.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: IndexMap<TaskId, Arc<RegisteredTask>>,
}

impl TaskRegistry {
    /// A registry with no tasks.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start building a registry.
    pub fn builder() -> TaskRegistryBuilder {
        TaskRegistryBuilder::default()
    }

    /// The task registered under `id`, if any.
    pub fn get(&self, id: TaskId) -> Option<&Arc<RegisteredTask>> {
        self.tasks.get(&id)
    }

    /// Like [`get`](Self::get), but an unknown id is an error.
    pub fn lookup(&self, id: TaskId) -> Result<&Arc<RegisteredTask>, RegistryError> {
        self.get(id).ok_or(RegistryError::UnknownTask { id })
    }

    /// The task registered under `name`, if any.
    pub fn by_name(&self, name: &str) -> Option<&Arc<RegisteredTask>> {
        self.tasks.values().find(|t| t.name == name)
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Registered tasks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RegisteredTask>> {
        self.tasks.values()
    }
}

/// Collects tasks, rejecting duplicate ids and names.
#[derive(Debug, Default)]
pub struct TaskRegistryBuilder {
    tasks: IndexMap<TaskId, Arc<RegisteredTask>>,
}

impl TaskRegistryBuilder {
    /// Add `task`.
    pub fn register(mut self, task: RegisteredTask) -> Result<Self, RegistryError> {
        if self.tasks.contains_key(&task.id) {
            return Err(RegistryError::DuplicateId { id: task.id });
        }
        if self.tasks.values().any(|t| t.name == task.name) {
            return Err(RegistryError::DuplicateName { name: task.name });
        }
        tracing::debug!(id = %task.id, name = %task.name, "task registered");
        self.tasks.insert(task.id, Arc::new(task));
        Ok(self)
    }

    /// Freeze the registry.
    pub fn build(self) -> TaskRegistry {
        TaskRegistry { tasks: self.tasks }
    }
}
