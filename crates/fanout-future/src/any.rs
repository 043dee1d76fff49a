//! Type-erased results and typed extraction.

use std::any::{type_name, Any};
use std::sync::Arc;

use fanout_core::TaskError;

use crate::future::Future;

/// A shared, type-erased task result.
///
/// Registered tasks are stored without their concrete output type, so
/// their futures carry `AnyValue`. Readers recover the concrete type with
/// [`Future::get_as`] or [`Future::wait_as`].
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// Erase a value into an [`AnyValue`].
pub fn erase<T: Any + Send + Sync>(value: T) -> AnyValue {
    Arc::new(value)
}

impl Future<AnyValue> {
    /// Block until the outcome is available and borrow it as `T`.
    ///
    /// Returns `Err(TaskError::TypeMismatch)` if the stored value is not a
    /// `T`, or the stored failure if the task failed.
    pub fn wait_as<T: Any>(&self) -> Result<&T, TaskError> {
        let value = self.wait().map_err(Clone::clone)?;
        value
            .downcast_ref::<T>()
            .ok_or(TaskError::TypeMismatch {
                expected: type_name::<T>(),
            })
    }

    /// Block until the outcome is available and return a copy as `T`.
    pub fn get_as<T: Any + Clone>(&self) -> Result<T, TaskError> {
        self.wait_as::<T>().cloned()
    }
}
