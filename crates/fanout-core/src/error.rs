//! Error types for the fanout workspace.
//!
//! Organized by where the error is observed: domain construction
//! ([`DomainError`]), invocation submission ([`SubmissionError`]),
//! future resolution ([`TaskError`], [`DoubleResolution`]) and task
//! registration ([`RegistryError`]).

use std::error::Error;
use std::fmt;

use crate::id::TaskId;

/// Malformed domain bounds, rejected at domain construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomainError {
    /// Lower and upper bounds have different dimensionality.
    DimensionMismatch {
        /// Dimensionality of the lower bound.
        lower: usize,
        /// Dimensionality of the upper bound.
        upper: usize,
    },
    /// Dimensionality is outside `[1, MAX_DIM]`.
    UnsupportedDimension {
        /// The requested dimensionality.
        dim: usize,
        /// The largest supported dimensionality.
        max: usize,
    },
    /// An axis has `lower > upper + 1` (negative extent).
    NegativeExtent {
        /// The offending axis.
        axis: usize,
        /// Lower bound on that axis.
        lower: i64,
        /// Upper bound on that axis.
        upper: i64,
    },
    /// An axis extent or the total volume does not fit in `usize`.
    VolumeOverflow,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { lower, upper } => write!(
                f,
                "lower bound is {lower}-dimensional but upper bound is {upper}-dimensional"
            ),
            Self::UnsupportedDimension { dim, max } => {
                write!(f, "dimensionality {dim} outside supported range [1, {max}]")
            }
            Self::NegativeExtent { axis, lower, upper } => write!(
                f,
                "axis {axis} has negative extent: lower {lower} > upper {upper} + 1"
            ),
            Self::VolumeOverflow => write!(f, "domain volume overflows usize"),
        }
    }
}

impl Error for DomainError {}

/// Why the execution substrate refused an invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionError {
    /// The substrate has shut down.
    Shutdown,
    /// The substrate's queue is at capacity.
    QueueFull,
    /// The substrate rejected the invocation for a substrate-specific reason.
    Rejected {
        /// Human-readable description of the rejection.
        reason: String,
    },
}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shutdown => write!(f, "substrate has shut down"),
            Self::QueueFull => write!(f, "substrate queue full"),
            Self::Rejected { reason } => write!(f, "invocation rejected: {reason}"),
        }
    }
}

impl Error for SubmissionError {}

/// Terminal failure stored in a future.
///
/// Returned by `Future::get()` when the producing task did not yield a
/// value. Failures are per-point: one failed future never affects the
/// others from the same launch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskError {
    /// The task body returned an error.
    Failed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The task body panicked.
    Panicked {
        /// The panic payload, if it was a string.
        message: String,
    },
    /// The invocation could not be submitted; the task never ran.
    Submission(SubmissionError),
    /// The substrate cancelled the invocation before it ran.
    Cancelled,
    /// The producer was dropped without resolving the future.
    Abandoned,
    /// The stored value does not have the requested type.
    TypeMismatch {
        /// Name of the requested type.
        expected: &'static str,
    },
}

impl TaskError {
    /// Convenience constructor for [`TaskError::Failed`].
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { reason } => write!(f, "task failed: {reason}"),
            Self::Panicked { message } => write!(f, "task panicked: {message}"),
            Self::Submission(e) => write!(f, "submission failed: {e}"),
            Self::Cancelled => write!(f, "task cancelled"),
            Self::Abandoned => write!(f, "producer dropped without resolving"),
            Self::TypeMismatch { expected } => {
                write!(f, "result is not of type {expected}")
            }
        }
    }
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Submission(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SubmissionError> for TaskError {
    fn from(e: SubmissionError) -> Self {
        Self::Submission(e)
    }
}

/// A second `resolve`/`fail` on an already-terminal future.
///
/// Never produced by a correct substrate. Callers treat it as a defect,
/// not a recoverable condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoubleResolution;

impl fmt::Display for DoubleResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "future already resolved")
    }
}

impl Error for DoubleResolution {}

/// Errors from building or querying a task registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// A task with this id is already registered.
    DuplicateId {
        /// The duplicated id.
        id: TaskId,
    },
    /// A task with this name is already registered.
    DuplicateName {
        /// The duplicated name.
        name: String,
    },
    /// No task is registered under this id.
    UnknownTask {
        /// The missing id.
        id: TaskId,
    },
    /// The launch domain's dimensionality does not match the task's.
    DimensionMismatch {
        /// The task being launched.
        id: TaskId,
        /// Dimensionality the task was registered with.
        expected: usize,
        /// Dimensionality of the launch domain.
        got: usize,
    },
    /// The launcher's shared or per-point argument type is not the one the
    /// task was registered with.
    ArgumentMismatch {
        /// The task being launched.
        id: TaskId,
        /// Which argument: `"args"` or `"point argument"`.
        which: &'static str,
        /// Type the task was registered with.
        expected: &'static str,
        /// Type the launcher carries.
        got: &'static str,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => write!(f, "task id {id} already registered"),
            Self::DuplicateName { name } => write!(f, "task name '{name}' already registered"),
            Self::UnknownTask { id } => write!(f, "no task registered with id {id}"),
            Self::DimensionMismatch { id, expected, got } => write!(
                f,
                "task {id} expects {expected}-dimensional points, domain is {got}-dimensional"
            ),
            Self::ArgumentMismatch {
                id,
                which,
                expected,
                got,
            } => write!(f, "task {id} expects {which} of type {expected}, got {got}"),
        }
    }
}

impl Error for RegistryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_error_is_source_of_task_error() {
        let e = TaskError::from(SubmissionError::QueueFull);
        assert_eq!(e, TaskError::Submission(SubmissionError::QueueFull));
        let src = e.source().expect("submission failure has a source");
        assert_eq!(src.to_string(), "substrate queue full");
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            DomainError::NegativeExtent {
                axis: 1,
                lower: 5,
                upper: 2
            }
            .to_string(),
            "axis 1 has negative extent: lower 5 > upper 2 + 1"
        );
        assert_eq!(TaskError::failed("boom").to_string(), "task failed: boom");
        assert_eq!(
            RegistryError::UnknownTask { id: TaskId(7) }.to_string(),
            "no task registered with id 7"
        );
        assert_eq!(DoubleResolution.to_string(), "future already resolved");
    }
}
