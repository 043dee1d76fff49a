//! Reusable task fixtures.
//!
//! - [`identity`] returns the point it runs for.
//! - [`fail_at`] builds a task that fails at one point.
//! - [`identity_task`] is the registered form of [`identity`].

use std::sync::Arc;

use fanout_core::{Point, TaskError, TaskId};
use fanout_engine::{Context, InlineSubstrate, RegisteredTask, TaskContext, TaskRegistry};

/// Id under which [`identity_task`] registers.
pub const IDENTITY_TASK: TaskId = TaskId(1);

/// Returns the invocation's point.
pub fn identity<A: ?Sized, P: ?Sized>(tc: &TaskContext<'_, A, P>) -> Result<Point, TaskError> {
    Ok(tc.point().clone())
}

/// A task that returns its enumeration index, except at `bad`, where it
/// fails with `reason`.
pub fn fail_at<A: ?Sized + 'static, P: ?Sized + 'static>(
    bad: Point,
    reason: &'static str,
) -> impl Fn(&TaskContext<'_, A, P>) -> Result<usize, TaskError> + Send + Sync + 'static {
    move |tc| {
        if *tc.point() == bad {
            Err(TaskError::failed(reason))
        } else {
            Ok(tc.index())
        }
    }
}

/// [`identity`] as a registered task.
pub fn identity_task() -> RegisteredTask {
    RegisteredTask::new(IDENTITY_TASK, "identity", |tc| identity(tc))
}

/// A registry holding only [`identity_task`].
pub fn identity_registry() -> TaskRegistry {
    match TaskRegistry::builder().register(identity_task()) {
        Ok(builder) => builder.build(),
        Err(e) => panic!("fixture registry: {e}"),
    }
}

/// A context over a fresh [`InlineSubstrate`] with [`identity_registry`].
pub fn inline_context() -> Context {
    Context::new(
        Arc::new(InlineSubstrate::new()),
        Arc::new(identity_registry()),
    )
}

/// All points of a domain with the given extents, generated with nested
/// counting rather than the domain iterator.
pub fn row_major_points(extents: &[i64]) -> Vec<Point> {
    let mut points = vec![Vec::new()];
    for &extent in extents {
        points = points
            .into_iter()
            .flat_map(|prefix| {
                (0..extent).map(move |c| {
                    let mut p = prefix.clone();
                    p.push(c);
                    p
                })
            })
            .collect();
    }
    points.into_iter().map(Point::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_major_points_count_like_nested_loops() {
        let pts = row_major_points(&[2, 3]);
        let coords: Vec<Vec<i64>> = pts.iter().map(|p| p.coords().to_vec()).collect();
        assert_eq!(
            coords,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![0, 2],
                vec![1, 0],
                vec![1, 1],
                vec![1, 2]
            ]
        );
        assert!(row_major_points(&[3, 0]).is_empty());
    }

    #[test]
    fn identity_registry_holds_identity() {
        let reg = identity_registry();
        assert_eq!(reg.lookup(IDENTITY_TASK).unwrap().name(), "identity");
    }
}
