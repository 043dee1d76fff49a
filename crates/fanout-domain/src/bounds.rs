//! Bounds specifications accepted by [`Domain::create`](crate::Domain::create).

use fanout_core::Point;

/// How a domain's bounds are described.
///
/// Every variant normalizes to an inclusive `(lo, hi)` rectangle:
///
/// - `Extent(n)` is the 1D range `[0, n - 1]`;
/// - `Extents([e0, .., ek])` is `[(0, .., 0), (e0 - 1, .., ek - 1)]`;
/// - `Rect { lo, hi }` is taken as given.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Bounds {
    /// A 1D domain of `n` points starting at 0.
    Extent(i64),
    /// A zero-based domain with one extent per axis.
    Extents(Vec<i64>),
    /// Explicit inclusive bounds.
    Rect {
        /// Lower corner (inclusive).
        lo: Point,
        /// Upper corner (inclusive).
        hi: Point,
    },
}

impl From<i64> for Bounds {
    fn from(n: i64) -> Self {
        Self::Extent(n)
    }
}

impl From<Vec<i64>> for Bounds {
    fn from(extents: Vec<i64>) -> Self {
        Self::Extents(extents)
    }
}

impl From<&[i64]> for Bounds {
    fn from(extents: &[i64]) -> Self {
        Self::Extents(extents.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for Bounds {
    fn from(extents: [i64; N]) -> Self {
        Self::Extents(extents.to_vec())
    }
}

impl From<(Point, Point)> for Bounds {
    fn from((lo, hi): (Point, Point)) -> Self {
        Self::Rect { lo, hi }
    }
}
