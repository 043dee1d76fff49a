//! The [`Point`] coordinate type.

use smallvec::SmallVec;
use std::fmt;
use std::ops::Index;

/// Largest supported point dimensionality.
pub const MAX_DIM: usize = 8;

/// An immutable integer coordinate tuple identifying one unit of work.
///
/// Uses `SmallVec<[i64; 4]>` to avoid heap allocation for points up to
/// 4 dimensions, which covers the common 1D-3D launches. Higher
/// dimensionalities spill to the heap transparently.
///
/// Equality is coordinate-wise. Ordering is lexicographic, which for points
/// of one domain coincides with row-major enumeration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Point(SmallVec<[i64; 4]>);

impl Point {
    /// Build a point from a coordinate slice.
    pub fn new(coords: &[i64]) -> Self {
        Self(SmallVec::from_slice(coords))
    }

    /// The origin `(0, ..., 0)` with `dim` coordinates.
    pub fn zeros(dim: usize) -> Self {
        Self(SmallVec::from_elem(0, dim))
    }

    /// Number of coordinates.
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    /// The coordinates as a slice.
    pub fn coords(&self) -> &[i64] {
        &self.0
    }

    /// Component-wise sum of `self` and `delta`.
    ///
    /// Returns `None` if the dimensionalities differ or a coordinate
    /// overflows.
    pub fn offset(&self, delta: &[i64]) -> Option<Point> {
        if delta.len() != self.dim() {
            return None;
        }
        let mut out = SmallVec::with_capacity(self.dim());
        for (&c, &d) in self.0.iter().zip(delta) {
            out.push(c.checked_add(d)?);
        }
        Some(Self(out))
    }
}

impl Index<usize> for Point {
    type Output = i64;

    fn index(&self, axis: usize) -> &i64 {
        &self.0[axis]
    }
}

impl From<i64> for Point {
    fn from(v: i64) -> Self {
        Self(SmallVec::from_slice(&[v]))
    }
}

impl<const N: usize> From<[i64; N]> for Point {
    fn from(v: [i64; N]) -> Self {
        Self(SmallVec::from_slice(&v))
    }
}

impl From<&[i64]> for Point {
    fn from(v: &[i64]) -> Self {
        Self::new(v)
    }
}

impl From<Vec<i64>> for Point {
    fn from(v: Vec<i64>) -> Self {
        Self(SmallVec::from_vec(v))
    }
}

impl FromIterator<i64> for Point {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}
