//! The [`Domain`] type.

use fanout_core::{DomainError, Point, MAX_DIM};
use smallvec::SmallVec;
use std::fmt;

use crate::bounds::Bounds;
use crate::iter::DomainIter;

/// Immutable N-dimensional rectangular index space with inclusive bounds.
///
/// # Formal definition
///
/// Given lower corner `lo` and upper corner `hi` of dimensionality D:
///
/// - **Point set**: every `p` with `lo[i] <= p[i] <= hi[i]` on all axes.
/// - **Extent**: `hi[i] - lo[i] + 1`, which may be 0 (`lo[i] == hi[i] + 1`).
/// - **Volume**: product of extents, 0 if any extent is 0 (overflow-checked
///   at construction).
/// - **Order**: row-major, the last axis varies fastest. The rank of a point
///   is its position in that order and is computed with mixed-radix strides.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Domain {
    lo: Point,
    hi: Point,
    extents: SmallVec<[usize; 4]>,
    strides: SmallVec<[usize; 4]>,
    volume: usize,
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Domain")
            .field("lo", &self.lo)
            .field("hi", &self.hi)
            .field("extents", &self.extents)
            .field("volume", &self.volume)
            .finish()
    }
}

impl Domain {
    /// Build a domain from any accepted bounds spec.
    ///
    /// ```
    /// use fanout_domain::Domain;
    ///
    /// let line = Domain::create(10).unwrap();
    /// assert_eq!(line.volume(), 10);
    ///
    /// let grid = Domain::create([3, 3]).unwrap();
    /// assert_eq!(grid.dim(), 2);
    /// assert_eq!(grid.volume(), 9);
    /// ```
    pub fn create(bounds: impl Into<Bounds>) -> Result<Self, DomainError> {
        match bounds.into() {
            Bounds::Extent(n) => Self::from_extents(&[n]),
            Bounds::Extents(extents) => Self::from_extents(&extents),
            Bounds::Rect { lo, hi } => Self::new(lo, hi),
        }
    }

    /// Zero-based domain with one extent per axis.
    ///
    /// Returns `Err(DomainError::NegativeExtent)` for a negative extent.
    pub fn from_extents(extents: &[i64]) -> Result<Self, DomainError> {
        let lo = Point::zeros(extents.len());
        let mut hi = SmallVec::<[i64; 4]>::with_capacity(extents.len());
        for (axis, &e) in extents.iter().enumerate() {
            if e < 0 {
                return Err(DomainError::NegativeExtent {
                    axis,
                    lower: 0,
                    upper: e.saturating_sub(1),
                });
            }
            hi.push(e - 1);
        }
        Self::new(lo, Point::new(&hi))
    }

    /// Domain with explicit inclusive bounds.
    ///
    /// Returns an error if:
    /// - `lo` and `hi` differ in dimensionality
    /// - the dimensionality is outside `[1, MAX_DIM]`
    /// - some axis has `lo > hi + 1`
    /// - an extent or the volume overflows `usize`
    pub fn new(lo: Point, hi: Point) -> Result<Self, DomainError> {
        if lo.dim() != hi.dim() {
            return Err(DomainError::DimensionMismatch {
                lower: lo.dim(),
                upper: hi.dim(),
            });
        }
        let dim = lo.dim();
        if dim == 0 || dim > MAX_DIM {
            return Err(DomainError::UnsupportedDimension { dim, max: MAX_DIM });
        }

        let mut extents = SmallVec::<[usize; 4]>::with_capacity(dim);
        for axis in 0..dim {
            let (l, h) = (lo[axis], hi[axis]);
            // i128 so that `h + 1` and `h - l` cannot overflow.
            let extent = i128::from(h) - i128::from(l) + 1;
            if extent < 0 {
                return Err(DomainError::NegativeExtent {
                    axis,
                    lower: l,
                    upper: h,
                });
            }
            let extent = usize::try_from(extent).map_err(|_| DomainError::VolumeOverflow)?;
            extents.push(extent);
        }

        let volume = if extents.contains(&0) {
            0
        } else {
            let mut v: usize = 1;
            for e in &extents {
                v = v.checked_mul(*e).ok_or(DomainError::VolumeOverflow)?;
            }
            v
        };

        // strides[i] = product(extents[j] for j > i); last axis is fastest.
        let mut strides = SmallVec::<[usize; 4]>::from_elem(1, dim);
        for i in (0..dim - 1).rev() {
            strides[i] = strides[i + 1].saturating_mul(extents[i + 1]);
        }

        Ok(Self {
            lo,
            hi,
            extents,
            strides,
            volume,
        })
    }

    /// Number of axes.
    pub fn dim(&self) -> usize {
        self.lo.dim()
    }

    /// Lower corner (inclusive).
    pub fn lo(&self) -> &Point {
        &self.lo
    }

    /// Upper corner (inclusive).
    pub fn hi(&self) -> &Point {
        &self.hi
    }

    /// Per-axis extents.
    pub fn extents(&self) -> &[usize] {
        &self.extents
    }

    /// Total number of points.
    pub fn volume(&self) -> usize {
        self.volume
    }

    /// `true` if the domain has no points.
    pub fn is_empty(&self) -> bool {
        self.volume == 0
    }

    /// All points in row-major order.
    ///
    /// Each call returns a fresh iterator starting at the first point;
    /// iterators never share state.
    pub fn iter(&self) -> DomainIter<'_> {
        DomainIter::new(self)
    }

    /// `true` if `point` lies within the bounds.
    pub fn contains(&self, point: &Point) -> bool {
        point.dim() == self.dim()
            && (0..self.dim()).all(|axis| self.lo[axis] <= point[axis] && point[axis] <= self.hi[axis])
    }

    /// Position of `point` in row-major order.
    ///
    /// Returns the index such that `iter().nth(index) == Some(point)`, or
    /// `None` if the point is outside the domain.
    pub fn rank_of(&self, point: &Point) -> Option<usize> {
        if !self.contains(point) {
            return None;
        }
        let mut rank = 0usize;
        for axis in 0..self.dim() {
            let offset = usize::try_from(i128::from(point[axis]) - i128::from(self.lo[axis])).ok()?;
            rank += offset * self.strides[axis];
        }
        Some(rank)
    }

    /// The point at position `rank` in row-major order.
    ///
    /// Inverse of [`rank_of`](Self::rank_of). Returns `None` if
    /// `rank >= volume()`.
    pub fn point_at(&self, rank: usize) -> Option<Point> {
        if rank >= self.volume {
            return None;
        }
        Some(
            (0..self.dim())
                .map(|axis| {
                    let offset = (rank / self.strides[axis]) % self.extents[axis];
                    // lo + offset <= hi, so the narrowing is lossless.
                    (i128::from(self.lo[axis]) + offset as i128) as i64
                })
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Domain {
    type Item = Point;
    type IntoIter = DomainIter<'a>;

    fn into_iter(self) -> DomainIter<'a> {
        self.iter()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..={}]", self.lo, self.hi)
    }
}
