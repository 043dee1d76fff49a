//! Row-major odometer iteration over a [`Domain`].

use fanout_core::Point;
use smallvec::SmallVec;
use std::iter::FusedIterator;

use crate::domain::Domain;

/// Lazy row-major iterator over the points of a [`Domain`].
///
/// Implemented as an odometer: the cursor holds the next point to yield,
/// and advancing increments the last axis, carrying into earlier axes
/// when an axis wraps from `hi` back to `lo`.
#[derive(Clone, Debug)]
pub struct DomainIter<'a> {
    domain: &'a Domain,
    cursor: SmallVec<[i64; 4]>,
    next_rank: usize,
}

impl<'a> DomainIter<'a> {
    pub(crate) fn new(domain: &'a Domain) -> Self {
        Self {
            domain,
            cursor: SmallVec::from_slice(domain.lo().coords()),
            next_rank: 0,
        }
    }

    /// Advance the odometer by one position (rightmost axis fastest).
    ///
    /// Compares before incrementing so that `hi == i64::MAX` never overflows.
    fn advance(&mut self) {
        let lo = self.domain.lo();
        let hi = self.domain.hi();
        for axis in (0..self.cursor.len()).rev() {
            if self.cursor[axis] < hi[axis] {
                self.cursor[axis] += 1;
                return;
            }
            self.cursor[axis] = lo[axis];
        }
    }

    fn remaining(&self) -> usize {
        self.domain.volume() - self.next_rank
    }
}

impl Iterator for DomainIter<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.remaining() == 0 {
            return None;
        }
        let point = Point::new(&self.cursor);
        self.next_rank += 1;
        if self.remaining() > 0 {
            self.advance();
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }

    /// Skips directly to the target rank instead of stepping the odometer.
    fn nth(&mut self, n: usize) -> Option<Point> {
        if n >= self.remaining() {
            self.next_rank = self.domain.volume();
            return None;
        }
        self.next_rank += n;
        let target = self.domain.point_at(self.next_rank)?;
        self.cursor = SmallVec::from_slice(target.coords());
        self.next()
    }
}

impl ExactSizeIterator for DomainIter<'_> {}

impl FusedIterator for DomainIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_dimensional_order() {
        let d = Domain::create(5).unwrap();
        let pts: Vec<i64> = d.iter().map(|p| p[0]).collect();
        assert_eq!(pts, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn two_dimensional_row_major() {
        let d = Domain::create([3, 3]).unwrap();
        let pts: Vec<Point> = d.iter().collect();
        let expected: Vec<Point> = vec![
            [0, 0], [0, 1], [0, 2],
            [1, 0], [1, 1], [1, 2],
            [2, 0], [2, 1], [2, 2],
        ]
        .into_iter()
        .map(Point::from)
        .collect();
        assert_eq!(pts, expected);
    }

    #[test]
    fn last_axis_varies_fastest_in_3d() {
        let d = Domain::create([2, 1, 3]).unwrap();
        let pts: Vec<Point> = d.iter().collect();
        assert_eq!(pts[0], Point::from([0, 0, 0]));
        assert_eq!(pts[1], Point::from([0, 0, 1]));
        assert_eq!(pts[3], Point::from([1, 0, 0]));
        assert_eq!(pts.len(), 6);
    }

    #[test]
    fn independent_iterators_do_not_share_state() {
        let d = Domain::create([2, 2]).unwrap();
        let mut a = d.iter();
        a.next();
        a.next();
        let b = d.iter();
        assert_eq!(b.len(), 4);
        assert_eq!(a.len(), 2);
        assert_eq!(d.iter().next(), Some(Point::from([0, 0])));
    }

    #[test]
    fn fused_after_exhaustion() {
        let d = Domain::create(2).unwrap();
        let mut it = d.iter();
        assert!(it.next().is_some());
        assert!(it.next().is_some());
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn nth_then_next_continues_in_order() {
        let d = Domain::create([3, 4]).unwrap();
        let mut it = d.iter();
        assert_eq!(it.nth(5), Some(Point::from([1, 1])));
        assert_eq!(it.next(), Some(Point::from([1, 2])));
        assert_eq!(it.nth(100), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn for_loop_over_reference() {
        let d = Domain::create(3).unwrap();
        let mut sum = 0;
        for p in &d {
            sum += p[0];
        }
        assert_eq!(sum, 3);
    }
}
