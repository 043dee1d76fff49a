//! Per-point launch arguments.

use indexmap::IndexMap;

use fanout_core::Point;

/// Optional per-point arguments for an [`IndexLauncher`](crate::IndexLauncher).
///
/// Points are matched by coordinate equality. Points of the launch domain
/// without an entry see `None` from
/// [`TaskContext::point_arg`](crate::TaskContext::point_arg); entries for
/// points outside the domain are ignored.
#[derive(Clone, Debug)]
pub struct ArgumentMap<P> {
    entries: IndexMap<Point, P>,
}

impl<P> Default for ArgumentMap<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ArgumentMap<P> {
    /// An empty map.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Set the argument for `point`, returning the previous one.
    pub fn set(&mut self, point: impl Into<Point>, value: P) -> Option<P> {
        self.entries.insert(point.into(), value)
    }

    /// The argument for `point`, if any.
    pub fn get(&self, point: &Point) -> Option<&P> {
        self.entries.get(point)
    }

    /// Number of points with an argument.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no point has an argument.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Point, &P)> {
        self.entries.iter()
    }
}

impl<P> FromIterator<(Point, P)> for ArgumentMap<P> {
    fn from_iter<I: IntoIterator<Item = (Point, P)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<P> Extend<(Point, P)> for ArgumentMap<P> {
    fn extend<I: IntoIterator<Item = (Point, P)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_coordinates() {
        let mut m = ArgumentMap::new();
        assert!(m.is_empty());
        m.set([1, 2], "a");
        assert_eq!(m.get(&Point::new(&[1, 2])), Some(&"a"));
        assert_eq!(m.get(&Point::from([2, 1])), None);
        assert_eq!(m.set([1, 2], "b"), Some("a"));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn collects_and_extends_in_order() {
        let mut m: ArgumentMap<i32> = (0..3).map(|i| (Point::from(i), i as i32 * 10)).collect();
        m.extend([(Point::from(9), 90)]);
        let keys: Vec<i64> = m.iter().map(|(p, _)| p[0]).collect();
        assert_eq!(keys, vec![0, 1, 2, 9]);
    }
}
