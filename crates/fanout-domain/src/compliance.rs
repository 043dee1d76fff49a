//! Domain enumeration compliance helpers.
//!
//! These functions verify the enumeration contract every domain must
//! satisfy. Reused across the domain test modules.

use crate::domain::Domain;
use fanout_core::Point;
use indexmap::IndexSet;

/// Assert that two calls to `iter` return the same sequence.
pub fn assert_iteration_deterministic(domain: &Domain) {
    let a: Vec<Point> = domain.iter().collect();
    let b: Vec<Point> = domain.iter().collect();
    assert_eq!(a, b, "iteration over {domain} is non-deterministic");
}

/// Assert that `iter` yields exactly `volume` unique points, all contained.
pub fn assert_iteration_complete(domain: &Domain) {
    let points: Vec<Point> = domain.iter().collect();
    assert_eq!(
        points.len(),
        domain.volume(),
        "iteration length ({}) != volume ({})",
        points.len(),
        domain.volume()
    );
    let unique: IndexSet<_> = points.iter().collect();
    assert_eq!(unique.len(), domain.volume(), "iteration has duplicates");
    for p in &points {
        assert!(domain.contains(p), "{p} yielded but not contained in {domain}");
    }
}

/// Assert that consecutive points are strictly increasing (row-major).
pub fn assert_row_major(domain: &Domain) {
    let points: Vec<Point> = domain.iter().collect();
    for w in points.windows(2) {
        assert!(w[0] < w[1], "{} yielded before {}", w[0], w[1]);
    }
}

/// Assert that `rank_of` and `point_at` agree with iteration position.
pub fn assert_rank_roundtrip(domain: &Domain) {
    for (i, p) in domain.iter().enumerate() {
        assert_eq!(domain.rank_of(&p), Some(i), "rank_of({p}) != {i}");
        assert_eq!(domain.point_at(i).as_ref(), Some(&p), "point_at({i}) != {p}");
    }
}

/// Run all 4 compliance checks on a domain.
pub fn run_full_compliance(domain: &Domain) {
    assert_iteration_deterministic(domain);
    assert_iteration_complete(domain);
    assert_row_major(domain);
    assert_rank_roundtrip(domain);
}
