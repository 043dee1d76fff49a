use fanout_core::{DomainError, Point, MAX_DIM};
use fanout_domain::{Bounds, Domain};

#[test]
fn every_bounds_form_builds_the_same_domain() {
    let from_array = Domain::create([2, 3]).unwrap();
    let from_vec = Domain::create(vec![2, 3]).unwrap();
    let from_slice = Domain::create(&[2i64, 3][..]).unwrap();
    let from_rect = Domain::create(Bounds::Rect {
        lo: Point::from([0, 0]),
        hi: Point::from([1, 2]),
    })
    .unwrap();
    assert_eq!(from_array, from_vec);
    assert_eq!(from_array, from_slice);
    assert_eq!(from_array, from_rect);
}

#[test]
fn scalar_sugar_matches_one_element_extents() {
    assert_eq!(Domain::create(7).unwrap(), Domain::create([7]).unwrap());
}

#[test]
fn three_by_three_matches_nested_loops() {
    let d = Domain::create([3, 3]).unwrap();
    let mut expected = Vec::new();
    for i in 0..3 {
        for j in 0..3 {
            expected.push(Point::from([i, j]));
        }
    }
    assert_eq!(d.iter().collect::<Vec<_>>(), expected);
}

#[test]
fn degenerate_axis_anywhere_gives_empty_domain() {
    for extents in [[0, 3, 3], [3, 0, 3], [3, 3, 0]] {
        let d = Domain::create(extents).unwrap();
        assert_eq!(d.volume(), 0, "{extents:?}");
        assert_eq!(d.iter().count(), 0, "{extents:?}");
    }
}

#[test]
fn max_dim_is_accepted_and_enumerated() {
    let d = Domain::from_extents(&[2; MAX_DIM]).unwrap();
    assert_eq!(d.volume(), 1 << MAX_DIM);
    let last = d.iter().last().unwrap();
    assert_eq!(last, Point::new(&[1; MAX_DIM]));
}

#[test]
fn construction_errors_do_not_affect_other_domains() {
    assert!(matches!(
        Domain::create([-3]),
        Err(DomainError::NegativeExtent { .. })
    ));
    assert_eq!(Domain::create(3).unwrap().volume(), 3);
}
