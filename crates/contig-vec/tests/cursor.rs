// Cursor Integration Tests
//
// These tests walk vectors with forward, reverse and mutating cursors and
// check the movement capabilities used by `advance`.

use contig_vec::{Iter, RandomAccess, Reverse, Step, Vector, advance};

/// Test a classic begin/end loop
#[test]
fn test_forward_walk() {
    let v = Vector::from([3, 1, 4, 1, 5]);
    let mut seen = Vec::new();

    let mut it = v.cbegin();
    while it != v.cend() {
        seen.push(*it.get().unwrap());
        it.step_forward();
    }

    assert_eq!(seen, [3, 1, 4, 1, 5]);
}

/// Test a reverse walk with the reversed cursor pair
#[test]
fn test_reverse_walk() {
    let v = Vector::from(["a", "b", "c"]);
    let mut seen = Vec::new();

    let mut it = v.rcbegin();
    while it != v.rcend() {
        seen.push(*it.get().unwrap());
        it.step_forward();
    }

    assert_eq!(seen, ["c", "b", "a"]);
}

/// Test that reverse cursors on an empty vector are already at the end
#[test]
fn test_empty_ranges() {
    let v: Vector<u8> = Vector::new();

    assert_eq!(v.begin(), v.end());
    assert_eq!(v.rbegin(), v.rend());
    assert_eq!(v.begin().get(), None);
    assert_eq!(v.rbegin().get(), None);
    assert_eq!(v.iter().next(), None);
}

/// Test advance on forward and reversed cursors
#[test]
fn test_advance_both_directions() {
    let v = Vector::from([0, 10, 20, 30, 40, 50]);

    let mut it = v.begin();
    advance(&mut it, 5);
    assert_eq!(it.get(), Some(&50));
    advance(&mut it, -5);
    assert_eq!(it.get(), Some(&0));

    let mut rit = v.rbegin();
    advance(&mut rit, 2);
    assert_eq!(rit.get(), Some(&30));
    advance(&mut rit, -1);
    assert_eq!(rit.get(), Some(&40));
}

/// Test distances and offsets across both adapters
#[test]
fn test_random_access_arithmetic() {
    let v = Vector::from_elem(12, 'x').unwrap();

    assert_eq!(v.begin().distance_to(&v.end()), 12);
    assert_eq!(v.rbegin().distance_to(&v.rend()), 12);

    let mut it = v.begin();
    it.offset_by(12);
    assert_eq!(it, v.end());

    let mut rit = Reverse::new(v.begin());
    rit.offset_by(-12);
    assert_eq!(rit, v.rbegin());
}

/// Test stepping out of range and back again
#[test]
fn test_leaving_and_reentering_range() {
    let v = Vector::from([1, 2, 3]);

    let mut it = v.begin();
    it.step_backward();
    it.step_backward();
    assert!(!it.is_dereferenceable());
    assert_eq!(it.index(), -2);

    it += 4;
    assert_eq!(it.get(), Some(&3));

    it += 1;
    assert_eq!(it, v.end());
    assert_eq!(it.get(), None);
}

/// Test writing through a mutating cursor and reading it back
#[test]
fn test_mut_cursor_into_mut() {
    let mut v = Vector::from([1, 2, 3]);
    {
        let it = v.begin_mut() + 1;
        if let Some(slot) = it.into_mut() {
            *slot = 20;
        }
    }

    let mut last = v.end_mut();
    last -= 1;
    *last.get_mut().unwrap() = 30;
    assert_eq!(last.as_const().get(), Some(&30));

    assert_eq!(v, [1, 20, 30]);
}

/// Test an iterator over a cursor sub-range
#[test]
fn test_iter_over_subrange() {
    let v = Vector::from([1, 2, 3, 4, 5, 6]);
    let sub = Iter::new(v.begin() + 1, v.end() - 2);

    assert_eq!(sub.len(), 3);
    assert_eq!(sub.clone().copied().collect::<Vec<_>>(), [2, 3, 4]);
    assert_eq!(sub.rev().copied().collect::<Vec<_>>(), [4, 3, 2]);
}

/// Test that the borrowed iterator agrees with slice iteration
#[test]
fn test_iter_matches_slice() {
    let v: Vector<u32> = (0..50).map(|i| i * 3).collect();

    assert!(v.iter().eq(v.as_slice().iter()));
    assert!(v.iter().rev().eq(v.as_slice().iter().rev()));
    assert_eq!(v.iter().size_hint(), (50, Some(50)));
}

/// Test a reversed mutating walk over the whole vector
#[test]
fn test_reverse_mut_walk() {
    let mut v = Vector::from([1, 2, 3, 4]);
    let end = v.rend_mut().base().index();
    assert_eq!(end, 0);

    let mut it = v.rbegin_mut();
    let mut n = 0;
    while it.base().index() != end {
        n += 1;
        *it.get_mut().unwrap() *= n;
        it.step_forward();
    }

    assert_eq!(v, [4, 6, 6, 4]);
}
