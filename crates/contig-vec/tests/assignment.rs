// Copy and Move Integration Tests
//
// These tests check which strategy ends up owning which block after
// copy construction, move construction and both kinds of assignment.

mod common;

use common::{CountingAlloc, Ledger, TaggedAlloc, filled_in};
use contig_vec::Vector;
use std::rc::Rc;

/// Test that a copy and its original never share storage
#[test]
fn test_copy_then_mutate_copy() {
    let a = Vector::from([10, 20, 30]);
    let mut b = a.clone();
    b.push_back(40).unwrap();

    assert_eq!(a, [10, 20, 30]);
    assert_eq!(b, [10, 20, 30, 40]);
    assert_eq!(a.size(), 3);
    assert_eq!(a.capacity(), 3);
    assert_ne!(a.data(), b.data());
}

/// Test that copy construction keeps capacity and strategy
#[test]
fn test_copy_construction_with_stateful_strategy() {
    let ledger = Rc::new(Ledger::default());
    let a = filled_in(5, TaggedAlloc::new(3, &ledger));
    let b = a.try_clone().unwrap();

    assert_eq!(b, a);
    assert_eq!(b.capacity(), a.capacity());
    assert_eq!(b.get_allocator().id, 3);
    assert_eq!(ledger.owner_of(b.data()), Some(3));
    assert_eq!(ledger.live_blocks(), 2);
}

/// Test that copy assignment hands over a propagating strategy
#[test]
fn test_copy_assign_propagates_strategy() {
    let ledger = Rc::new(Ledger::default());
    let mut dst = filled_in(8, TaggedAlloc::new(1, &ledger));
    let src = filled_in(2, TaggedAlloc::new(2, &ledger));

    // Capacity would suffice, but propagation forces a fresh block.
    dst.assign_from(&src).unwrap();

    assert_eq!(dst, [0, 1]);
    assert_eq!(dst.get_allocator().id, 2);
    assert_eq!(ledger.owner_of(dst.data()), Some(2));
    assert_eq!(ledger.live_blocks(), 2);

    drop(dst);
    drop(src);
    assert_eq!(ledger.live_blocks(), 0);
    assert_eq!(ledger.foreign_releases.get(), 0);
}

/// Test that copy assignment reuses storage for a non-propagating strategy
#[test]
fn test_copy_assign_in_place_keeps_strategy() {
    let alloc = CountingAlloc::new();
    let stats = Rc::clone(&alloc.stats);
    let mut dst = filled_in(7, alloc.clone());
    let src = filled_in(3, alloc);
    let allocations = stats.allocations.get();
    let block = dst.data();

    dst.clone_from(&src);

    assert_eq!(dst, [0, 1, 2]);
    assert_eq!(dst.data(), block);
    assert_eq!(dst.capacity(), 8);
    assert_eq!(stats.allocations.get(), allocations);
}

/// Test that move construction empties the source
#[test]
fn test_take_transfers_block() {
    let ledger = Rc::new(Ledger::default());
    let mut src = filled_in(4, TaggedAlloc::new(9, &ledger));
    let block = src.data();

    let dst = Vector::take(&mut src);

    assert_eq!(dst, [0, 1, 2, 3]);
    assert_eq!(dst.data(), block);
    assert_eq!(ledger.owner_of(dst.data()), Some(9));
    assert_eq!((src.size(), src.capacity()), (0, 0));
    assert_eq!(src.get_allocator().id, 9);
    assert_eq!(ledger.live_blocks(), 1);
}

/// Test that move assignment adopts the block of an interchangeable strategy
#[test]
fn test_move_assign_adopts_interchangeable_block() {
    let ledger = Rc::new(Ledger::default());
    let mut dst = filled_in(1, TaggedAlloc::new(4, &ledger));
    let mut src = filled_in(6, TaggedAlloc::new(4, &ledger));
    let block = src.data();

    dst.assign_move(&mut src).unwrap();

    assert_eq!(dst, [0, 1, 2, 3, 4, 5]);
    assert_eq!(dst.data(), block);
    assert_eq!((src.size(), src.capacity()), (0, 0));
    assert_eq!(ledger.live_blocks(), 1);
    assert_eq!(ledger.foreign_releases.get(), 0);
}

/// Test that move assignment relocates across foreign strategies
#[test]
fn test_move_assign_relocates_between_foreign_strategies() {
    let ledger = Rc::new(Ledger::default());
    let mut dst = filled_in(1, TaggedAlloc::new(1, &ledger));
    let mut src = filled_in(6, TaggedAlloc::new(2, &ledger));
    let src_block = src.data();

    dst.assign_move(&mut src).unwrap();

    assert_eq!(dst, [0, 1, 2, 3, 4, 5]);
    assert_ne!(dst.data(), src_block);
    assert_eq!(dst.get_allocator().id, 1);
    assert_eq!(ledger.owner_of(dst.data()), Some(1));
    assert_eq!((src.size(), src.capacity()), (0, 0));
    assert_eq!(src.get_allocator().id, 2);

    // Only the destination's block is still alive, and every release went
    // through the strategy that allocated the block.
    assert_eq!(ledger.live_blocks(), 1);
    assert_eq!(ledger.foreign_releases.get(), 0);
}

/// Test that relocation reuses the destination's block when it is large enough
#[test]
fn test_move_assign_relocates_into_existing_block() {
    let ledger = Rc::new(Ledger::default());
    let mut dst = filled_in(7, TaggedAlloc::new(1, &ledger));
    let mut src = filled_in(3, TaggedAlloc::new(2, &ledger));
    let dst_block = dst.data();

    dst.assign_move(&mut src).unwrap();

    assert_eq!(dst, [0, 1, 2]);
    assert_eq!(dst.data(), dst_block);
    assert_eq!(dst.capacity(), 8);
    assert_eq!(ledger.live_blocks(), 1);
    assert_eq!(ledger.foreign_releases.get(), 0);
}

/// Test move assignment with the default, propagating strategy
#[test]
fn test_move_assign_default_strategy() {
    let mut dst = Vector::from([String::from("old")]);
    let mut src = Vector::from([String::from("new"), String::from("er")]);

    dst.assign_move(&mut src).unwrap();

    assert_eq!(dst, [String::from("new"), String::from("er")]);
    assert!(src.is_empty());
    src.push_back(String::from("reused")).unwrap();
    assert_eq!(src.len(), 1);
}
