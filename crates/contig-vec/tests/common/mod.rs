// Common test utilities for integration tests
//
// Allocation strategies with observable side effects and element types
// that fail or count on demand, shared by all integration tests.

#![allow(dead_code)]

use contig_vec::{AllocStrategy, Error, Result, StdAlloc};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::ptr::NonNull;
use std::rc::Rc;

/// Counters shared by every clone of a [`CountingAlloc`].
#[derive(Debug, Default)]
pub struct AllocStats {
    pub allocations: Cell<usize>,
    pub deallocations: Cell<usize>,
    pub slots_allocated: Cell<usize>,
    pub constructs: Cell<usize>,
    pub destroys: Cell<usize>,
}

impl AllocStats {
    /// Blocks handed out and not yet returned.
    pub fn live_blocks(&self) -> usize {
        self.allocations.get() - self.deallocations.get()
    }

    /// Elements constructed and not yet destroyed.
    pub fn live_values(&self) -> usize {
        self.constructs.get() - self.destroys.get()
    }
}

fn bump(cell: &Cell<usize>) {
    cell.set(cell.get() + 1);
}

/// Forwards to [`StdAlloc`] and counts every call.
#[derive(Debug, Clone, Default)]
pub struct CountingAlloc {
    pub stats: Rc<AllocStats>,
}

impl CountingAlloc {
    pub fn new() -> Self {
        Self::default()
    }
}

unsafe impl<T> AllocStrategy<T> for CountingAlloc {
    fn allocate(&self, slots: usize) -> Result<NonNull<T>> {
        let block = AllocStrategy::<T>::allocate(&StdAlloc, slots)?;
        bump(&self.stats.allocations);
        self.stats
            .slots_allocated
            .set(self.stats.slots_allocated.get() + slots);
        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<T>, slots: usize) {
        bump(&self.stats.deallocations);
        unsafe { AllocStrategy::<T>::deallocate(&StdAlloc, block, slots) };
    }

    unsafe fn construct<F>(&self, slot: NonNull<T>, init: F)
    where
        F: FnOnce() -> T,
    {
        let value = init();
        unsafe { slot.as_ptr().write(value) };
        bump(&self.stats.constructs);
    }

    unsafe fn destroy(&self, slot: NonNull<T>) {
        bump(&self.stats.destroys);
        unsafe { std::ptr::drop_in_place(slot.as_ptr()) };
    }
}

/// Succeeds for the first `budget` allocations, then refuses every
/// request.
#[derive(Debug, Clone)]
pub struct FailingAlloc {
    remaining: Rc<Cell<usize>>,
    pub stats: Rc<AllocStats>,
}

impl FailingAlloc {
    pub fn with_budget(budget: usize) -> Self {
        FailingAlloc {
            remaining: Rc::new(Cell::new(budget)),
            stats: Rc::default(),
        }
    }

    /// Grants `n` more successful allocations.
    pub fn refill(&self, n: usize) {
        self.remaining.set(self.remaining.get() + n);
    }
}

unsafe impl<T> AllocStrategy<T> for FailingAlloc {
    fn allocate(&self, slots: usize) -> Result<NonNull<T>> {
        let Some(left) = self.remaining.get().checked_sub(1) else {
            return Err(Error::AllocationFailed {
                slots,
                bytes: slots * std::mem::size_of::<T>(),
            });
        };
        self.remaining.set(left);
        bump(&self.stats.allocations);
        AllocStrategy::<T>::allocate(&StdAlloc, slots)
    }

    unsafe fn deallocate(&self, block: NonNull<T>, slots: usize) {
        bump(&self.stats.deallocations);
        unsafe { AllocStrategy::<T>::deallocate(&StdAlloc, block, slots) };
    }
}

/// Records which strategy instance owns each block.
#[derive(Debug, Default)]
pub struct Ledger {
    owners: RefCell<HashMap<usize, u32>>,
    /// Blocks released by a strategy that did not allocate them.
    pub foreign_releases: Cell<usize>,
}

impl Ledger {
    pub fn live_blocks(&self) -> usize {
        self.owners.borrow().len()
    }

    pub fn owner_of<T>(&self, block: *const T) -> Option<u32> {
        self.owners.borrow().get(&(block as usize)).copied()
    }
}

/// A stateful strategy identified by `id`.
///
/// It propagates on copy assignment, does not propagate on move
/// assignment, and is interchangeable only with instances of the same id.
#[derive(Debug, Clone)]
pub struct TaggedAlloc {
    pub id: u32,
    pub ledger: Rc<Ledger>,
}

impl TaggedAlloc {
    pub fn new(id: u32, ledger: &Rc<Ledger>) -> Self {
        TaggedAlloc {
            id,
            ledger: Rc::clone(ledger),
        }
    }
}

unsafe impl<T> AllocStrategy<T> for TaggedAlloc {
    const PROPAGATE_ON_COPY_ASSIGN: bool = true;
    const PROPAGATE_ON_MOVE_ASSIGN: bool = false;

    fn allocate(&self, slots: usize) -> Result<NonNull<T>> {
        // Zero-sized requests would all share the dangling address.
        assert!(std::mem::size_of::<T>() != 0 && slots != 0);
        let block = AllocStrategy::<T>::allocate(&StdAlloc, slots)?;
        self.ledger
            .owners
            .borrow_mut()
            .insert(block.as_ptr() as usize, self.id);
        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<T>, slots: usize) {
        let owner = self
            .ledger
            .owners
            .borrow_mut()
            .remove(&(block.as_ptr() as usize));
        if owner != Some(self.id) {
            bump(&self.ledger.foreign_releases);
        }
        unsafe { AllocStrategy::<T>::deallocate(&StdAlloc, block, slots) };
    }

    fn is_interchangeable(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// A strategy that cannot be cloned. It tracks its outstanding blocks.
#[derive(Debug, Default)]
pub struct SoleAlloc {
    pub live_blocks: Cell<usize>,
}

unsafe impl<T> AllocStrategy<T> for SoleAlloc {
    fn allocate(&self, slots: usize) -> Result<NonNull<T>> {
        let block = AllocStrategy::<T>::allocate(&StdAlloc, slots)?;
        bump(&self.live_blocks);
        Ok(block)
    }

    unsafe fn deallocate(&self, block: NonNull<T>, slots: usize) {
        self.live_blocks.set(self.live_blocks.get() - 1);
        unsafe { AllocStrategy::<T>::deallocate(&StdAlloc, block, slots) };
    }
}

/// An element whose `clone` panics once a shared budget runs out.
#[derive(Debug)]
pub struct PanicOnClone {
    pub value: u32,
    clones_left: Rc<Cell<usize>>,
}

impl PanicOnClone {
    pub fn new(value: u32, clones_left: &Rc<Cell<usize>>) -> Self {
        PanicOnClone {
            value,
            clones_left: Rc::clone(clones_left),
        }
    }
}

impl Clone for PanicOnClone {
    fn clone(&self) -> Self {
        let left = self.clones_left.get();
        if left == 0 {
            panic!("clone budget exhausted");
        }
        self.clones_left.set(left - 1);
        PanicOnClone {
            value: self.value,
            clones_left: Rc::clone(&self.clones_left),
        }
    }
}

impl PartialEq for PanicOnClone {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

/// An element that counts how many instances have been dropped.
#[derive(Debug, Clone)]
pub struct DropCounter {
    pub id: usize,
    drops: Rc<Cell<usize>>,
}

impl DropCounter {
    pub fn new(id: usize, drops: &Rc<Cell<usize>>) -> Self {
        DropCounter {
            id,
            drops: Rc::clone(drops),
        }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

/// Builds `0..n` as a vector bound to `alloc`.
pub fn filled_in<A>(n: u32, alloc: A) -> contig_vec::Vector<u32, A>
where
    A: AllocStrategy<u32> + Clone,
{
    let mut v = contig_vec::Vector::new_in(alloc);
    for i in 0..n {
        v.push_back(i).expect("Failed to fill test vector");
    }
    v
}
