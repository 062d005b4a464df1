//! Raw storage ownership.
//!
//! [`RawStorage`] owns exactly one block obtained from an
//! [`AllocStrategy`] together with the three cursors that describe it:
//!
//! ```text
//! start                 end                  space_end
//!   |  live, constructed  |  allocated, raw     |
//!   [=====================|---------------------]
//!   0                    len                   cap
//! ```
//!
//! The owner is responsible for the *memory* lifetime only. Dropping it
//! releases the block but never runs element destructors; destroying the
//! values in `[start, end)` is the job of the layer above it
//! ([`Vector`](crate::Vector), [`IntoIter`](crate::IntoIter) or a
//! [`ConstructGuard`]).
//!
//! Growth is transactional. [`RawStorage::reallocate`] and
//! [`RawStorage::reallocate_inserting`] draw the fresh block from the
//! owner's own strategy, construct any new value in it first, and only
//! then relocate the live values and release the old block. If the new
//! value's constructor unwinds, the fresh block is released and the owner
//! is untouched. Building a whole second owner and exchanging the two with
//! [`RawStorage::swap`] gives the same guarantee when a copy of the
//! strategy is at hand.

use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ptr::{self, NonNull};

use crate::alloc::AllocStrategy;
use crate::error::Result;

/// Exclusive owner of one block of `T` slots.
pub struct RawStorage<T, A: AllocStrategy<T>> {
    alloc: A,
    /// First slot of the block.
    start: NonNull<T>,
    /// Number of constructed slots; `start + len` is the `end` cursor.
    len: usize,
    /// Number of allocated slots; `start + cap` is the `space_end` cursor.
    cap: usize,
    _owns: PhantomData<T>,
}

// SAFETY: `RawStorage` owns its block exclusively, like `Box<[T]>`.
unsafe impl<T: Send, A: AllocStrategy<T> + Send> Send for RawStorage<T, A> {}
unsafe impl<T: Sync, A: AllocStrategy<T> + Sync> Sync for RawStorage<T, A> {}

impl<T, A: AllocStrategy<T>> RawStorage<T, A> {
    /// Creates an owner with no block. Never calls the strategy.
    pub const fn empty(alloc: A) -> Self {
        RawStorage {
            alloc,
            start: NonNull::dangling(),
            len: 0,
            cap: 0,
            _owns: PhantomData,
        }
    }

    /// Creates an owner with a fresh block of `slots` slots, none of them
    /// constructed.
    ///
    /// A zero-slot request produces an [`empty`](Self::empty) owner without
    /// consulting the strategy.
    ///
    /// # Errors
    ///
    /// Propagates the strategy's allocation error unchanged.
    pub fn with_capacity(alloc: A, slots: usize) -> Result<Self> {
        if slots == 0 {
            return Ok(Self::empty(alloc));
        }

        let start = alloc.allocate(slots)?;

        Ok(RawStorage {
            alloc,
            start,
            len: 0,
            cap: slots,
            _owns: PhantomData,
        })
    }

    /// Exchanges every field of `a` and `b`: strategy, block and cursors.
    ///
    /// Constant time, no element is touched.
    #[inline]
    pub fn swap(a: &mut Self, b: &mut Self) {
        mem::swap(a, b);
    }

    /// Returns the strategy bound to this block.
    #[inline]
    pub fn alloc(&self) -> &A {
        &self.alloc
    }

    /// Returns the strategy mutably.
    ///
    /// Callers may only replace it with an interchangeable instance.
    #[inline]
    pub(crate) fn alloc_mut(&mut self) -> &mut A {
        &mut self.alloc
    }

    /// The `start` cursor.
    #[inline]
    pub fn start(&self) -> NonNull<T> {
        self.start
    }

    /// The `end` cursor: one past the last constructed slot.
    #[inline]
    pub fn end(&self) -> NonNull<T> {
        // SAFETY: `len <= cap`, so the result stays inside the block (or
        // one past it).
        unsafe { self.start.add(self.len) }
    }

    /// The `space_end` cursor: one past the last allocated slot.
    #[inline]
    pub fn space_end(&self) -> NonNull<T> {
        // SAFETY: one past the end of the block.
        unsafe { self.start.add(self.cap) }
    }

    /// Number of constructed slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is constructed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Moves the `end` cursor.
    ///
    /// # Safety
    ///
    /// `len <= capacity()` and exactly the slots `[0, len)` must hold live
    /// values afterwards.
    #[inline]
    pub unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(
            len <= self.cap,
            "len {len} exceeds capacity {}",
            self.cap
        );
        self.len = len;
    }

    /// Pointer to slot `index`.
    ///
    /// # Safety
    ///
    /// `index <= capacity()`.
    #[inline]
    pub unsafe fn slot(&self, index: usize) -> NonNull<T> {
        debug_assert!(index <= self.cap);
        // SAFETY: in bounds of the block per the caller's contract.
        unsafe { self.start.add(index) }
    }

    /// Destroys the values in slots `[from, to)` through the strategy.
    ///
    /// The `end` cursor is not moved.
    ///
    /// # Safety
    ///
    /// Every slot in the range must hold a live value that is not used
    /// afterwards.
    pub unsafe fn destroy_slots(&self, from: usize, to: usize) {
        debug_assert!(from <= to && to <= self.cap);
        for index in from..to {
            // SAFETY: per the caller's contract.
            unsafe { self.alloc.destroy(self.slot(index)) };
        }
    }

    /// Relocates the live prefix `[0, len)` into `dst` starting at slot
    /// `at`, leaving this owner with `len == 0`.
    ///
    /// # Safety
    ///
    /// `dst` must have room for `len` slots starting at `at`, and those
    /// slots must be raw.
    pub unsafe fn relocate_into(&mut self, dst: &mut Self, at: usize) {
        let count = self.len;
        debug_assert!(at + count <= dst.cap);
        // SAFETY: distinct blocks, both valid for `count` slots.
        unsafe {
            ptr::copy_nonoverlapping(
                self.start.as_ptr(),
                dst.slot(at).as_ptr(),
                count,
            );
        }
        self.len = 0;
    }

    /// Moves the live values into a fresh block of `slots` slots from
    /// this owner's strategy and releases the old block.
    ///
    /// A zero-slot request releases the block without asking the strategy
    /// for a new one.
    ///
    /// # Errors
    ///
    /// Propagates the strategy's allocation error; the owner is unchanged
    /// in that case.
    ///
    /// # Panics
    ///
    /// Panics if `slots < len()`.
    pub fn reallocate(&mut self, slots: usize) -> Result<()> {
        let len = self.len;
        self.regrow(slots, len, 0, |_, _| {})
    }

    /// Like [`reallocate`](Self::reallocate), but first constructs the
    /// value produced by `init` at slot `at` of the fresh block. The live
    /// values from `at` onwards follow it, so `len()` grows by one.
    ///
    /// If `init` panics the fresh block is released and the owner is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Propagates the strategy's allocation error; the owner is unchanged
    /// in that case.
    ///
    /// # Panics
    ///
    /// Panics if `at > len()` or `slots <= len()`.
    pub fn reallocate_inserting<F>(
        &mut self,
        slots: usize,
        at: usize,
        init: F,
    ) -> Result<()>
    where
        F: FnOnce() -> T,
    {
        self.regrow(slots, at, 1, |alloc, slot| {
            // SAFETY: `slot` is raw and inside the fresh block.
            unsafe { alloc.construct(slot, init) }
        })
    }

    /// Allocates `slots` slots, runs `fill` on slot `at` of the fresh
    /// block, then relocates `[0, at)` to the front and `[at, len)` to
    /// `at + gap` before adopting the fresh block.
    fn regrow<G>(
        &mut self,
        slots: usize,
        at: usize,
        gap: usize,
        fill: G,
    ) -> Result<()>
    where
        G: FnOnce(&A, NonNull<T>),
    {
        let len = self.len;
        assert!(at <= len, "gap at {at} is past len {len}");
        assert!(
            len + gap <= slots,
            "{slots} slots cannot hold {len} values and a gap of {gap}"
        );

        let fresh = FreshBlock::allocate(&self.alloc, slots)?;
        // SAFETY: `at < slots` whenever `gap > 0`; with no gap `fill` does
        // not touch the slot.
        fill(&self.alloc, unsafe { fresh.start.add(at) });
        let (start, cap) = fresh.adopt();

        // SAFETY: distinct blocks; the fresh one has room for `len + gap`
        // values and slots outside the gap are raw.
        unsafe {
            let src = self.start.as_ptr();
            ptr::copy_nonoverlapping(src, start.as_ptr(), at);
            ptr::copy_nonoverlapping(
                src.add(at),
                start.as_ptr().add(at + gap),
                len - at,
            );
        }

        let old_start = mem::replace(&mut self.start, start);
        let old_cap = mem::replace(&mut self.cap, cap);
        self.len = len + gap;

        if old_cap != 0 {
            // SAFETY: the old block came from `self.alloc` and its values
            // have been moved out.
            unsafe { self.alloc.deallocate(old_start, old_cap) };
        }
        Ok(())
    }

    /// The live slots as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[0, len)` is constructed and the block is aligned.
        unsafe { std::slice::from_raw_parts(self.start.as_ptr(), self.len) }
    }

    /// The live slots as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and `&mut self` guarantees uniqueness.
        unsafe {
            std::slice::from_raw_parts_mut(self.start.as_ptr(), self.len)
        }
    }
}

impl<T, A: AllocStrategy<T>> Drop for RawStorage<T, A> {
    fn drop(&mut self) {
        if self.cap == 0 {
            return;
        }

        // SAFETY: the block came from `self.alloc.allocate(self.cap)` and
        // is released exactly once, here.
        unsafe {
            self.alloc.deallocate(self.start, self.cap);
        }
    }
}

/// A block borrowed from an owner's strategy that is released on drop
/// unless [`adopt`](Self::adopt)ed.
struct FreshBlock<'a, T, A: AllocStrategy<T>> {
    alloc: &'a A,
    start: NonNull<T>,
    cap: usize,
}

impl<'a, T, A: AllocStrategy<T>> FreshBlock<'a, T, A> {
    fn allocate(alloc: &'a A, slots: usize) -> Result<Self> {
        let start = if slots == 0 {
            NonNull::dangling()
        } else {
            alloc.allocate(slots)?
        };
        Ok(FreshBlock {
            alloc,
            start,
            cap: slots,
        })
    }

    /// Disarms the guard and hands back the block.
    fn adopt(self) -> (NonNull<T>, usize) {
        let this = ManuallyDrop::new(self);
        (this.start, this.cap)
    }
}

impl<T, A: AllocStrategy<T>> Drop for FreshBlock<'_, T, A> {
    fn drop(&mut self) {
        if self.cap != 0 {
            // SAFETY: the block came from `self.alloc` and holds no value.
            unsafe { self.alloc.deallocate(self.start, self.cap) };
        }
    }
}

/// Rollback guard for filling a fresh block front to back.
///
/// Every successful [`construct_next`](Self::construct_next) advances the
/// owner's `end` cursor, so the guard always knows exactly how many slots
/// hold live values. If the guard is dropped before
/// [`finish`](Self::finish) (an element constructor panicked), those
/// values are destroyed and the block is released.
pub struct ConstructGuard<T, A: AllocStrategy<T>> {
    raw: RawStorage<T, A>,
}

impl<T, A: AllocStrategy<T>> ConstructGuard<T, A> {
    /// Takes over an owner with no constructed slots.
    pub fn new(raw: RawStorage<T, A>) -> Self {
        debug_assert!(raw.is_empty());
        ConstructGuard { raw }
    }

    /// Number of slots constructed so far.
    #[inline]
    pub fn constructed(&self) -> usize {
        self.raw.len
    }

    /// Constructs the next slot with the value produced by `init`.
    ///
    /// # Panics
    ///
    /// Panics if the block is already full, or if `init` panics (in which
    /// case the slot stays raw and the count is unchanged).
    pub fn construct_next<F>(&mut self, init: F)
    where
        F: FnOnce() -> T,
    {
        assert!(
            self.raw.len < self.raw.cap,
            "ConstructGuard overflow: block of {} slots is full",
            self.raw.cap
        );

        // SAFETY: slot `len` is inside the block and raw.
        unsafe {
            let slot = self.raw.end();
            self.raw.alloc.construct(slot, init);
        }
        self.raw.len += 1;
    }

    /// Disarms the guard and hands back the filled owner.
    pub fn finish(self) -> RawStorage<T, A> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so `raw` is moved out exactly
        // once.
        unsafe { ptr::read(&this.raw) }
    }
}

impl<T, A: AllocStrategy<T>> Drop for ConstructGuard<T, A> {
    fn drop(&mut self) {
        let built = self.raw.len;
        self.raw.len = 0;
        // SAFETY: exactly `[0, built)` was constructed by this guard.
        unsafe { self.raw.destroy_slots(0, built) };
        // `self.raw` is dropped next and releases the block.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::StdAlloc;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;

    #[test]
    fn test_empty_owner_has_no_block() {
        let raw: RawStorage<u32, StdAlloc> = RawStorage::empty(StdAlloc);
        assert_eq!(raw.capacity(), 0);
        assert_eq!(raw.start(), raw.end());
        assert_eq!(raw.end(), raw.space_end());
    }

    #[test]
    fn test_with_capacity_cursors() {
        let raw: RawStorage<u64, StdAlloc> =
            RawStorage::with_capacity(StdAlloc, 8).unwrap();
        assert_eq!(raw.len(), 0);
        assert_eq!(raw.capacity(), 8);
        assert_eq!(raw.start(), raw.end());
        assert_eq!(
            raw.space_end().as_ptr() as usize - raw.start().as_ptr() as usize,
            8 * std::mem::size_of::<u64>()
        );
    }

    #[test]
    fn test_swap_exchanges_blocks() {
        let mut a: RawStorage<u8, StdAlloc> =
            RawStorage::with_capacity(StdAlloc, 4).unwrap();
        let mut b: RawStorage<u8, StdAlloc> = RawStorage::empty(StdAlloc);
        let a_start = a.start();

        RawStorage::swap(&mut a, &mut b);

        assert_eq!(a.capacity(), 0);
        assert_eq!(b.capacity(), 4);
        assert_eq!(b.start(), a_start);
    }

    #[test]
    fn test_reallocate_moves_values() {
        let mut raw = RawStorage::with_capacity(StdAlloc, 2).unwrap();
        unsafe {
            raw.alloc().construct(raw.slot(0), || 'a');
            raw.alloc().construct(raw.slot(1), || 'b');
            raw.set_len(2);
        }

        raw.reallocate(5).unwrap();
        assert_eq!(raw.capacity(), 5);
        assert_eq!(raw.as_slice(), ['a', 'b']);

        raw.reallocate_inserting(6, 1, || 'x').unwrap();
        assert_eq!(raw.capacity(), 6);
        assert_eq!(raw.as_slice(), ['a', 'x', 'b']);

        unsafe {
            raw.destroy_slots(0, 3);
            raw.set_len(0);
        }
        raw.reallocate(0).unwrap();
        assert_eq!(raw.capacity(), 0);
        assert_eq!(raw.start(), raw.end());
    }

    #[test]
    fn test_reallocate_inserting_panic_keeps_block() {
        let mut raw = RawStorage::with_capacity(StdAlloc, 1).unwrap();
        unsafe {
            raw.alloc().construct(raw.slot(0), || 7u32);
            raw.set_len(1);
        }
        let block = raw.start();

        let result = catch_unwind(AssertUnwindSafe(|| {
            raw.reallocate_inserting(2, 1, || panic!("constructor failed"))
        }));

        assert!(result.is_err());
        assert_eq!(raw.start(), block);
        assert_eq!(raw.capacity(), 1);
        assert_eq!(raw.as_slice(), [7]);
    }

    #[test]
    fn test_drop_does_not_destroy_values() {
        let tracker = Rc::new(());
        let leaked = {
            let mut raw: RawStorage<Rc<()>, StdAlloc> =
                RawStorage::with_capacity(StdAlloc, 1).unwrap();
            unsafe {
                raw.alloc().construct(raw.slot(0), || Rc::clone(&tracker));
                raw.set_len(1);
                // Move the value out so the test does not leak it, then
                // check that dropping the owner alone would not have
                // touched it.
                let value = ptr::read(raw.slot(0).as_ptr());
                raw.set_len(0);
                value
            }
        };
        assert_eq!(Rc::strong_count(&tracker), 2);
        drop(leaked);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn test_guard_finish_keeps_values() {
        let raw = RawStorage::with_capacity(StdAlloc, 3).unwrap();
        let mut guard = ConstructGuard::new(raw);
        for i in 0..3 {
            guard.construct_next(|| i * 2);
        }
        assert_eq!(guard.constructed(), 3);

        let mut raw = guard.finish();
        assert_eq!(raw.as_slice(), &[0, 2, 4]);
        unsafe {
            raw.destroy_slots(0, 3);
            raw.set_len(0);
        }
    }

    #[test]
    fn test_guard_rolls_back_on_panic() {
        let tracker = Rc::new(());
        let raw = RawStorage::with_capacity(StdAlloc, 4).unwrap();
        let mut guard = ConstructGuard::new(raw);

        let result = catch_unwind(AssertUnwindSafe(|| {
            guard.construct_next(|| Rc::clone(&tracker));
            guard.construct_next(|| Rc::clone(&tracker));
            guard.construct_next(|| panic!("constructor failed"));
        }));

        assert!(result.is_err());
        assert_eq!(guard.constructed(), 2);
        assert_eq!(Rc::strong_count(&tracker), 3);

        drop(guard);
        assert_eq!(Rc::strong_count(&tracker), 1);
    }
}
