//! Allocation strategies.
//!
//! A [`Vector`](crate::Vector) never talks to the global allocator
//! directly. Every block it owns is obtained from, and returned to, the
//! [`AllocStrategy`] it was constructed with, and every element it holds
//! is constructed and destroyed through that same strategy. This keeps
//! memory policy (pools, arenas, accounting, fault injection) entirely on
//! the caller's side.
//!
//! [`StdAlloc`] is the default strategy and forwards to `std::alloc`.
//!
//! # Example
//!
//! ```
//! use contig_vec::{AllocStrategy, StdAlloc};
//!
//! let alloc = StdAlloc;
//! let block = AllocStrategy::<u64>::allocate(&alloc, 4).unwrap();
//!
//! unsafe {
//!     alloc.construct(block, || 7u64);
//!     assert_eq!(*block.as_ptr(), 7);
//!     alloc.destroy(block);
//!     alloc.deallocate(block, 4);
//! }
//! ```

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::{self, NonNull};

use crate::error::{Error, Result};

/// Capability set a vector needs from its memory provider.
///
/// The four operations mirror the two lifetimes a vector manages: the
/// lifetime of a block of slots (`allocate`/`deallocate`) and the lifetime
/// of a value inside one slot (`construct`/`destroy`).
///
/// # Safety
///
/// Implementors must guarantee that a successful `allocate(n)` returns a
/// pointer that is aligned for `T`, valid for reads and writes of `n`
/// consecutive `T` slots, and not aliased by any other live block until it
/// is passed back to `deallocate` with the same `n`. When
/// [`is_interchangeable`](AllocStrategy::is_interchangeable) returns `true`,
/// either instance must be able to deallocate blocks from the other.
///
/// # Cloning
///
/// A vector talks to exactly one strategy instance for its whole life:
/// growth, insertion and shrinking allocate the new block through it.
/// `Clone` is only required by the operations that must hand a strategy
/// to a second vector: copy construction and copy assignment, and
/// [`Vector::take`](crate::Vector::take) and
/// [`Vector::assign_move`](crate::Vector::assign_move), which leave a
/// strategy behind in the emptied source.
pub unsafe trait AllocStrategy<T> {
    /// Whether a copy assignment hands the source's strategy to the
    /// destination.
    ///
    /// When `true`, copy assignment always takes the reallocating path and
    /// the destination's new block is drawn from the source's strategy.
    const PROPAGATE_ON_COPY_ASSIGN: bool = false;

    /// Whether a move assignment hands the source's strategy (and block)
    /// to the destination.
    const PROPAGATE_ON_MOVE_ASSIGN: bool = true;

    /// Acquires an uninitialized block of `slots` element slots.
    ///
    /// # Errors
    ///
    /// - `Error::CapacityOverflow` if the block size does not fit in `isize`
    /// - `Error::AllocationFailed` if memory cannot be obtained
    fn allocate(&self, slots: usize) -> Result<NonNull<T>>;

    /// Releases a block previously returned by [`allocate`].
    ///
    /// # Safety
    ///
    /// `block` must come from `allocate(slots)` on this strategy (or an
    /// interchangeable one) with the same `slots`, and must not be used
    /// afterwards. Live values in the block are not dropped.
    ///
    /// [`allocate`]: AllocStrategy::allocate
    unsafe fn deallocate(&self, block: NonNull<T>, slots: usize);

    /// Initializes `slot` with the value produced by `init`.
    ///
    /// If `init` panics the slot is left uninitialized.
    ///
    /// # Safety
    ///
    /// `slot` must be a valid, uninitialized slot inside a live block.
    #[inline]
    unsafe fn construct<F>(&self, slot: NonNull<T>, init: F)
    where
        F: FnOnce() -> T,
    {
        let value = init();
        // SAFETY: the caller guarantees `slot` is valid for writes.
        unsafe { slot.as_ptr().write(value) };
    }

    /// Runs the destructor of the value in `slot`, leaving raw memory.
    ///
    /// # Safety
    ///
    /// `slot` must hold a live value that is not used afterwards.
    #[inline]
    unsafe fn destroy(&self, slot: NonNull<T>) {
        // SAFETY: the caller guarantees `slot` holds a live value.
        unsafe { ptr::drop_in_place(slot.as_ptr()) };
    }

    /// Whether blocks allocated by `other` may be released by `self`.
    ///
    /// Stateless strategies are always interchangeable.
    #[inline]
    fn is_interchangeable(&self, _other: &Self) -> bool {
        true
    }
}

/// Computes the layout of `slots` consecutive `T` slots.
///
/// # Errors
///
/// Returns `Error::CapacityOverflow` when the total size overflows `isize`.
pub fn slot_layout<T>(slots: usize) -> Result<Layout> {
    Layout::array::<T>(slots)
        .map_err(|_| Error::CapacityOverflow { requested: slots })
}

/// Default strategy backed by the global allocator.
///
/// Zero-slot requests and zero-sized element types never reach
/// `std::alloc`; they receive a dangling, well-aligned pointer instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StdAlloc;

unsafe impl<T> AllocStrategy<T> for StdAlloc {
    fn allocate(&self, slots: usize) -> Result<NonNull<T>> {
        let layout = slot_layout::<T>(slots)?;
        if layout.size() == 0 {
            return Ok(NonNull::dangling());
        }

        // SAFETY: `layout` has a non-zero size (checked above).
        let block = unsafe { alloc::alloc(layout) };

        NonNull::new(block.cast::<T>()).ok_or(Error::AllocationFailed {
            slots,
            bytes: layout.size(),
        })
    }

    unsafe fn deallocate(&self, block: NonNull<T>, slots: usize) {
        let bytes = mem::size_of::<T>() * slots;
        if bytes == 0 {
            return;
        }

        // SAFETY: the same size/alignment pair was accepted by
        // `Layout::array` when the block was allocated.
        let layout = unsafe {
            Layout::from_size_align_unchecked(bytes, mem::align_of::<T>())
        };

        // SAFETY: `block` came from `alloc::alloc` with this layout.
        unsafe {
            alloc::dealloc(block.as_ptr().cast::<u8>(), layout);
        }
    }
}
