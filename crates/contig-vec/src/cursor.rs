//! Random-access cursors over a vector's contiguous storage.
//!
//! A [`Cursor`] is a position inside one vector's live region, tagged with
//! a [`Constness`] marker that decides what dereferencing yields:
//!
//! - [`Cursor<'a, T, Const>`](Const): shared access, `Copy`, dereferences
//!   to `&'a T`
//! - [`Cursor<'a, T, Mut>`](Mut): unique access, dereferences to `&mut T`
//!
//! Cursors borrow the vector they came from, so any operation that could
//! reallocate or shift the storage is rejected by the borrow checker while
//! a cursor is alive.
//!
//! Positions are signed and may move anywhere, including before the first
//! element or past the last one; only dereferencing is checked. That lets
//! a [`Reverse`](crate::Reverse) adapter step its base cursor to `-1`
//! without undefined behaviour.
//!
//! # Movement capabilities
//!
//! [`Step`] is the capability of moving one position at a time and
//! [`RandomAccess`] adds constant-time offsets. Every `Step` type names
//! its [`Category`] through [`Step::Category`]: [`StepOnly`] or
//! [`Offset`]. [`advance`] dispatches on that tag, so an `Offset` type
//! always moves with a single [`RandomAccess::offset_by`] and a
//! `StepOnly` type takes `|n|` single steps. The choice is made
//! statically, per type, and cannot be bypassed by an implementation.
//!
//! # Example
//!
//! ```
//! use contig_vec::{Step, Vector, cursor::advance};
//!
//! let v = Vector::from([10, 20, 30, 40]);
//! let mut it = v.begin();
//!
//! assert_eq!(it.get(), Some(&10));
//! it.step_forward();
//! assert_eq!(it.get(), Some(&20));
//! advance(&mut it, 2);
//! assert_eq!(it.get(), Some(&40));
//! assert_eq!((it - 3).get(), Some(&10));
//! it.step_forward();
//! assert_eq!(it, v.end());
//! assert_eq!(it.get(), None);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::ptr::NonNull;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Const {}
    impl Sealed for super::Mut {}
    impl Sealed for super::StepOnly {}
    impl Sealed for super::Offset {}
}

/// Access mode of a cursor. Implemented only by [`Const`] and [`Mut`].
pub trait Constness: sealed::Sealed {
    /// Whether cursors with this marker hand out mutable references.
    const MUTABLE: bool;
}

/// Marker for read-only cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Const;

/// Marker for mutating cursors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mut;

impl Constness for Const {
    const MUTABLE: bool = false;
}

impl Constness for Mut {
    const MUTABLE: bool = true;
}

/// Movement category of a cursor. Implemented only by [`StepOnly`] and
/// [`Offset`].
pub trait Category: sealed::Sealed {
    /// Whether cursors of this category jump in constant time.
    const RANDOM_ACCESS: bool;
}

/// Tag for cursors that move one position at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOnly;

/// Tag for cursors that move any distance in constant time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Offset;

impl Category for StepOnly {
    const RANDOM_ACCESS: bool = false;
}

impl Category for Offset {
    const RANDOM_ACCESS: bool = true;
}

/// Single-step movement.
pub trait Step {
    /// [`Offset`] for types that also implement [`RandomAccess`],
    /// [`StepOnly`] otherwise.
    type Category: Category;

    /// Moves one position forward (prefix increment).
    fn step_forward(&mut self);

    /// Moves one position backward (prefix decrement).
    fn step_backward(&mut self);
}

/// Constant-time offset movement.
pub trait RandomAccess: Step<Category = Offset> {
    /// Moves `n` positions in one step (`+=` / `-=`).
    fn offset_by(&mut self, n: isize);

    /// Number of forward steps from `self` to `other`.
    fn distance_to(&self, other: &Self) -> isize;
}

/// Multi-position movement for cursors of category `C`.
///
/// Implemented once per category for every [`Step`] type; call it through
/// [`advance`].
pub trait Advance<C: Category> {
    /// Moves `n` positions, forward for positive `n`, backward for
    /// negative `n`.
    fn advance_by(&mut self, n: isize);
}

impl<I: Step<Category = StepOnly>> Advance<StepOnly> for I {
    fn advance_by(&mut self, n: isize) {
        if n >= 0 {
            for _ in 0..n {
                self.step_forward();
            }
        } else {
            for _ in 0..n.unsigned_abs() {
                self.step_backward();
            }
        }
    }
}

impl<I: RandomAccess> Advance<Offset> for I {
    #[inline]
    fn advance_by(&mut self, n: isize) {
        self.offset_by(n);
    }
}

/// Moves `it` by `n` positions.
///
/// O(1) for [`Offset`] cursors, O(|n|) for [`StepOnly`] ones.
#[inline]
pub fn advance<I>(it: &mut I, n: isize)
where
    I: Step + Advance<I::Category>,
{
    <I as Advance<I::Category>>::advance_by(it, n);
}

/// A position inside a vector's live region.
pub struct Cursor<'a, T, C: Constness> {
    base: NonNull<T>,
    len: usize,
    pos: isize,
    _marker: PhantomData<(&'a mut T, C)>,
}

// SAFETY: a cursor is at most a unique borrow of the vector's elements.
unsafe impl<T: Send + Sync, C: Constness> Send for Cursor<'_, T, C> {}
unsafe impl<T: Sync, C: Constness> Sync for Cursor<'_, T, C> {}

impl<'a, T, C: Constness> Cursor<'a, T, C> {
    /// # Safety
    ///
    /// `base` must point at `len` live values that stay valid, and are
    /// accessed only through cursors of this borrow, for `'a`.
    #[inline]
    pub(crate) unsafe fn from_raw(
        base: NonNull<T>,
        len: usize,
        pos: usize,
    ) -> Self {
        debug_assert!(pos <= len);
        Cursor {
            base,
            len,
            pos: pos as isize,
            _marker: PhantomData,
        }
    }

    /// Position relative to the first element.
    #[inline]
    pub fn index(&self) -> isize {
        self.pos
    }

    /// Returns `true` if the cursor points at a live element.
    #[inline]
    pub fn is_dereferenceable(&self) -> bool {
        self.slot_at(self.pos).is_some()
    }

    /// Number of forward steps from `self` to `other`.
    #[inline]
    pub fn distance(&self, other: &Self) -> isize {
        debug_assert_eq!(self.base, other.base, "cursors of different vectors");
        other.pos.wrapping_sub(self.pos)
    }

    /// Slot at `pos`, if it holds a live element.
    #[inline]
    pub(crate) fn slot_at(&self, pos: isize) -> Option<NonNull<T>> {
        if pos < 0 || pos as usize >= self.len {
            return None;
        }
        // SAFETY: `0 <= pos < len`, inside the live region.
        Some(unsafe { self.base.add(pos as usize) })
    }
}

impl<'a, T> Cursor<'a, T, Const> {
    /// The element under the cursor, or `None` outside the live region.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        // SAFETY: live slot, shared for `'a`.
        self.slot_at(self.pos).map(|slot| unsafe { &*slot.as_ptr() })
    }

    /// The element under the cursor without a bounds check.
    ///
    /// # Safety
    ///
    /// The cursor must be [dereferenceable](Self::is_dereferenceable).
    #[inline]
    pub unsafe fn get_unchecked(&self) -> &'a T {
        debug_assert!(self.is_dereferenceable());
        // SAFETY: per the caller's contract.
        unsafe { &*self.base.as_ptr().offset(self.pos) }
    }

    /// Element `n` positions away from the cursor.
    #[inline]
    pub fn peek(&self, n: isize) -> Option<&'a T> {
        // SAFETY: live slot, shared for `'a`.
        self.slot_at(self.pos.wrapping_add(n))
            .map(|slot| unsafe { &*slot.as_ptr() })
    }

    /// Postfix increment: moves forward, returns the previous position.
    #[inline]
    pub fn post_increment(&mut self) -> Self {
        let previous = *self;
        self.step_forward();
        previous
    }

    /// Postfix decrement: moves backward, returns the previous position.
    #[inline]
    pub fn post_decrement(&mut self) -> Self {
        let previous = *self;
        self.step_backward();
        previous
    }
}

impl<'a, T> Cursor<'a, T, Mut> {
    /// The element under the cursor, or `None` outside the live region.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: live slot; shared for the borrow of `self`.
        self.slot_at(self.pos).map(|slot| unsafe { &*slot.as_ptr() })
    }

    /// The element under the cursor, mutably.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        // SAFETY: live slot; `&mut self` makes the access unique.
        self.slot_at(self.pos)
            .map(|slot| unsafe { &mut *slot.as_ptr() })
    }

    /// Consumes the cursor, returning the element for the whole borrow.
    #[inline]
    pub fn into_mut(self) -> Option<&'a mut T> {
        // SAFETY: live slot; the cursor, and with it the unique borrow,
        // is consumed.
        self.slot_at(self.pos)
            .map(|slot| unsafe { &mut *slot.as_ptr() })
    }

    /// A read-only cursor at the same position, borrowing this one.
    #[inline]
    pub fn as_const(&self) -> Cursor<'_, T, Const> {
        Cursor {
            base: self.base,
            len: self.len,
            pos: self.pos,
            _marker: PhantomData,
        }
    }
}

impl<T, C: Constness> Step for Cursor<'_, T, C> {
    type Category = Offset;

    #[inline]
    fn step_forward(&mut self) {
        self.pos = self.pos.wrapping_add(1);
    }

    #[inline]
    fn step_backward(&mut self) {
        self.pos = self.pos.wrapping_sub(1);
    }
}

impl<T, C: Constness> RandomAccess for Cursor<'_, T, C> {
    #[inline]
    fn offset_by(&mut self, n: isize) {
        self.pos = self.pos.wrapping_add(n);
    }

    #[inline]
    fn distance_to(&self, other: &Self) -> isize {
        self.distance(other)
    }
}

impl<T, C: Constness> AddAssign<isize> for Cursor<'_, T, C> {
    #[inline]
    fn add_assign(&mut self, n: isize) {
        self.offset_by(n);
    }
}

impl<T, C: Constness> SubAssign<isize> for Cursor<'_, T, C> {
    #[inline]
    fn sub_assign(&mut self, n: isize) {
        self.offset_by(n.wrapping_neg());
    }
}

impl<T, C: Constness> Add<isize> for Cursor<'_, T, C> {
    type Output = Self;

    #[inline]
    fn add(mut self, n: isize) -> Self {
        self += n;
        self
    }
}

impl<T, C: Constness> Sub<isize> for Cursor<'_, T, C> {
    type Output = Self;

    #[inline]
    fn sub(mut self, n: isize) -> Self {
        self -= n;
        self
    }
}

impl<T> Clone for Cursor<'_, T, Const> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T, Const> {}

/// Cursors compare by block address and position.
///
/// Vectors that own no block share the same dangling address, so cursors
/// of two such vectors compare by position alone.
impl<T, C: Constness> PartialEq for Cursor<'_, T, C> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base && self.pos == other.pos
    }
}

impl<T, C: Constness> Eq for Cursor<'_, T, C> {}

impl<T, C: Constness> PartialOrd for Cursor<'_, T, C> {
    /// Cursors over different blocks are unordered. Cursors of vectors
    /// that own no block are ordered by position, like [`PartialEq`].
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.base != other.base {
            return None;
        }
        Some(self.pos.cmp(&other.pos))
    }
}

impl<T, C: Constness> fmt::Debug for Cursor<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("pos", &self.pos)
            .field("len", &self.len)
            .field("mutable", &C::MUTABLE)
            .finish()
    }
}
