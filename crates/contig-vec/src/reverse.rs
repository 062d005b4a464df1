//! Direction-reversing cursor adapter.
//!
//! [`Reverse`] wraps any [`Step`] cursor and swaps the meaning of forward
//! and backward. It keeps the movement category of its base. A reversed
//! cursor whose base sits at position `i` reads the element at `i - 1`, so
//! `Reverse::new(v.end())` reads the last element and
//! `Reverse::new(v.begin())` is the one-past-the-end of the reversed
//! sequence.
//!
//! ```
//! use contig_vec::{Step, Vector};
//!
//! let v = Vector::from([1, 2, 3]);
//! let mut it = v.rbegin();
//! let mut seen = Vec::new();
//!
//! while it != v.rend() {
//!     seen.push(*it.get().unwrap());
//!     it.step_forward();
//! }
//! assert_eq!(seen, [3, 2, 1]);
//! ```

use crate::cursor::{Const, Cursor, Mut, RandomAccess, Step};

/// A cursor moving in the opposite direction of its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reverse<I> {
    base: I,
}

impl<I> Reverse<I> {
    /// Wraps `base`.
    #[inline]
    pub fn new(base: I) -> Self {
        Reverse { base }
    }

    /// The wrapped cursor. It sits one position *after* the element this
    /// adapter reads.
    #[inline]
    pub fn base(&self) -> &I {
        &self.base
    }

    /// Unwraps the adapter.
    #[inline]
    pub fn into_base(self) -> I {
        self.base
    }
}

impl<I: Step> Step for Reverse<I> {
    type Category = I::Category;

    #[inline]
    fn step_forward(&mut self) {
        self.base.step_backward();
    }

    #[inline]
    fn step_backward(&mut self) {
        self.base.step_forward();
    }
}

impl<I: RandomAccess> RandomAccess for Reverse<I> {
    #[inline]
    fn offset_by(&mut self, n: isize) {
        self.base.offset_by(n.wrapping_neg());
    }

    #[inline]
    fn distance_to(&self, other: &Self) -> isize {
        self.base.distance_to(&other.base).wrapping_neg()
    }
}

impl<'a, T> Reverse<Cursor<'a, T, Const>> {
    /// The element in front of the base cursor.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        self.base.peek(-1)
    }
}

impl<T> Reverse<Cursor<'_, T, Mut>> {
    /// The element in front of the base cursor.
    #[inline]
    pub fn get(&self) -> Option<&T> {
        let slot = self.base.slot_at(self.base.index().wrapping_sub(1))?;
        // SAFETY: live slot; shared for the borrow of `self`.
        Some(unsafe { &*slot.as_ptr() })
    }

    /// The element in front of the base cursor, mutably.
    #[inline]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        let slot = self.base.slot_at(self.base.index().wrapping_sub(1))?;
        // SAFETY: live slot; `&mut self` makes the access unique.
        Some(unsafe { &mut *slot.as_ptr() })
    }
}
