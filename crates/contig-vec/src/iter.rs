//! Iteration.
//!
//! - [`Iter`]: borrowed, double-ended, built from a pair of read-only
//!   cursors
//! - [`IntoIter`]: owning; takes over the vector's block and destroys
//!   whatever was not consumed through the strategy when dropped
//!
//! Mutable iteration goes through the slice iterator returned by
//! [`Vector::iter_mut`].

use std::fmt;
use std::iter::FusedIterator;
use std::mem::ManuallyDrop;
use std::ptr;
use std::slice;

use crate::alloc::{AllocStrategy, StdAlloc};
use crate::cursor::{Const, Cursor, RandomAccess, Step};
use crate::error::Error;
use crate::raw::RawStorage;
use crate::vector::{Vector, or_panic};

/// Borrowed iterator over the range `[front, back)` of two cursors.
pub struct Iter<'a, T> {
    front: Cursor<'a, T, Const>,
    back: Cursor<'a, T, Const>,
}

impl<'a, T> Iter<'a, T> {
    /// Iterates from `front` up to, but excluding, `back`.
    ///
    /// Both cursors must come from the same vector with `front <= back`.
    #[inline]
    pub fn new(
        front: Cursor<'a, T, Const>,
        back: Cursor<'a, T, Const>,
    ) -> Self {
        debug_assert!(front <= back, "iterator range is reversed");
        Iter { front, back }
    }

    /// The cursor of the next element to be yielded from the front.
    #[inline]
    pub fn front(&self) -> Cursor<'a, T, Const> {
        self.front
    }

    /// The cursor one past the next element to be yielded from the back.
    #[inline]
    pub fn back(&self) -> Cursor<'a, T, Const> {
        self.back
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.front.distance(&self.back).max(0) as usize
    }
}

impl<T> Clone for Iter<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        Iter {
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        let item = self.front.get();
        self.front.step_forward();
        item
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }

    #[inline]
    fn nth(&mut self, n: usize) -> Option<&'a T> {
        if n >= self.remaining() {
            self.front = self.back;
            return None;
        }
        self.front.offset_by(n as isize);
        self.next()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    #[inline]
    fn next_back(&mut self) -> Option<&'a T> {
        if self.front == self.back {
            return None;
        }
        self.back.step_backward();
        self.back.get()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Owning iterator returned by `Vector::into_iter`.
pub struct IntoIter<T, A: AllocStrategy<T> = StdAlloc> {
    raw: RawStorage<T, A>,
    /// Slots `[0, head)` have been moved out; `[head, raw.len())` are live.
    head: usize,
}

impl<T, A: AllocStrategy<T>> IntoIter<T, A> {
    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[head, len)` is live.
        unsafe {
            slice::from_raw_parts(
                self.raw.slot(self.head).as_ptr(),
                self.raw.len() - self.head,
            )
        }
    }
}

impl<T, A: AllocStrategy<T>> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.head == self.raw.len() {
            return None;
        }

        // SAFETY: slot `head` is live and is marked consumed right away.
        let item = unsafe { ptr::read(self.raw.slot(self.head).as_ptr()) };
        self.head += 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.raw.len() - self.head;
        (n, Some(n))
    }
}

impl<T, A: AllocStrategy<T>> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.raw.len() {
            return None;
        }

        let last = self.raw.len() - 1;
        // SAFETY: slot `last` is live and is dropped from the range first.
        unsafe {
            self.raw.set_len(last);
            Some(ptr::read(self.raw.slot(last).as_ptr()))
        }
    }
}

impl<T, A: AllocStrategy<T>> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: AllocStrategy<T>> FusedIterator for IntoIter<T, A> {}

impl<T, A: AllocStrategy<T>> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let (head, len) = (self.head, self.raw.len());
        // SAFETY: `[head, len)` is live and is forgotten before it is
        // destroyed.
        unsafe {
            self.raw.set_len(0);
            self.raw.destroy_slots(head, len);
        }
        // `self.raw` releases the block.
    }
}

impl<T: fmt::Debug, A: AllocStrategy<T>> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T, A: AllocStrategy<T>> IntoIterator for Vector<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        let this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the storage is moved out
        // exactly once.
        let raw = unsafe { ptr::read(&this.raw) };
        IntoIter { raw, head: 0 }
    }
}

impl<'a, T, A: AllocStrategy<T>> IntoIterator for &'a Vector<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T, A: AllocStrategy<T>> IntoIterator for &'a mut Vector<T, A> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> slice::IterMut<'a, T> {
        self.iter_mut()
    }
}

/// # Panics
///
/// Panics if growing the vector fails.
impl<T, A: AllocStrategy<T>> Extend<T> for Vector<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();

        if lower > 0 {
            let wanted = self.len().checked_add(lower).ok_or(
                Error::CapacityOverflow {
                    requested: usize::MAX,
                },
            );
            or_panic(wanted.and_then(|slots| self.reserve(slots)), "extend");
        }

        for item in iter {
            or_panic(self.push_back(item), "extend");
        }
    }
}

impl<'a, T, A> Extend<&'a T> for Vector<T, A>
where
    T: Copy + 'a,
    A: AllocStrategy<T>,
{
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T, A> FromIterator<T> for Vector<T, A>
where
    A: AllocStrategy<T> + Default,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Self::new_in(A::default());
        v.extend(iter);
        v
    }
}
