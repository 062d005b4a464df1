//! Copy, move and assignment.
//!
//! Plain Rust moves of a [`Vector`] are bitwise and need no support here.
//! This module covers the operations that have to consult the allocation
//! strategy:
//!
//! - [`Vector::try_clone`] / [`Clone`]: copy construction
//! - [`Vector::take`]: move construction out of a place that stays usable
//! - [`Vector::assign_from`] / [`Clone::clone_from`]: copy assignment
//! - [`Vector::assign_move`]: move assignment
//!
//! # Copy assignment
//!
//! When the strategy propagates on copy assignment, or the destination is
//! too small for the source, a complete copy is built in a fresh block and
//! then exchanged with the destination. A panicking `Clone` leaves the
//! destination untouched.
//!
//! Otherwise the destination's storage is reused: the overlapping prefix
//! is overwritten with [`Clone::clone_from`], surplus elements are
//! destroyed and missing ones are cloned onto the end. A panic part way
//! through this path leaves a mix of old and new values (still a valid
//! vector).

use std::mem;

use crate::alloc::AllocStrategy;
use crate::error::Result;
use crate::raw::{ConstructGuard, RawStorage};
use crate::vector::{Vector, or_panic};

impl<T: Clone, A: AllocStrategy<T> + Clone> Vector<T, A> {
    /// Returns an independent copy with the same capacity, bound to a
    /// clone of this vector's strategy.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if the block cannot be obtained.
    pub fn try_clone(&self) -> Result<Self> {
        self.clone_with(self.raw.alloc().clone())
    }

    /// Copies the elements into a fresh block of the same capacity drawn
    /// from `alloc`.
    fn clone_with(&self, alloc: A) -> Result<Self> {
        let raw = RawStorage::with_capacity(alloc, self.capacity())?;
        let mut guard = ConstructGuard::new(raw);
        for item in self.as_slice() {
            guard.construct_next(|| item.clone());
        }

        Ok(Vector {
            raw: guard.finish(),
        })
    }

    /// Replaces the contents with clones of `src`'s elements.
    ///
    /// # Errors
    ///
    /// Returns the allocation error of the reallocating path; `self` is
    /// unchanged in that case.
    pub fn assign_from(&mut self, src: &Self) -> Result<()> {
        if A::PROPAGATE_ON_COPY_ASSIGN || self.capacity() < src.len() {
            self.assign_reallocating(src)
        } else {
            self.assign_in_place(src);
            Ok(())
        }
    }

    fn assign_reallocating(&mut self, src: &Self) -> Result<()> {
        let alloc = if A::PROPAGATE_ON_COPY_ASSIGN {
            src.raw.alloc().clone()
        } else {
            self.raw.alloc().clone()
        };

        let mut fresh = src.clone_with(alloc)?;
        log_debug!(
            "copy-assign reallocated: {} -> {} slots",
            self.capacity(),
            fresh.capacity()
        );

        // The previous contents leave with `fresh`.
        mem::swap(self, &mut fresh);
        Ok(())
    }

    fn assign_in_place(&mut self, src: &Self) {
        debug_assert!(self.capacity() >= src.len());

        for (dst, item) in self.as_mut_slice().iter_mut().zip(src.as_slice()) {
            dst.clone_from(item);
        }

        let len = self.len();
        if src.len() < len {
            self.truncate(src.len());
            return;
        }

        for item in &src.as_slice()[len..] {
            // SAFETY: capacity covers `src.len()`, so slot `self.len()` is
            // raw and inside the block.
            unsafe {
                let end = self.len();
                self.raw.alloc().construct(self.raw.end(), || item.clone());
                self.raw.set_len(end + 1);
            }
        }
    }
}

impl<T, A: AllocStrategy<T> + Clone> Vector<T, A> {
    /// Moves the contents of `src` into a new vector, leaving `src` empty
    /// with zero capacity. No element is copied and nothing is allocated.
    ///
    /// `src` keeps a clone of its strategy.
    ///
    /// ```
    /// use contig_vec::Vector;
    ///
    /// let mut src = Vector::from([1, 2, 3]);
    /// let dst = Vector::take(&mut src);
    ///
    /// assert_eq!(dst, [1, 2, 3]);
    /// assert_eq!((src.size(), src.capacity()), (0, 0));
    /// ```
    pub fn take(src: &mut Self) -> Self {
        let mut out = Self::new_in(src.raw.alloc().clone());
        RawStorage::swap(&mut out.raw, &mut src.raw);
        out
    }

    /// Replaces the contents with the elements of `src`, leaving `src`
    /// empty with zero capacity.
    ///
    /// The source's block is adopted when the strategy propagates on move
    /// assignment or the two strategies are interchangeable. Otherwise
    /// the elements are relocated into a block owned by this vector's
    /// strategy and the source's block is released by its own strategy.
    ///
    /// # Errors
    ///
    /// Returns the allocation error of the relocating path; neither vector
    /// is changed in that case.
    pub fn assign_move(&mut self, src: &mut Self) -> Result<()> {
        if A::PROPAGATE_ON_MOVE_ASSIGN {
            let mut adopted = Self::take(src);
            mem::swap(self, &mut adopted);
            return Ok(());
        }

        if self.raw.alloc().is_interchangeable(src.raw.alloc()) {
            let mut adopted = Self::take(src);
            // The destination keeps its own strategy; either can release
            // the other's block.
            mem::swap(self.raw.alloc_mut(), adopted.raw.alloc_mut());
            mem::swap(self, &mut adopted);
            log_debug!("move-assign adopted interchangeable block");
            return Ok(());
        }

        let len = src.len();
        if self.capacity() < len {
            let fresh =
                RawStorage::with_capacity(self.raw.alloc().clone(), len)?;
            self.clear();
            drop(mem::replace(&mut self.raw, fresh));
        } else {
            self.clear();
        }

        log_debug!("move-assign relocated {} elements across strategies", len);

        // SAFETY: `self` is empty and holds at least `len` raw slots.
        unsafe {
            src.raw.relocate_into(&mut self.raw, 0);
            self.raw.set_len(len);
        }

        // The emptied source block goes back to the source's strategy.
        src.raw = RawStorage::empty(src.raw.alloc().clone());
        Ok(())
    }
}

/// # Panics
///
/// `clone` and `clone_from` panic if a block cannot be allocated. Use
/// [`Vector::try_clone`] and [`Vector::assign_from`] to handle that case.
impl<T: Clone, A: AllocStrategy<T> + Clone> Clone for Vector<T, A> {
    fn clone(&self) -> Self {
        or_panic(self.try_clone(), "clone")
    }

    fn clone_from(&mut self, source: &Self) {
        or_panic(self.assign_from(source), "clone_from");
    }
}
