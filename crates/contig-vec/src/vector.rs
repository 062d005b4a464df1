//! The growable contiguous container.
//!
//! [`Vector`] layers value semantics on top of a [`RawStorage`]: it decides
//! when to grow, constructs and destroys elements through the bound
//! [`AllocStrategy`], and keeps the invariant `len <= capacity` after every
//! public operation.
//!
//! # Growth
//!
//! Appending to a full vector reallocates to `max(2, len * 2)` slots (see
//! [`growth`](crate::growth)). The new element is constructed into the new
//! block *before* the old block is given up, so a panicking constructor
//! leaves the vector exactly as it was. The new block always comes from
//! the vector's own strategy instance; strategies need not be `Clone` to
//! grow.
//!
//! # Invalidation
//!
//! Any reallocating operation moves every element to a new address.
//! Cursors and references borrow the vector, so the borrow checker rejects
//! their use across such operations.
//!
//! # Example
//!
//! ```
//! use contig_vec::{Error, Vector};
//!
//! let mut v = Vector::new();
//! v.push_back(1)?;
//! v.push_back(2)?;
//! v.push_back(3)?;
//! assert_eq!((v.size(), v.capacity()), (3, 4));
//!
//! v.pop_back();
//! assert_eq!(v, [1, 2]);
//! assert_eq!(v.at(5), Err(Error::OutOfRange { index: 5, len: 2 }));
//!
//! v.resize(5, 9)?;
//! assert_eq!(v, [1, 2, 9, 9, 9]);
//! # Ok::<(), Error>(())
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr;
use std::slice::SliceIndex;

use crate::alloc::{AllocStrategy, StdAlloc};
use crate::cursor::{Const, Cursor, Mut};
use crate::error::{Error, Result};
use crate::growth;
use crate::iter::Iter;
use crate::raw::{ConstructGuard, RawStorage};
use crate::reverse::Reverse;

/// A contiguous, growable sequence of `T` backed by the strategy `A`.
pub struct Vector<T, A: AllocStrategy<T> = StdAlloc> {
    pub(crate) raw: RawStorage<T, A>,
}

/// Unwraps the result of an operation whose trait signature cannot carry
/// an error.
#[track_caller]
pub(crate) fn or_panic<R>(result: Result<R>, op: &str) -> R {
    match result {
        Ok(value) => value,
        Err(err) => panic!("Vector::{op} failed: {err}"),
    }
}

impl<T> Vector<T> {
    /// Creates an empty vector with zero capacity. Does not allocate.
    #[must_use]
    pub const fn new() -> Self {
        Self::new_in(StdAlloc)
    }

    /// Creates an empty vector with room for `slots` elements.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if the block cannot be obtained.
    pub fn with_capacity(slots: usize) -> Result<Self> {
        Self::with_capacity_in(slots, StdAlloc)
    }

    /// Creates a vector of `n` copies of `value`.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if the block cannot be obtained.
    pub fn from_elem(n: usize, value: T) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_elem_in(n, value, StdAlloc)
    }

    /// Creates a vector holding clones of `items`, in order.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if the block cannot be obtained.
    pub fn from_slice(items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_slice_in(items, StdAlloc)
    }
}

impl<T, A: AllocStrategy<T>> Vector<T, A> {
    /// Creates an empty vector bound to `alloc`. Does not allocate.
    #[must_use]
    pub const fn new_in(alloc: A) -> Self {
        Vector {
            raw: RawStorage::empty(alloc),
        }
    }

    /// Creates an empty vector bound to `alloc` with room for `slots`
    /// elements.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if the block cannot be obtained.
    pub fn with_capacity_in(slots: usize, alloc: A) -> Result<Self> {
        Ok(Vector {
            raw: RawStorage::with_capacity(alloc, slots)?,
        })
    }

    /// Creates a vector of `n` copies of `value`, bound to `alloc`.
    ///
    /// If cloning panics, the clones already made are destroyed and the
    /// block is released before the panic propagates.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if the block cannot be obtained.
    pub fn from_elem_in(n: usize, value: T, alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        let raw = RawStorage::with_capacity(alloc, n)?;
        let mut guard = ConstructGuard::new(raw);

        if n > 0 {
            for _ in 1..n {
                guard.construct_next(|| value.clone());
            }
            guard.construct_next(move || value);
        }

        Ok(Vector {
            raw: guard.finish(),
        })
    }

    /// Creates a vector holding clones of `items`, bound to `alloc`.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if the block cannot be obtained.
    pub fn from_slice_in(items: &[T], alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        let raw = RawStorage::with_capacity(alloc, items.len())?;
        let mut guard = ConstructGuard::new(raw);
        for item in items {
            guard.construct_next(|| item.clone());
        }

        Ok(Vector {
            raw: guard.finish(),
        })
    }

    /// Number of live elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Number of allocated slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// The allocation strategy bound to this vector.
    #[inline]
    pub fn get_allocator(&self) -> &A {
        self.raw.alloc()
    }

    /// Bounds-checked access.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `index >= size()`.
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len();
        self.as_slice()
            .get(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Bounds-checked mutable access.
    ///
    /// # Errors
    ///
    /// Returns `Error::OutOfRange` if `index >= size()`.
    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// The first element, if any.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.as_slice().first()
    }

    /// The first element mutably, if any.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().first_mut()
    }

    /// The last element, if any.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// The last element mutably, if any.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Pointer to the start of the storage.
    ///
    /// Dangling (but aligned and non-null) while the capacity is zero.
    #[inline]
    pub fn data(&self) -> *const T {
        self.raw.start().as_ptr()
    }

    /// Mutable pointer to the start of the storage.
    #[inline]
    pub fn data_mut(&mut self) -> *mut T {
        self.raw.start().as_ptr()
    }

    /// The live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.raw.as_slice()
    }

    /// The live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.raw.as_mut_slice()
    }

    /// Destroys the last element. Does nothing on an empty vector.
    pub fn pop_back(&mut self) {
        let Some(last) = self.len().checked_sub(1) else {
            return;
        };

        // SAFETY: slot `last` is live; the cursor moves first so a
        // panicking destructor cannot cause a double drop.
        unsafe {
            self.raw.set_len(last);
            self.raw.alloc().destroy(self.raw.slot(last));
        }
    }

    /// Removes the last element and returns it.
    pub fn take_back(&mut self) -> Option<T> {
        let last = self.len().checked_sub(1)?;

        // SAFETY: slot `last` is live and becomes raw once read.
        unsafe {
            self.raw.set_len(last);
            Some(ptr::read(self.raw.slot(last).as_ptr()))
        }
    }

    /// Removes the element at `index`, shifting the tail down, and
    /// returns it. `None` if `index >= size()`.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let len = self.len();
        if index >= len {
            return None;
        }

        // SAFETY: `index < len`; the tail is shifted over the hole.
        unsafe {
            let slot = self.raw.slot(index).as_ptr();
            let value = ptr::read(slot);
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.raw.set_len(len - 1);
            Some(value)
        }
    }

    /// Destroys the element at `index` and shifts the tail down.
    ///
    /// Returns the index of the element that followed the erased one
    /// (equal to the new `size()` when the last element was erased), or
    /// `None` if `index >= size()`.
    pub fn erase(&mut self, index: usize) -> Option<usize> {
        let len = self.len();
        if index >= len {
            return None;
        }

        // SAFETY: `index < len`. While the element is being destroyed the
        // vector only claims `[0, index)`, so a panicking destructor leaks
        // the tail instead of dropping it twice.
        unsafe {
            self.raw.set_len(index);
            let slot = self.raw.slot(index);
            self.raw.alloc().destroy(slot);
            ptr::copy(slot.as_ptr().add(1), slot.as_ptr(), len - index - 1);
            self.raw.set_len(len - 1);
        }

        Some(index)
    }

    /// Destroys elements from `len` onwards. Capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        let old_len = self.len();
        if len >= old_len {
            return;
        }

        // SAFETY: `[len, old_len)` is live and is forgotten before it is
        // destroyed.
        unsafe {
            self.raw.set_len(len);
            self.raw.destroy_slots(len, old_len);
        }
    }

    /// Destroys every element, keeping the block.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Read-only cursor at the first element.
    #[inline]
    pub fn begin(&self) -> Cursor<'_, T, Const> {
        // SAFETY: the cursor borrows `self` for its whole lifetime.
        unsafe { Cursor::from_raw(self.raw.start(), self.len(), 0) }
    }

    /// Read-only cursor one past the last element.
    #[inline]
    pub fn end(&self) -> Cursor<'_, T, Const> {
        let len = self.len();
        // SAFETY: as in `begin`.
        unsafe { Cursor::from_raw(self.raw.start(), len, len) }
    }

    /// Same as [`begin`](Self::begin).
    #[inline]
    pub fn cbegin(&self) -> Cursor<'_, T, Const> {
        self.begin()
    }

    /// Same as [`end`](Self::end).
    #[inline]
    pub fn cend(&self) -> Cursor<'_, T, Const> {
        self.end()
    }

    /// Reversed cursor at the last element.
    #[inline]
    pub fn rbegin(&self) -> Reverse<Cursor<'_, T, Const>> {
        Reverse::new(self.end())
    }

    /// Reversed cursor one before the first element.
    #[inline]
    pub fn rend(&self) -> Reverse<Cursor<'_, T, Const>> {
        Reverse::new(self.begin())
    }

    /// Same as [`rbegin`](Self::rbegin).
    #[inline]
    pub fn rcbegin(&self) -> Reverse<Cursor<'_, T, Const>> {
        self.rbegin()
    }

    /// Same as [`rend`](Self::rend).
    #[inline]
    pub fn rcend(&self) -> Reverse<Cursor<'_, T, Const>> {
        self.rend()
    }

    /// Mutating cursor at the first element.
    #[inline]
    pub fn begin_mut(&mut self) -> Cursor<'_, T, Mut> {
        // SAFETY: the cursor borrows `self` uniquely for its lifetime.
        unsafe { Cursor::from_raw(self.raw.start(), self.len(), 0) }
    }

    /// Mutating cursor one past the last element.
    #[inline]
    pub fn end_mut(&mut self) -> Cursor<'_, T, Mut> {
        let len = self.len();
        // SAFETY: as in `begin_mut`.
        unsafe { Cursor::from_raw(self.raw.start(), len, len) }
    }

    /// Reversed mutating cursor at the last element.
    #[inline]
    pub fn rbegin_mut(&mut self) -> Reverse<Cursor<'_, T, Mut>> {
        Reverse::new(self.end_mut())
    }

    /// Reversed mutating cursor one before the first element.
    #[inline]
    pub fn rend_mut(&mut self) -> Reverse<Cursor<'_, T, Mut>> {
        Reverse::new(self.begin_mut())
    }

    /// Front-to-back iterator over shared references.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.begin(), self.end())
    }

    /// Front-to-back iterator over mutable references.
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, A: AllocStrategy<T>> Vector<T, A> {
    /// Ensures `capacity() >= slots`, allocating exactly `slots` when the
    /// current block is too small.
    ///
    /// Element values are preserved; their addresses change if a
    /// reallocation happens.
    ///
    /// # Errors
    ///
    /// Returns the allocation error; the vector is unchanged in that case.
    pub fn reserve(&mut self, slots: usize) -> Result<()> {
        if slots <= self.capacity() {
            return Ok(());
        }
        self.reallocate(slots)
    }

    /// Reallocates to exactly `size()` slots, releasing the block
    /// entirely when empty.
    ///
    /// # Errors
    ///
    /// Returns the allocation error; the vector is unchanged in that case.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        if self.len() == self.capacity() {
            return Ok(());
        }
        self.reallocate(self.len())
    }

    /// Moves the live elements into a fresh block of `slots` slots.
    fn reallocate(&mut self, slots: usize) -> Result<()> {
        debug_assert!(slots >= self.len());

        log_trace!(
            "reallocating {} -> {} slots ({} live)",
            self.capacity(),
            slots,
            self.len()
        );
        self.raw.reallocate(slots)
    }

    /// Appends `value`.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if growth was needed and failed; the
    /// vector is unchanged in that case.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.emplace_back(move || value).map(|_| ())
    }

    /// Appends the value produced by `init`, constructing it directly in
    /// its slot, and returns a reference to it.
    ///
    /// When the block is full, the new element is constructed in the new
    /// block before anything else happens; if `init` panics the new block
    /// is released and the vector is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if growth was needed and failed.
    pub fn emplace_back<F>(&mut self, init: F) -> Result<&mut T>
    where
        F: FnOnce() -> T,
    {
        let len = self.len();

        if len == self.capacity() {
            let slots = growth::grown_capacity(len)?;
            self.raw.reallocate_inserting(slots, len, init)?;
            log_trace!("grew {} -> {} slots on append", len, slots);
        } else {
            // SAFETY: `len < capacity`, slot `len` is raw.
            unsafe {
                self.raw.alloc().construct(self.raw.end(), init);
                self.raw.set_len(len + 1);
            }
        }

        // SAFETY: slot `len` was constructed above.
        Ok(unsafe { &mut *self.raw.slot(len).as_ptr() })
    }

    /// Inserts `value` at `index`, shifting the tail up. Returns `index`.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if growth was needed and failed.
    ///
    /// # Panics
    ///
    /// Panics if `index > size()`.
    pub fn insert(&mut self, index: usize, value: T) -> Result<usize> {
        self.emplace(index, move || value)
    }

    /// Inserts the value produced by `init` at `index`, shifting the tail
    /// up. Returns `index`.
    ///
    /// Growth follows the append policy and has the same guarantee as
    /// [`emplace_back`](Self::emplace_back): the new element is built
    /// first, and a panic leaves the vector unchanged.
    ///
    /// # Errors
    ///
    /// Returns the allocation error if growth was needed and failed.
    ///
    /// # Panics
    ///
    /// Panics if `index > size()`.
    pub fn emplace<F>(&mut self, index: usize, init: F) -> Result<usize>
    where
        F: FnOnce() -> T,
    {
        let len = self.len();
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );

        if len == self.capacity() {
            let slots = growth::grown_capacity(len)?;
            self.raw.reallocate_inserting(slots, index, init)?;
            log_trace!(
                "grew {} -> {} slots on insert at {}",
                len,
                slots,
                index
            );
        } else {
            let value = init();

            // SAFETY: `len < capacity`, so there is room to shift the tail
            // up by one. Only `[0, index)` is claimed while the hole
            // exists.
            unsafe {
                self.raw.set_len(index);
                let slot = self.raw.slot(index);
                ptr::copy(slot.as_ptr(), slot.as_ptr().add(1), len - index);
                self.raw.alloc().construct(slot, move || value);
                self.raw.set_len(len + 1);
            }
        }

        Ok(index)
    }

    /// Grows to `n` elements by appending clones of `value`, or shrinks
    /// to `n` by popping from the back.
    ///
    /// Each append obeys the growth policy on its own; capacity never
    /// shrinks.
    ///
    /// # Errors
    ///
    /// Returns the allocation error of the append that failed. Elements
    /// appended before it are kept.
    pub fn resize(&mut self, n: usize, value: T) -> Result<()>
    where
        T: Clone,
    {
        if n > self.len() {
            while self.len() + 1 < n {
                self.push_back(value.clone())?;
            }
            self.push_back(value)?;
        } else {
            while self.len() > n {
                self.pop_back();
            }
        }
        Ok(())
    }

    /// Appends clones of every element of `items`.
    ///
    /// # Errors
    ///
    /// Returns the allocation error; the vector is unchanged in that case.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<()>
    where
        T: Clone,
    {
        let needed = self
            .len()
            .checked_add(items.len())
            .ok_or(Error::CapacityOverflow {
                requested: usize::MAX,
            })?;
        self.reserve(needed)?;

        for item in items {
            // SAFETY: capacity was reserved above, slot `len` is raw.
            unsafe {
                let len = self.len();
                self.raw.alloc().construct(self.raw.end(), || item.clone());
                self.raw.set_len(len + 1);
            }
        }
        Ok(())
    }
}

impl<T, A: AllocStrategy<T>> Drop for Vector<T, A> {
    fn drop(&mut self) {
        self.clear();
        // `self.raw` releases the block.
    }
}

impl<T, A: AllocStrategy<T> + Default> Default for Vector<T, A> {
    fn default() -> Self {
        Self::new_in(A::default())
    }
}

impl<T, A: AllocStrategy<T>> Deref for Vector<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: AllocStrategy<T>> DerefMut for Vector<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, I, A> Index<I> for Vector<T, A>
where
    I: SliceIndex<[T]>,
    A: AllocStrategy<T>,
{
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, I, A> IndexMut<I> for Vector<T, A>
where
    I: SliceIndex<[T]>,
    A: AllocStrategy<T>,
{
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T, U, A, B> PartialEq<Vector<U, B>> for Vector<T, A>
where
    T: PartialEq<U>,
    A: AllocStrategy<T>,
    B: AllocStrategy<U>,
{
    fn eq(&self, other: &Vector<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U, A> PartialEq<[U]> for Vector<T, A>
where
    T: PartialEq<U>,
    A: AllocStrategy<T>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A> PartialEq<&[U]> for Vector<T, A>
where
    T: PartialEq<U>,
    A: AllocStrategy<T>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, A, const N: usize> PartialEq<[U; N]> for Vector<T, A>
where
    T: PartialEq<U>,
    A: AllocStrategy<T>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: AllocStrategy<T>> Eq for Vector<T, A> {}

impl<T: Hash, A: AllocStrategy<T>> Hash for Vector<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T: fmt::Debug, A: AllocStrategy<T>> fmt::Debug for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

/// # Panics
///
/// Panics if the block cannot be allocated.
impl<T, const N: usize> From<[T; N]> for Vector<T> {
    fn from(items: [T; N]) -> Self {
        let raw = or_panic(RawStorage::with_capacity(StdAlloc, N), "from");
        let mut guard = ConstructGuard::new(raw);
        for item in items {
            guard.construct_next(move || item);
        }

        Vector {
            raw: guard.finish(),
        }
    }
}

/// # Panics
///
/// Panics if the block cannot be allocated.
impl<T: Clone> From<&[T]> for Vector<T> {
    fn from(items: &[T]) -> Self {
        or_panic(Self::from_slice(items), "from")
    }
}
