//! The growable array container.

use std::alloc::Layout;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut, Index, IndexMut};

use contig_raw::{AllocError, RawBuffer};

use crate::iter::IntoIter;

/// A growable contiguous array of `T`.
///
/// `DynArray` owns a [`RawBuffer`] plus a count of live elements. Slots
/// `[0, len)` hold initialized values, slots `[len, capacity)` are raw
/// storage. Appends are amortized constant time via capacity doubling.
///
/// # Failure behavior
///
/// Mutating operations that may allocate come in two spellings: `try_`
/// variants return [`AllocError`] on allocation failure and leave the array
/// unmodified, while the plain variants behave like `std` collections
/// (panic on capacity overflow, invoke the allocator error hook when the
/// system is out of memory).
///
/// Element operations (`clone`, `default`, caller-supplied closures) fail
/// by panicking. The container is panic-safe: whatever state a panic
/// escapes from is a valid array with no leaked or doubly-dropped elements,
/// and operations that build into a fresh block discard the half-built
/// block and keep the original contents fully intact.
///
/// # Indexing
///
/// `DynArray` dereferences to `[T]`, so the usual slice API applies:
/// `array[i]` is the checked (panicking) accessor, `array.get(i)` the
/// optional one, and `array.get_unchecked(i)` the unchecked one for callers
/// that validate indices themselves.
pub struct DynArray<T> {
    buf: RawBuffer<T>,
    len: usize,
}

impl<T> DynArray<T> {
    /// Creates an empty array without allocating.
    pub const fn new() -> DynArray<T> {
        DynArray {
            buf: RawBuffer::new(),
            len: 0,
        }
    }

    /// Creates an empty array with at least `capacity` slots preallocated.
    pub fn with_capacity(capacity: usize) -> DynArray<T> {
        Self::try_with_capacity(capacity).unwrap_or_else(|e| alloc_failed(e))
    }

    /// Fallible form of [`with_capacity`](Self::with_capacity).
    pub fn try_with_capacity(capacity: usize) -> Result<DynArray<T>, AllocError> {
        Ok(DynArray {
            buf: RawBuffer::allocate(capacity)?,
            len: 0,
        })
    }

    /// Creates an array of `len` elements produced by `f(index)`.
    ///
    /// If `f` panics partway through, the elements constructed so far are
    /// dropped and no array is observable: either the call fully succeeds
    /// or nothing exists.
    pub fn from_fn(len: usize, f: impl FnMut(usize) -> T) -> DynArray<T> {
        Self::try_from_fn(len, f).unwrap_or_else(|e| alloc_failed(e))
    }

    /// Fallible form of [`from_fn`](Self::from_fn).
    pub fn try_from_fn(
        len: usize,
        mut f: impl FnMut(usize) -> T,
    ) -> Result<DynArray<T>, AllocError> {
        let mut array: DynArray<T> = DynArray::try_with_capacity(len)?;
        for i in 0..len {
            unsafe { array.buf.slot_ptr(i).write(f(i)) };
            // Track the constructed prefix so an unwind in `f` drops
            // exactly the elements built so far.
            array.len = i + 1;
        }
        Ok(array)
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of slots the array can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns the live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Returns the live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.buf.as_ptr(), self.len) }
    }

    /// Returns a raw pointer to the first slot.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a mutable raw pointer to the first slot.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_ptr()
    }

    /// Ensures the capacity is at least `min_capacity`.
    ///
    /// Note that unlike `std`, the argument is the **absolute** minimum
    /// capacity, not an additional amount. Does nothing when the current
    /// capacity is already sufficient; the capacity never shrinks.
    ///
    /// Relocation moves the live elements into the new block and swaps it
    /// in only once fully populated, so a failed allocation leaves the
    /// array unmodified.
    pub fn reserve(&mut self, min_capacity: usize) {
        self.try_reserve(min_capacity)
            .unwrap_or_else(|e| alloc_failed(e))
    }

    /// Fallible form of [`reserve`](Self::reserve).
    pub fn try_reserve(&mut self, min_capacity: usize) -> Result<(), AllocError> {
        if min_capacity <= self.buf.capacity() {
            return Ok(());
        }
        let new_buf = RawBuffer::allocate(min_capacity)?;
        self.relocate_into(new_buf);
        Ok(())
    }

    /// Appends an element, growing the capacity if the array is full.
    ///
    /// Returns a reference to the appended element.
    pub fn push(&mut self, value: T) -> &mut T {
        match self.try_push(value) {
            Ok(r) => r,
            Err((e, _)) => alloc_failed(e),
        }
    }

    /// Fallible form of [`push`](Self::push).
    ///
    /// On allocation failure the array is left unmodified and the rejected
    /// value is handed back alongside the error.
    pub fn try_push(&mut self, value: T) -> Result<&mut T, (AllocError, T)> {
        if self.len == self.buf.capacity() {
            let new_buf = match self.grown_buffer() {
                Ok(buf) => buf,
                Err(e) => return Err((e, value)),
            };
            // The new element lands in the new block before any committed
            // state is touched.
            unsafe { new_buf.slot_ptr(self.len).write(value) };
            self.relocate_into(new_buf);
        } else {
            unsafe { self.buf.slot_ptr(self.len).write(value) };
        }
        self.len += 1;
        Ok(unsafe { &mut *self.buf.slot_ptr(self.len - 1) })
    }

    /// Removes and returns the last element, or `None` if the array is
    /// empty. Never fails and never reallocates.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.buf.slot_ptr(self.len).read() })
    }

    /// Inserts an element at `index`, shifting everything after it one slot
    /// to the right. Returns a reference to the inserted element.
    ///
    /// Without growth the shift is a single overlapping bitwise move; with
    /// growth the new block is populated around the inserted element and
    /// swapped in afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        match self.try_insert(index, value) {
            Ok(r) => r,
            Err((e, _)) => alloc_failed(e),
        }
    }

    /// Fallible form of [`insert`](Self::insert).
    ///
    /// On allocation failure the array is left unmodified and the rejected
    /// value is handed back alongside the error.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<&mut T, (AllocError, T)> {
        assert!(
            index <= self.len,
            "insert index {index} out of bounds (len {})",
            self.len
        );
        if self.len == self.buf.capacity() {
            let mut new_buf = match self.grown_buffer() {
                Ok(buf) => buf,
                Err(e) => return Err((e, value)),
            };
            unsafe {
                new_buf.slot_ptr(index).write(value);
                std::ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_ptr(), index);
                std::ptr::copy_nonoverlapping(
                    self.buf.slot_ptr(index),
                    new_buf.slot_ptr(index + 1),
                    self.len - index,
                );
            }
            // The old block's values were moved out bitwise; swapping
            // ownership releases only the raw storage.
            self.buf.swap(&mut new_buf);
        } else {
            unsafe {
                let p = self.buf.slot_ptr(index);
                std::ptr::copy(p, p.add(1), self.len - index);
                p.write(value);
            }
        }
        self.len += 1;
        Ok(unsafe { &mut *self.buf.slot_ptr(index) })
    }

    /// Removes and returns the element at `index`, shifting everything
    /// after it one slot to the left.
    ///
    /// The shift is a bitwise move, so this operation cannot fail partway.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "remove index {index} out of bounds (len {})",
            self.len
        );
        unsafe {
            let p = self.buf.slot_ptr(index);
            let value = p.read();
            std::ptr::copy(p.add(1), p, self.len - index - 1);
            self.len -= 1;
            value
        }
    }

    /// Shortens the array to at most `new_len` elements, dropping the tail.
    ///
    /// Does nothing when `new_len >= len`. The length is committed before
    /// the tail is dropped, so a panicking element destructor cannot leave
    /// dead elements observable.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail_len = self.len - new_len;
        self.len = new_len;
        unsafe {
            let tail =
                std::ptr::slice_from_raw_parts_mut(self.buf.slot_ptr(new_len), tail_len);
            std::ptr::drop_in_place(tail);
        }
    }

    /// Removes all elements, keeping the allocated capacity.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resizes the array to `new_len` elements, filling new slots with
    /// values produced by `f`.
    ///
    /// Growing reserves capacity first and then constructs the new tail in
    /// place; if `f` panics partway, the constructed part of the tail is
    /// dropped and the array keeps its original length and contents
    /// (capacity may still have grown). Shrinking drops the surplus tail.
    pub fn resize_with(&mut self, new_len: usize, f: impl FnMut() -> T) {
        self.try_resize_with(new_len, f)
            .unwrap_or_else(|e| alloc_failed(e))
    }

    /// Fallible form of [`resize_with`](Self::resize_with).
    pub fn try_resize_with(
        &mut self,
        new_len: usize,
        mut f: impl FnMut() -> T,
    ) -> Result<(), AllocError> {
        if new_len <= self.len {
            self.truncate(new_len);
            return Ok(());
        }
        self.try_reserve(new_len)?;
        let mut guard = TailGuard {
            buf: &self.buf,
            start: self.len,
            initialized: self.len,
        };
        while guard.initialized < new_len {
            unsafe { guard.buf.slot_ptr(guard.initialized).write(f()) };
            guard.initialized += 1;
        }
        std::mem::forget(guard);
        self.len = new_len;
        Ok(())
    }

    /// Grows the capacity for one more element: 1 from empty, double
    /// otherwise.
    fn grown_buffer(&self) -> Result<RawBuffer<T>, AllocError> {
        let new_cap = match self.buf.capacity() {
            0 => 1,
            cap => cap.checked_mul(2).ok_or(AllocError::CapacityOverflow)?,
        };
        RawBuffer::allocate(new_cap)
    }

    /// Moves the live elements into `new_buf` and takes ownership of it.
    ///
    /// The relocation is a bitwise move, guaranteed by the language not to
    /// fail, so the source block never ends up in a mixed half-moved state.
    /// The old block is released without running element destructors.
    fn relocate_into(&mut self, mut new_buf: RawBuffer<T>) {
        debug_assert!(new_buf.capacity() >= self.len);
        unsafe {
            std::ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_ptr(), self.len);
        }
        self.buf.swap(&mut new_buf);
    }
}

impl<T: Default> DynArray<T> {
    /// Creates an array of `len` default-constructed elements.
    pub fn with_len(len: usize) -> DynArray<T> {
        Self::from_fn(len, |_| T::default())
    }

    /// Fallible form of [`with_len`](Self::with_len).
    pub fn try_with_len(len: usize) -> Result<DynArray<T>, AllocError> {
        Self::try_from_fn(len, |_| T::default())
    }

    /// Resizes the array to `new_len` elements, default-constructing the
    /// new tail when growing and dropping the surplus when shrinking.
    pub fn resize(&mut self, new_len: usize) {
        self.resize_with(new_len, T::default);
    }

    /// Fallible form of [`resize`](Self::resize).
    pub fn try_resize(&mut self, new_len: usize) -> Result<(), AllocError> {
        self.try_resize_with(new_len, T::default)
    }
}

impl<T: Clone> DynArray<T> {
    /// Creates an array containing a clone of each element of `values`.
    pub fn from_slice(values: &[T]) -> DynArray<T> {
        Self::try_from_slice(values).unwrap_or_else(|e| alloc_failed(e))
    }

    /// Fallible form of [`from_slice`](Self::from_slice).
    pub fn try_from_slice(values: &[T]) -> Result<DynArray<T>, AllocError> {
        let mut array: DynArray<T> = DynArray::try_with_capacity(values.len())?;
        for value in values {
            unsafe { array.buf.slot_ptr(array.len).write(value.clone()) };
            array.len += 1;
        }
        Ok(array)
    }

    /// Appends a clone of each element of `values`.
    pub fn extend_from_slice(&mut self, values: &[T]) {
        self.try_extend_from_slice(values)
            .unwrap_or_else(|e| alloc_failed(e))
    }

    /// Fallible form of [`extend_from_slice`](Self::extend_from_slice).
    pub fn try_extend_from_slice(&mut self, values: &[T]) -> Result<(), AllocError> {
        let new_len = self
            .len
            .checked_add(values.len())
            .ok_or(AllocError::CapacityOverflow)?;
        if new_len > self.buf.capacity() {
            let doubled = self
                .buf
                .capacity()
                .checked_mul(2)
                .ok_or(AllocError::CapacityOverflow)?;
            self.try_reserve(new_len.max(doubled))?;
        }
        for value in values {
            unsafe { self.buf.slot_ptr(self.len).write(value.clone()) };
            self.len += 1;
        }
        Ok(())
    }
}

/// Drops the constructed part of a tail under construction when an element
/// constructor unwinds, restoring the array to its pre-operation length.
struct TailGuard<'a, T> {
    buf: &'a RawBuffer<T>,
    start: usize,
    initialized: usize,
}

impl<T> Drop for TailGuard<'_, T> {
    fn drop(&mut self) {
        unsafe {
            let tail = std::ptr::slice_from_raw_parts_mut(
                self.buf.slot_ptr(self.start),
                self.initialized - self.start,
            );
            std::ptr::drop_in_place(tail);
        }
    }
}

#[cold]
fn alloc_failed(err: AllocError) -> ! {
    match err {
        AllocError::CapacityOverflow => panic!("capacity overflow"),
        AllocError::Exhausted { size, align } => {
            let layout = Layout::from_size_align(size, align).expect("allocation layout");
            std::alloc::handle_alloc_error(layout)
        }
    }
}

impl<T> Drop for DynArray<T> {
    fn drop(&mut self) {
        // Live elements first, then RawBuffer releases the block.
        unsafe {
            std::ptr::drop_in_place(self.as_mut_slice() as *mut [T]);
        }
    }
}

impl<T> Default for DynArray<T> {
    fn default() -> Self {
        DynArray::new()
    }
}

impl<T: Clone> Clone for DynArray<T> {
    /// Produces an independent element-wise copy with capacity equal to the
    /// source length.
    fn clone(&self) -> Self {
        DynArray::from_slice(self.as_slice())
    }

    /// Copies `source` into `self`, reusing the existing block when it is
    /// large enough.
    ///
    /// The overlapping prefix is assigned element-wise in place, a missing
    /// tail is clone-constructed, and a surplus tail is dropped - avoiding
    /// the destructor/constructor churn of rebuilding from scratch. When
    /// the block is too small, a fresh copy replaces the whole state.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.buf.capacity() {
            *self = source.clone();
            return;
        }
        let overlap = self.len.min(source.len);
        self.as_mut_slice()[..overlap].clone_from_slice(&source.as_slice()[..overlap]);
        if source.len < self.len {
            self.truncate(source.len);
        } else {
            for i in self.len..source.len {
                unsafe { self.buf.slot_ptr(i).write(source.as_slice()[i].clone()) };
                self.len = i + 1;
            }
        }
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Index<usize> for DynArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for DynArray<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

impl<T> AsRef<[T]> for DynArray<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynArray<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Borrow<[T]> for DynArray<T> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DynArray").field(&self.as_slice()).finish()
    }
}

impl<T: PartialEq> PartialEq for DynArray<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}
impl<T: Eq> Eq for DynArray<T> {}

impl<T: PartialOrd> PartialOrd for DynArray<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}
impl<T: Ord> Ord for DynArray<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for DynArray<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T> Extend<T> for DynArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(self.len.saturating_add(iter.size_hint().0));
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for DynArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = DynArray::new();
        array.extend(iter);
        array
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    fn from(values: &[T]) -> Self {
        DynArray::from_slice(values)
    }
}

impl<'a, T> IntoIterator for &'a DynArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a mut DynArray<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T> IntoIterator for DynArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let mut this = std::mem::ManuallyDrop::new(self);
        let len = this.len;
        let buf = this.buf.take();
        IntoIter::from_raw_parts(buf, len)
    }
}
