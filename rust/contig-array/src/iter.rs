//! By-value iteration over a [`DynArray`](crate::DynArray).

use contig_raw::RawBuffer;

/// An iterator that moves elements out of a `DynArray`.
///
/// The iterator takes over the array's storage block; elements are read out
/// of their slots one at a time from either end. Dropping the iterator
/// drops the elements that were not consumed, then releases the block.
pub struct IntoIter<T> {
    buf: RawBuffer<T>,
    /// Index of the next front element.
    front: usize,
    /// One past the index of the next back element.
    back: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn from_raw_parts(buf: RawBuffer<T>, len: usize) -> IntoIter<T> {
        IntoIter {
            buf,
            front: 0,
            back: len,
        }
    }

    /// Returns the remaining elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        unsafe {
            std::slice::from_raw_parts(self.buf.slot_ptr(self.front), self.back - self.front)
        }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        let value = unsafe { self.buf.slot_ptr(self.front).read() };
        self.front += 1;
        Some(value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        Some(unsafe { self.buf.slot_ptr(self.back).read() })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> std::iter::FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // Unconsumed elements first, then RawBuffer releases the block.
        unsafe {
            let remaining = std::ptr::slice_from_raw_parts_mut(
                self.buf.slot_ptr(self.front),
                self.back - self.front,
            );
            std::ptr::drop_in_place(remaining);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
