//! Raw, fixed-capacity element storage.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::AllocError;

/// Exclusive owner of a raw storage block sized for `capacity` elements
/// of `T`.
///
/// The block is pure uninitialized storage: `RawBuffer` never constructs or
/// drops a `T`, and the caller is responsible for tracking which slots hold
/// live values. Dropping the buffer releases the block with the exact layout
/// used at allocation and nothing else.
///
/// A buffer with capacity 0 (and any buffer of a zero-sized element type)
/// owns no allocation; its pointer is dangling but well-aligned.
///
/// `RawBuffer` is movable but deliberately not cloneable: duplicating raw
/// storage without element semantics has no meaning.
pub struct RawBuffer<T> {
    /// Start of the owned block, or a dangling pointer when nothing is
    /// allocated.
    ptr: NonNull<T>,
    /// Number of element slots the block can hold.
    cap: usize,
    /// Marks this type as an owner of `T` storage.
    _marker: PhantomData<T>,
}

impl<T> RawBuffer<T> {
    /// Creates an empty buffer with capacity 0 and no allocation.
    pub const fn new() -> RawBuffer<T> {
        RawBuffer {
            ptr: NonNull::dangling(),
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates a block able to hold exactly `capacity` elements.
    ///
    /// The allocation happens immediately; there is no lazy growth. A
    /// request for capacity 0, or any request for a zero-sized element
    /// type, performs no allocation at all (the reported capacity is still
    /// the requested one, since zero-sized slots need no backing memory).
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::CapacityOverflow`] if `capacity` elements do
    /// not fit in a valid allocation layout, and [`AllocError::Exhausted`]
    /// if the system allocator refuses the request. Failures propagate to
    /// the caller; this function never aborts on its own.
    pub fn allocate(capacity: usize) -> Result<RawBuffer<T>, AllocError> {
        if capacity == 0 || std::mem::size_of::<T>() == 0 {
            return Ok(RawBuffer {
                ptr: NonNull::dangling(),
                cap: capacity,
                _marker: PhantomData,
            });
        }
        let layout =
            Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow)?;
        let ptr = unsafe { std::alloc::alloc(layout) };
        match NonNull::new(ptr as *mut T) {
            Some(ptr) => Ok(RawBuffer {
                ptr,
                cap: capacity,
                _marker: PhantomData,
            }),
            None => Err(AllocError::Exhausted {
                size: layout.size(),
                align: layout.align(),
            }),
        }
    }

    /// Returns the number of element slots in the owned block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns a raw pointer to the start of the block.
    ///
    /// The pointer is dangling (but aligned) when the capacity is 0 or `T`
    /// is zero-sized. The caller must not access slots beyond the capacity
    /// and must not use the pointer after the buffer is dropped.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns the raw address of slot `index`.
    ///
    /// `index == capacity` yields the one-past-the-end address, which is
    /// valid to compute but not to access. Passing a larger index is a
    /// contract violation; it is checked in debug builds only.
    #[inline]
    pub fn slot_ptr(&self, index: usize) -> *mut T {
        debug_assert!(index <= self.cap);
        unsafe { self.ptr.as_ptr().add(index) }
    }

    /// Exchanges the owned blocks and capacities of two buffers.
    ///
    /// Constant time, no allocation, cannot fail.
    #[inline]
    pub fn swap(&mut self, other: &mut RawBuffer<T>) {
        std::mem::swap(self, other);
    }

    /// Moves the owned block out, leaving this buffer empty (capacity 0,
    /// no allocation).
    #[inline]
    pub fn take(&mut self) -> RawBuffer<T> {
        std::mem::replace(self, RawBuffer::new())
    }
}

impl<T> Default for RawBuffer<T> {
    fn default() -> Self {
        RawBuffer::new()
    }
}

impl<T> Drop for RawBuffer<T> {
    /// Releases the owned block back to the system allocator.
    ///
    /// Element destructors are never invoked here; any live values in the
    /// block must have been dropped by the owner beforehand.
    fn drop(&mut self) {
        if self.cap != 0 && std::mem::size_of::<T>() != 0 {
            // The same layout computation succeeded at allocation time.
            let layout = Layout::array::<T>(self.cap).expect("buffer layout");
            unsafe {
                std::alloc::dealloc(self.ptr.as_ptr() as *mut u8, layout);
            }
        }
    }
}

// SAFETY: RawBuffer exclusively owns its block, so sending it to another
// thread moves the storage (and responsibility for any values the caller
// placed in it) along with it.
unsafe impl<T: Send> Send for RawBuffer<T> {}

// SAFETY: shared references to RawBuffer expose only the pointer and
// capacity; any access to element values goes through the caller's own
// synchronization.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> std::fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.ptr)
            .field("capacity", &self.cap)
            .finish()
    }
}
