//! Ownership of raw, uninitialized element storage.
//!
//! This crate provides [`RawBuffer<T>`], the allocation primitive underneath
//! the growable containers in `contig-array`. A `RawBuffer` owns a single
//! contiguous block sized for a fixed number of elements and nothing more:
//! it allocates the block on creation, releases it on drop, and hands out
//! raw slot pointers in between. It has no notion of which slots hold live
//! values - constructing and dropping elements is entirely the caller's
//! responsibility.
//!
//! Keeping block ownership separate from element lifetimes is what makes the
//! layered container tractable: the buffer can be created, swapped and
//! destroyed at any point without touching element state.

pub mod buffer;
pub mod error;

pub use buffer::RawBuffer;
pub use error::AllocError;
