//! A growable contiguous array built on raw storage ownership.
//!
//! This crate provides [`DynArray<T>`], a vector-like container layered on
//! top of [`contig_raw::RawBuffer`]. The split of responsibilities follows
//! the storage/lifetime separation that makes the container tractable:
//!
//! - `RawBuffer` owns a fixed-capacity block of uninitialized slots and
//!   knows nothing about live values.
//! - `DynArray` tracks which slots hold live elements, constructs and drops
//!   them, and implements growth, insertion and removal on top of raw slot
//!   access.
//!
//! Every operation that needs a larger block builds the replacement block
//! fully before swapping it in, so a failed allocation (or a panicking
//! element operation) leaves the previously committed state untouched.
//!
//! Allocation failures are recoverable: the `try_` variants of the mutating
//! operations return [`AllocError`] instead of aborting, while the plain
//! variants match `std` behavior (panic on capacity overflow, allocator
//! error hook on exhaustion).

pub mod array;
pub mod iter;

pub use array::DynArray;
pub use contig_raw::AllocError;
pub use iter::IntoIter;
