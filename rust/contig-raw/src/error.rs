use thiserror::Error;

/// Failure to obtain a storage block from the system allocator.
///
/// Allocation failures always propagate to the caller of the operation that
/// triggered them; nothing in this crate retries or silently degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// The requested element count produces a byte size that is not
    /// representable as a valid allocation layout.
    #[error("requested capacity overflows the maximum allocation size")]
    CapacityOverflow,

    /// The system allocator could not provide the requested block.
    #[error("failed to allocate {size} bytes (alignment {align})")]
    Exhausted {
        /// Requested allocation size in bytes.
        size: usize,
        /// Requested allocation alignment in bytes.
        align: usize,
    },
}
