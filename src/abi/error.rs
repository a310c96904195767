//! Error types for linear-memory layout operations.

use thiserror::Error;

/// Errors that can occur while reading or writing the binary layout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("Memory access out of bounds: {len} bytes at {ptr} exceeds memory size {memory_size}")]
    OutOfBounds {
        ptr: u32,
        len: u32,
        memory_size: usize,
    },

    #[error("Invalid UTF-8 in string at {ptr}")]
    InvalidUtf8 { ptr: u32 },

    #[error("Pointer arithmetic overflowed at base {base}")]
    PointerOverflow { base: u32 },

    #[error("Length {0} does not fit in a 32-bit header")]
    LengthOverflow(usize),

    #[error("Array at {ptr} is full (capacity {capacity})")]
    CapacityExceeded { ptr: u32, capacity: u32 },
}
