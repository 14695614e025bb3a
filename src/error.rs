//! Error Module - fmalloc Error Types
//!
//! Defines the internal error type used across the allocation engine.
//! None of this crosses the public C ABI: every public entry point
//! converts an `Err` into the external signal callers expect (null
//! pointer or a silent no-op) before returning.

use std::sync::PoisonError;
use thiserror::Error;

/// Internal error type for fmalloc operations.
#[derive(Debug, Error)]
pub enum AllocError {
    #[error("out of memory: requested {requested} bytes, available {available} bytes")]
    OutOfMemory { requested: usize, available: usize },

    #[error("requested size {requested} exceeds allocator cap {limit}")]
    TooLarge { requested: usize, limit: usize },

    #[error("size computation overflowed")]
    Overflow,

    #[error("invalid pointer: {address:#x}")]
    InvalidPointer { address: usize },

    #[error("region allocation failed: {reason}")]
    RegionAllocationFailed { reason: String },

    #[error("virtual memory error: {0}")]
    VirtualMemoryError(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl<T> From<PoisonError<T>> for AllocError {
    fn from(err: PoisonError<T>) -> Self {
        AllocError::LockPoisoned(err.to_string())
    }
}

/// Result type alias for fmalloc internal operations.
pub type Result<T> = std::result::Result<T, AllocError>;
