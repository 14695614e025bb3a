//! Configuration Module - Compile-Time Allocator Constants
//!
//! Every parameter here is a compile-time constant. There is no runtime
//! configuration surface: the only thing a caller can tune is whether the
//! `debug-log` Cargo feature is enabled at build time.

/// Alignment every user pointer satisfies, in bytes.
pub const ALIGNMENT: usize = 16;

/// Largest allocation served out of a Tiny region.
pub const TINY_MAX_SIZE: usize = 128;

/// Largest allocation served out of a Small region. Anything above this
/// goes to a dedicated Large region.
pub const SMALL_MAX_SIZE: usize = 1024;

/// Every newly created Tiny/Small region is sized to hold at least this
/// many maximum-class allocations before falling back to the OS again.
pub const MIN_ALLOC_PER_REGION: usize = 100;

/// Sentinel written into every block header; a mismatch on recovery means
/// corruption or a pointer this allocator never handed out.
pub const MAGIC_NUMBER: u32 = 0xDEAD_BEEF;

/// Fallback allocation cap used when the data-segment resource limit
/// cannot be queried or is reported as unlimited.
pub const FALLBACK_MAX_ALLOC_SIZE: usize = 1024 * 1024 * 1024;

/// Round `size` up to the next multiple of `align` (`align` must be a
/// power of two).
#[inline]
pub const fn align_up(size: usize, align: usize) -> usize {
    (size + align - 1) & !(align - 1)
}

/// Round `size` down to the previous multiple of `align`.
#[inline]
pub const fn align_down(size: usize, align: usize) -> usize {
    size & !(align - 1)
}
