//! Region Provider - Virtual Memory Acquisition
//!
//! Pure wrapper around the OS memory-mapping facility. Acquires and
//! releases page-aligned, anonymous, read/write mappings. Performs no
//! bookkeeping of its own; all region/block state lives in the registry
//! and block manager layers.

use crate::error::{AllocError, Result};
use memmap2::{MmapMut, MmapOptions};

/// Round `size` up to a whole number of OS pages.
pub fn align_to_page(size: usize) -> usize {
    let ps = page_size::get();
    (size + ps - 1) & !(ps - 1)
}

/// Current OS page size, in bytes.
pub fn os_page_size() -> usize {
    page_size::get()
}

/// A single OS mapping backing one region's entire arena.
///
/// Owns the mapping outright: dropping it `munmap`s the memory, which is
/// exactly the Large-region teardown path and, for the process lifetime
/// otherwise, never happens for Tiny/Small regions (they are leaked into
/// the registry's region list and simply never dropped).
pub struct MappedRegion {
    mmap: MmapMut,
}

impl MappedRegion {
    /// Base address of the mapping. This is also the region header's own
    /// address, per the data model.
    pub fn base(&self) -> usize {
        self.mmap.as_ptr() as usize
    }

    /// Mutable pointer to byte 0 of the mapping.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.mmap.as_mut_ptr()
    }

    /// Length of the mapping in bytes. Always a positive multiple of the
    /// page size.
    pub fn len(&self) -> usize {
        self.mmap.len()
    }
}

/// Request an anonymous, private, read/write mapping of exactly `length`
/// bytes. `length` must already be a positive multiple of the page size;
/// the registry is responsible for rounding before calling this.
pub fn acquire(length: usize) -> Result<MappedRegion> {
    debug_assert!(length > 0 && length % page_size::get() == 0);

    let mmap = MmapOptions::new().len(length).map_anon().map_err(|e| {
        AllocError::VirtualMemoryError(format!("mmap of {length} bytes failed: {e}"))
    })?;

    log::trace!("region provider acquired {length} bytes at {:#x}", mmap.as_ptr() as usize);
    Ok(MappedRegion { mmap })
}

/// Return a mapping to the OS. Used only when a Large region's last block
/// is freed; Tiny/Small regions are never released this way.
pub fn release(region: MappedRegion) {
    let base = region.base();
    let len = region.len();
    drop(region);
    log::trace!("region provider released {len} bytes at {base:#x}");
}

/// Upper bound on a single allocation's payload size: half of the
/// process's data-segment resource limit, or [`crate::config::FALLBACK_MAX_ALLOC_SIZE`]
/// when that limit cannot be queried or is reported as unlimited.
#[cfg(unix)]
pub fn max_alloc_size() -> usize {
    use crate::config::FALLBACK_MAX_ALLOC_SIZE;

    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    let rc = unsafe { libc::getrlimit(libc::RLIMIT_DATA, &mut limit) };
    if rc != 0 || limit.rlim_cur == libc::RLIM_INFINITY {
        return FALLBACK_MAX_ALLOC_SIZE;
    }
    ((limit.rlim_cur as u64) / 2) as usize
}

#[cfg(not(unix))]
pub fn max_alloc_size() -> usize {
    crate::config::FALLBACK_MAX_ALLOC_SIZE
}
