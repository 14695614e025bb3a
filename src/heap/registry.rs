//! Registry - The Single Global Lock Guarding All Regions
//!
//! One `parking_lot::Mutex` protects the entire list of regions across
//! every size class. `lazy_static` gives us the one-time initialization
//! the C lineage tracked with a separate `initialized` boolean: the first
//! thread to touch the registry runs `Registry::new`, every later thread
//! just blocks on the mutex like any other call.

use crate::config::ALIGNMENT;
use crate::error::{AllocError, Result};
use crate::heap::block;
use crate::heap::region::{Region, RegionClass};
use lazy_static::lazy_static;
use parking_lot::{Mutex, MutexGuard};

lazy_static! {
    static ref REGISTRY: Mutex<Registry> = Mutex::new(Registry::new());
}

/// Acquire the single global lock. Every public API entry point takes
/// this exactly once per call (realloc's fallback path is the one
/// exception: it drops and reacquires around a nested malloc/free).
pub fn lock() -> MutexGuard<'static, Registry> {
    REGISTRY.lock()
}

/// A located block: which region it lives in and its header offset
/// within that region.
pub struct Handle {
    pub region_index: usize,
    pub offset: usize,
}

pub struct Registry {
    regions: Vec<Region>,
}

impl Registry {
    fn new() -> Registry {
        Registry { regions: Vec::new() }
    }

    /// Serve a payload allocation of `size` bytes (already aligned by the
    /// caller). Creates a new region when no existing Tiny/Small region
    /// has room, or always for Large.
    pub fn allocate(&mut self, size: usize) -> Result<(usize, usize)> {
        let class = RegionClass::classify(size);

        if class == RegionClass::Large {
            let mut region = Region::new_large(size)?;
            let offset = region.first_block_offset();
            let got = block::allocate_at(&mut region, offset, size);
            debug_assert_eq!(got, size);
            self.regions.push(region);
            let index = self.regions.len() - 1;
            return Ok((index, block::payload_offset(offset)));
        }

        for (index, region) in self.regions.iter_mut().enumerate() {
            if region.class() != class {
                continue;
            }
            if let Some(offset) = block::find_free(region, size) {
                block::allocate_at(region, offset, size);
                return Ok((index, block::payload_offset(offset)));
            }
        }

        let mut region = Region::new_pooled(class)?;
        let offset = block::find_free(&mut region, size).ok_or_else(|| {
            AllocError::RegionAllocationFailed {
                reason: "freshly carved region has no room for its own max class".into(),
            }
        })?;
        block::allocate_at(&mut region, offset, size);
        self.regions.push(region);
        let index = self.regions.len() - 1;
        Ok((index, block::payload_offset(offset)))
    }

    /// Resolve a payload pointer address to the region/offset pair that
    /// owns it, validating that the address falls within some region's
    /// mapped span.
    pub fn locate(&mut self, address: usize) -> Result<Handle> {
        for (index, region) in self.regions.iter().enumerate() {
            let base = region.base();
            let end = base + region.len();
            if address >= base && address < end {
                let offset = match address.checked_sub(base + block::BLOCK_HEADER_SIZE) {
                    Some(offset) => offset,
                    None => return Err(AllocError::InvalidPointer { address }),
                };
                return Ok(Handle { region_index: index, offset });
            }
        }
        Err(AllocError::InvalidPointer { address })
    }

    pub fn region_mut(&mut self, index: usize) -> &mut Region {
        &mut self.regions[index]
    }

    /// Free the block at `handle`, coalescing within its region, and tear
    /// down the region entirely if it was a now-empty Large region.
    pub fn free(&mut self, handle: Handle) -> Result<()> {
        let region = &mut self.regions[handle.region_index];
        block::free_at(region, handle.offset)?;

        if region.is_releasable_large() {
            let region = self.regions.remove(handle.region_index);
            crate::heap::provider::release(region.into_mapping());
        }
        Ok(())
    }

    pub fn payload_size(&mut self, handle: &Handle) -> Result<usize> {
        let region = &mut self.regions[handle.region_index];
        block::payload_size(region, handle.offset)
    }

    pub fn shrink_in_place(&mut self, handle: &Handle, new_size: usize) {
        let region = &mut self.regions[handle.region_index];
        block::shrink_in_place(region, handle.offset, new_size);
    }

    /// Attempt to grow the block at `handle` in place by absorbing its
    /// free forward neighbor. Returns `false` if there is no such
    /// neighbor or it is too small, leaving the block untouched.
    pub fn try_grow_in_place(&mut self, handle: &Handle, new_size: usize) -> bool {
        let region = &mut self.regions[handle.region_index];
        block::try_grow_in_place(region, handle.offset, new_size)
    }

    /// Snapshot statistics for introspection: one entry per region plus
    /// grand totals, matching the ordering regions were created in.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }
}

/// Round a requested payload size up to the allocator's pointer alignment,
/// with a 1-byte floor so a zero-size request still gets a real block.
pub fn normalize_size(size: usize) -> usize {
    crate::config::align_up(size.max(1), ALIGNMENT)
}
