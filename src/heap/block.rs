//! Block Manager - Intrusive Free List Within a Region
//!
//! Every block is a fixed-size header immediately followed by its payload,
//! laid out back-to-back inside a region's mapping. Blocks never reference
//! each other through pointers: `next`/`prev` are byte offsets from the
//! region's base address, and [`NONE`] stands in for a null link. This is
//! the one place in the crate that reaches for raw pointer casts over the
//! mapping's bytes; everything above this module only ever talks in terms
//! of offsets and region references.

use crate::config::{align_up, ALIGNMENT, MAGIC_NUMBER};
use crate::error::{AllocError, Result};
use crate::heap::region::Region;
use std::mem::size_of;

/// Sentinel meaning "no block" for a `next`/`prev` link.
const NONE: usize = usize::MAX;

/// On-disk (in-mapping) block header. `repr(C)` pins the layout so that
/// the header size used for arithmetic matches the header size actually
/// written to memory.
#[repr(C)]
struct BlockHeader {
    magic: u32,
    free: u32,
    size: usize,
    next: usize,
    prev: usize,
}

pub const BLOCK_HEADER_SIZE: usize = size_of::<BlockHeader>();

/// Smallest payload a split-off remainder block may have. Below this, a
/// split would produce a block too small to ever satisfy a real request,
/// so the surplus is left attached to the allocated block instead.
const MIN_SPLIT_PAYLOAD: usize = ALIGNMENT;

#[inline]
unsafe fn header_ptr(region: &mut Region, offset: usize) -> *mut BlockHeader {
    region.as_mut_ptr().add(offset) as *mut BlockHeader
}

#[inline]
unsafe fn check_magic(header: *const BlockHeader, offset: usize) -> Result<()> {
    if (*header).magic != MAGIC_NUMBER {
        return Err(AllocError::InvalidPointer { address: offset });
    }
    Ok(())
}

/// Offset of the payload belonging to the block header at `offset`.
pub fn payload_offset(offset: usize) -> usize {
    offset + BLOCK_HEADER_SIZE
}

/// Initialize the region's entire capacity as a single free block.
pub fn init_first_block(region: &mut Region, capacity: usize) {
    let payload = capacity - BLOCK_HEADER_SIZE;
    unsafe {
        let header = header_ptr(region, 0);
        header.write(BlockHeader {
            magic: MAGIC_NUMBER,
            free: 1,
            size: payload,
            next: NONE,
            prev: NONE,
        });
    }
    region.set_first_block_offset(0);
}

/// First-fit scan for a free block whose payload can hold `size` bytes.
/// Returns the offset of the block header, not the payload.
pub fn find_free(region: &mut Region, size: usize) -> Option<usize> {
    let mut cursor = region.first_block_offset();
    while cursor != NONE {
        let header = unsafe { header_ptr(region, cursor) };
        let (free, blk_size, next) = unsafe { ((*header).free != 0, (*header).size, (*header).next) };
        if free && blk_size >= size {
            return Some(cursor);
        }
        cursor = next;
    }
    None
}

/// Mark the block at `offset` in-use and, if the leftover space is large
/// enough to host another block, split it off as a new free block linked
/// in right after. Returns the (possibly narrowed) payload size actually
/// reserved for the caller.
pub fn allocate_at(region: &mut Region, offset: usize, requested: usize) -> usize {
    unsafe {
        let header = header_ptr(region, offset);
        let available = (*header).size;
        let surplus = available - requested;
        let split_threshold = align_up(BLOCK_HEADER_SIZE + MIN_SPLIT_PAYLOAD, ALIGNMENT);

        if surplus >= split_threshold {
            let new_offset = offset + BLOCK_HEADER_SIZE + requested;
            let new_payload = surplus - BLOCK_HEADER_SIZE;
            let old_next = (*header).next;

            let new_header = header_ptr(region, new_offset);
            new_header.write(BlockHeader {
                magic: MAGIC_NUMBER,
                free: 1,
                size: new_payload,
                next: old_next,
                prev: offset,
            });
            if old_next != NONE {
                (*header_ptr(region, old_next)).prev = new_offset;
            }

            (*header).next = new_offset;
            (*header).size = requested;
            region.add_free_bytes(-(BLOCK_HEADER_SIZE as isize));
        }

        (*header).free = 0;
        region.add_free_bytes(-((*header).size as isize));
        region.inc_used_blocks();
        (*header).size
    }
}

/// Mark the block at `offset` free and coalesce with an immediately
/// adjacent free neighbor on either side. Returns the offset of the
/// (possibly merged) free block.
pub fn free_at(region: &mut Region, offset: usize) -> Result<usize> {
    unsafe {
        let header = header_ptr(region, offset);
        check_magic(header, offset)?;
        if (*header).free != 0 {
            return Err(AllocError::Internal(format!(
                "double free at offset {offset:#x}"
            )));
        }
        (*header).free = 1;
        region.add_free_bytes((*header).size as isize);
        region.dec_used_blocks();
    }

    let merged = coalesce_forward(region, offset);
    Ok(coalesce_backward(region, merged))
}

fn coalesce_forward(region: &mut Region, offset: usize) -> usize {
    unsafe {
        let header = header_ptr(region, offset);
        let next = (*header).next;
        if next == NONE {
            return offset;
        }
        let next_header = header_ptr(region, next);
        if (*next_header).free == 0 {
            return offset;
        }

        let merged_size = (*header).size + BLOCK_HEADER_SIZE + (*next_header).size;
        let next_next = (*next_header).next;
        (*header).size = merged_size;
        (*header).next = next_next;
        if next_next != NONE {
            (*header_ptr(region, next_next)).prev = offset;
        }
        region.add_free_bytes(BLOCK_HEADER_SIZE as isize);
        offset
    }
}

fn coalesce_backward(region: &mut Region, offset: usize) -> usize {
    unsafe {
        let header = header_ptr(region, offset);
        let prev = (*header).prev;
        if prev == NONE {
            return offset;
        }
        let prev_header = header_ptr(region, prev);
        if (*prev_header).free == 0 {
            return offset;
        }

        let merged_size = (*prev_header).size + BLOCK_HEADER_SIZE + (*header).size;
        let next = (*header).next;
        (*prev_header).size = merged_size;
        (*prev_header).next = next;
        if next != NONE {
            (*header_ptr(region, next)).prev = prev;
        }
        region.add_free_bytes(BLOCK_HEADER_SIZE as isize);
        prev
    }
}

/// Offset of the block physically following `offset`, or `None` at the
/// end of the chain. Used only by the introspection dumpers, which walk
/// every block (free or in-use) rather than stopping at the first match.
pub fn next_offset(region: &mut Region, offset: usize) -> Option<usize> {
    let next = unsafe { (*header_ptr(region, offset)).next };
    if next == NONE {
        None
    } else {
        Some(next)
    }
}

/// Whether the block at `offset` is currently free. Callers are expected
/// to already know `offset` names a live header (e.g. from chain
/// traversal); this performs no magic-word validation.
pub fn is_free(region: &mut Region, offset: usize) -> bool {
    unsafe { (*header_ptr(region, offset)).free != 0 }
}

/// Payload size of the block at `offset`, free or in-use, with no magic
/// check. Used by the introspection dumpers during chain traversal.
pub fn block_size(region: &mut Region, offset: usize) -> usize {
    unsafe { (*header_ptr(region, offset)).size }
}

/// Validate `offset` as a live, in-use block header and return its
/// payload size.
pub fn payload_size(region: &mut Region, offset: usize) -> Result<usize> {
    unsafe {
        let header = header_ptr(region, offset);
        check_magic(header, offset)?;
        if (*header).free != 0 {
            return Err(AllocError::InvalidPointer { address: offset });
        }
        Ok((*header).size)
    }
}

/// Shrink the in-use block at `offset` to `new_size` in place, splitting
/// off the surplus as a new free block when there is enough of it.
/// `new_size` must be no larger than the block's current payload size.
pub fn shrink_in_place(region: &mut Region, offset: usize, new_size: usize) {
    unsafe {
        let header = header_ptr(region, offset);
        debug_assert!(new_size <= (*header).size);
        let surplus = (*header).size - new_size;
        let split_threshold = align_up(BLOCK_HEADER_SIZE + MIN_SPLIT_PAYLOAD, ALIGNMENT);
        if surplus < split_threshold {
            return;
        }

        let new_offset = offset + BLOCK_HEADER_SIZE + new_size;
        let new_payload = surplus - BLOCK_HEADER_SIZE;
        let old_next = (*header).next;

        let new_header = header_ptr(region, new_offset);
        new_header.write(BlockHeader {
            magic: MAGIC_NUMBER,
            free: 1,
            size: new_payload,
            next: old_next,
            prev: offset,
        });
        if old_next != NONE {
            (*header_ptr(region, old_next)).prev = new_offset;
        }

        (*header).next = new_offset;
        (*header).size = new_size;
        region.add_free_bytes(new_payload as isize);
    }

    coalesce_forward(region, {
        let header = unsafe { header_ptr(region, offset) };
        unsafe { (*header).next }
    });
}

/// Attempt to grow the in-use block at `offset` to `new_size` by absorbing
/// its immediate forward neighbor, provided that neighbor is free and the
/// combined payload is large enough. Splits off any surplus past
/// `new_size` just like [`allocate_at`]. Returns `false` (no state changed)
/// when the forward neighbor is absent, in-use, or too small.
pub fn try_grow_in_place(region: &mut Region, offset: usize, new_size: usize) -> bool {
    let next_payload = unsafe {
        let header = header_ptr(region, offset);
        let current = (*header).size;
        let next = (*header).next;
        if next == NONE {
            return false;
        }
        let next_header = header_ptr(region, next);
        if (*next_header).free == 0 {
            return false;
        }
        let available = current + BLOCK_HEADER_SIZE + (*next_header).size;
        if available < new_size {
            return false;
        }

        let next_payload = (*next_header).size;
        let next_next = (*next_header).next;
        (*header).size = available;
        (*header).next = next_next;
        if next_next != NONE {
            (*header_ptr(region, next_next)).prev = offset;
        }
        next_payload
    };
    region.add_free_bytes(-(next_payload as isize));
    shrink_in_place(region, offset, new_size);
    true
}
