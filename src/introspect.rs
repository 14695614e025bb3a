//! Heap Introspection - show_alloc_mem / show_alloc_mem_ex
//!
//! Thin, read-only reporters over registry state. Neither function
//! mutates anything; both walk the same region/block chain the public
//! API uses, under the same lock, and format it to stdout.

use crate::heap::block;
use crate::heap::region::{Region, RegionClass};
use crate::heap::registry;
use std::io::Write;

fn class_label(class: RegionClass) -> &'static str {
    match class {
        RegionClass::Tiny => "TINY",
        RegionClass::Small => "SMALL",
        RegionClass::Large => "LARGE",
    }
}

struct BlockEntry {
    payload_start: usize,
    payload_end: usize,
    size: usize,
}

fn live_blocks_in(region: &mut Region) -> Vec<BlockEntry> {
    let mut entries = Vec::new();
    let base = region.base();
    let mut cursor = region.first_block_offset();

    loop {
        match block::payload_size(region, cursor) {
            Ok(size) => {
                let payload_start = base + block::payload_offset(cursor);
                entries.push(BlockEntry {
                    payload_start,
                    payload_end: payload_start + size - 1,
                    size,
                });
            }
            Err(_) => {}
        }
        match block::next_offset(region, cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    entries
}

/// Write the stable, line-oriented block summary to stdout.
///
/// # Safety
/// Callable from any thread; takes the global lock internally.
#[no_mangle]
pub unsafe extern "C" fn show_alloc_mem() {
    let mut registry = registry::lock();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut total = 0usize;

    let region_count = registry.regions().len();
    for index in 0..region_count {
        let region = registry.region_mut(index);
        let class = region.class();
        let base = region.base();
        let _ = writeln!(out, "{} : 0x{:X}", class_label(class), base);

        for entry in live_blocks_in(region) {
            let _ = writeln!(
                out,
                "0x{:X} - 0x{:X} : {} bytes",
                entry.payload_start, entry.payload_end, entry.size
            );
            total += entry.size;
        }
    }

    let _ = writeln!(out, "Total : {total} bytes");
}

/// Write the extended dump: per-block hex preview plus aggregate
/// fragmentation statistics.
///
/// # Safety
/// Callable from any thread; takes the global lock internally.
#[no_mangle]
pub unsafe extern "C" fn show_alloc_mem_ex() {
    let mut registry = registry::lock();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut total_regions = 0usize;
    let mut total_memory = 0usize;
    let mut bytes_used = 0usize;
    let mut bytes_free = 0usize;
    let mut total_blocks = 0usize;
    let mut free_blocks = 0usize;
    let mut largest_free_block = 0usize;

    let region_count = registry.regions().len();
    for index in 0..region_count {
        total_regions += 1;
        let region = registry.region_mut(index);
        let class = region.class();
        let base = region.base();
        total_memory += region.len();

        let _ = writeln!(out, "{} : 0x{:X}", class_label(class), base);

        let mut cursor = region.first_block_offset();
        loop {
            total_blocks += 1;
            let is_free = block::is_free(region, cursor);
            let size = block::block_size(region, cursor);
            if is_free {
                free_blocks += 1;
                bytes_free += size;
                largest_free_block = largest_free_block.max(size);
            } else {
                bytes_used += size;
                let payload_start = base + block::payload_offset(cursor);
                let _ = writeln!(
                    out,
                    "0x{:X} : Size {} : Magic 0x{:X}",
                    payload_start,
                    size,
                    crate::config::MAGIC_NUMBER
                );
                write_hex_dump(&mut out, region, cursor, size);
            }

            match block::next_offset(region, cursor) {
                Some(next) => cursor = next,
                None => break,
            }
        }
    }

    let usage_ratio = if total_memory > 0 {
        bytes_used as f64 / total_memory as f64 * 100.0
    } else {
        0.0
    };
    let fragmentation = if bytes_free > 0 {
        (1.0 - (largest_free_block as f64 / bytes_free as f64)) * 100.0
    } else {
        0.0
    };

    let _ = writeln!(out, "--- Statistics ---");
    let _ = writeln!(out, "Total regions : {total_regions}");
    let _ = writeln!(out, "Total memory : {total_memory} bytes");
    let _ = writeln!(out, "Bytes used : {bytes_used} bytes");
    let _ = writeln!(out, "Bytes free : {bytes_free} bytes");
    let _ = writeln!(out, "Usage ratio : {usage_ratio:.2}%");
    let _ = writeln!(out, "Total blocks : {total_blocks}");
    let _ = writeln!(out, "Free blocks : {free_blocks}");
    let _ = writeln!(out, "Fragmentation : {fragmentation:.2}%");
    let _ = writeln!(out, "Largest free block : {largest_free_block} bytes");
}

/// Canonical 16-bytes-per-line hex dump of up to the first 64 bytes of a
/// block's payload: address column, hex bytes, ASCII column with `.` for
/// non-printable bytes.
fn write_hex_dump(out: &mut impl Write, region: &mut Region, offset: usize, size: usize) {
    let dump_len = size.min(64);
    let base = region.base();
    let payload = unsafe {
        std::slice::from_raw_parts(
            region.as_mut_ptr().add(block::payload_offset(offset)),
            dump_len,
        )
    };
    let payload_addr = base + block::payload_offset(offset);

    for (line_index, chunk) in payload.chunks(16).enumerate() {
        let line_addr = payload_addr + line_index * 16;
        let _ = write!(out, "0x{line_addr:X} :");
        for byte in chunk {
            let _ = write!(out, " {byte:02X}");
        }
        for _ in chunk.len()..16 {
            let _ = write!(out, "   ");
        }
        let _ = write!(out, " | ");
        for byte in chunk {
            let c = if byte.is_ascii_graphic() || *byte == b' ' {
                *byte as char
            } else {
                '.'
            };
            let _ = write!(out, "{c}");
        }
        let _ = writeln!(out);
    }
}
