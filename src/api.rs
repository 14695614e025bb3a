//! Public C ABI - malloc / free / realloc / calloc
//!
//! Every function here takes the single global lock for the duration of
//! its bookkeeping, with one exception: `realloc`'s allocate-copy-free
//! fallback drops the lock before calling back into `malloc`/`free`, since
//! those re-acquire it themselves. No `AllocError` ever crosses this
//! boundary; failures collapse to the C contract's null pointer or silent
//! no-op.

use crate::heap::registry::{self, normalize_size};
use crate::logging::log_operation;
use std::ffi::c_void;
use std::ptr;

/// Allocate `size` bytes, uninitialized, aligned to the allocator's
/// pointer alignment. Returns null on failure or when `size` exceeds the
/// allocator's cap; a `size` of zero still returns a valid, freeable
/// pointer backed by a minimum-size block.
///
/// # Safety
/// Callable from any thread. The returned pointer, if non-null, must
/// eventually be passed to at most one of `free` or `realloc`.
#[no_mangle]
pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
    let ptr = malloc_inner(size);
    log_operation("malloc", ptr as usize, size);
    ptr
}

fn malloc_inner(size: usize) -> *mut c_void {
    if size > crate::heap::provider::max_alloc_size() {
        return ptr::null_mut();
    }
    let normalized = normalize_size(size);

    let mut registry = registry::lock();
    match registry.allocate(normalized) {
        Ok((index, payload_offset)) => {
            let base = registry.region_mut(index).base();
            (base + payload_offset) as *mut c_void
        }
        Err(_) => ptr::null_mut(),
    }
}

/// Release a pointer previously returned by `malloc`, `calloc`, or
/// `realloc`. A null pointer is a silent no-op, matching the C contract.
///
/// # Safety
/// `ptr` must be null or a pointer this allocator handed out and not
/// already freed.
#[no_mangle]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
    log_operation("free", ptr as usize, 0);
    if ptr.is_null() {
        return;
    }

    let mut registry = registry::lock();
    if let Ok(handle) = registry.locate(ptr as usize) {
        let _ = registry.free(handle);
    }
}

/// Resize the allocation at `ptr` to `new_size` bytes, preserving the
/// lesser of the old and new sizes' worth of content. `ptr` of null
/// behaves as `malloc(new_size)`; `new_size` of zero behaves as
/// `free(ptr)` followed by returning null.
///
/// # Safety
/// `ptr` must be null or a live pointer from this allocator.
#[no_mangle]
pub unsafe extern "C" fn realloc(ptr: *mut c_void, new_size: usize) -> *mut c_void {
    let result = realloc_inner(ptr, new_size);
    log_operation("realloc", result as usize, new_size);
    result
}

fn realloc_inner(ptr: *mut c_void, new_size: usize) -> *mut c_void {
    if ptr.is_null() {
        return malloc_inner(new_size);
    }
    if new_size == 0 {
        unsafe { free(ptr) };
        return ptr::null_mut();
    }
    if new_size > crate::heap::provider::max_alloc_size() {
        return ptr::null_mut();
    }

    let normalized = normalize_size(new_size);
    let address = ptr as usize;

    {
        let mut registry = registry::lock();
        let handle = match registry.locate(address) {
            Ok(handle) => handle,
            Err(_) => return ptr::null_mut(),
        };
        let old_size = match registry.payload_size(&handle) {
            Ok(size) => size,
            Err(_) => return ptr::null_mut(),
        };

        if normalized <= old_size {
            registry.shrink_in_place(&handle, normalized);
            return ptr;
        }
        if registry.try_grow_in_place(&handle, normalized) {
            return ptr;
        }
        // Falling through drops `registry` at the end of this block before
        // the allocate-copy-free fallback below re-enters the lock.
    }

    let new_ptr = malloc_inner(new_size);
    if new_ptr.is_null() {
        return ptr::null_mut();
    }

    let old_size = {
        let mut registry = registry::lock();
        match registry.locate(address).and_then(|h| registry.payload_size(&h)) {
            Ok(size) => size,
            Err(_) => return ptr::null_mut(),
        }
    };
    let copy_size = old_size.min(new_size);
    unsafe {
        ptr::copy_nonoverlapping(ptr as *const u8, new_ptr as *mut u8, copy_size);
        free(ptr);
    }
    new_ptr
}

/// Allocate an array of `nmemb` elements of `size` bytes each,
/// zero-initialized. Returns null (without allocating) if `nmemb * size`
/// would overflow `usize`.
///
/// # Safety
/// Same contract as `malloc`.
#[no_mangle]
pub unsafe extern "C" fn calloc(nmemb: usize, size: usize) -> *mut c_void {
    if nmemb > 0 && size > usize::MAX / nmemb {
        log_operation("calloc", 0, 0);
        return ptr::null_mut();
    }
    let total = nmemb * size;
    let ptr = malloc_inner(total);
    if !ptr.is_null() {
        unsafe { ptr::write_bytes(ptr as *mut u8, 0, total) };
    }
    log_operation("calloc", ptr as usize, total);
    ptr
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malloc_free_round_trip() {
        unsafe {
            let p = malloc(128);
            assert!(!p.is_null());
            free(p);
        }
    }

    #[test]
    fn malloc_zero_returns_freeable_pointer() {
        unsafe {
            let p = malloc(0);
            assert!(!p.is_null());
            free(p);
        }
    }

    #[test]
    fn free_null_is_noop() {
        unsafe { free(ptr::null_mut()) };
    }

    #[test]
    fn realloc_null_behaves_as_malloc() {
        unsafe {
            let p = realloc(ptr::null_mut(), 64);
            assert!(!p.is_null());
            free(p);
        }
    }

    #[test]
    fn realloc_zero_frees_and_returns_null() {
        unsafe {
            let p = malloc(64);
            let result = realloc(p, 0);
            assert!(result.is_null());
        }
    }

    #[test]
    fn realloc_grow_preserves_content() {
        unsafe {
            let p = malloc(16) as *mut u8;
            for i in 0..16u8 {
                *p.add(i as usize) = i;
            }
            let grown = realloc(p as *mut c_void, 256) as *mut u8;
            assert!(!grown.is_null());
            for i in 0..16u8 {
                assert_eq!(*grown.add(i as usize), i);
            }
            free(grown as *mut c_void);
        }
    }

    #[test]
    fn realloc_shrink_in_place_preserves_content() {
        unsafe {
            let p = malloc(256) as *mut u8;
            *p = 0xAB;
            let shrunk = realloc(p as *mut c_void, 16) as *mut u8;
            assert!(!shrunk.is_null());
            assert_eq!(*shrunk, 0xAB);
            free(shrunk as *mut c_void);
        }
    }

    #[test]
    fn calloc_zeroes_memory() {
        unsafe {
            let p = calloc(16, 4) as *mut u8;
            assert!(!p.is_null());
            for i in 0..64 {
                assert_eq!(*p.add(i), 0);
            }
            free(p as *mut c_void);
        }
    }

    #[test]
    fn calloc_overflow_returns_null() {
        unsafe {
            let p = calloc(usize::MAX, 2);
            assert!(p.is_null());
        }
    }
}
