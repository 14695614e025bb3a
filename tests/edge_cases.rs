//! Boundary behaviors called out as testable properties: zero-size
//! requests, null handling, and calloc overflow.

use fmalloc::{calloc, free, malloc, realloc};
use std::os::raw::c_void;
use std::ptr;

#[test]
fn malloc_zero_yields_a_one_byte_addressable_pointer() {
    unsafe {
        let p = malloc(0) as *mut u8;
        assert!(!p.is_null());
        p.write(0x42);
        assert_eq!(p.read(), 0x42);
        free(p as *mut c_void);
    }
}

#[test]
fn free_null_never_panics() {
    unsafe { free(ptr::null_mut()) };
}

#[test]
fn realloc_null_is_malloc() {
    unsafe {
        let p = realloc(ptr::null_mut(), 32);
        assert!(!p.is_null());
        free(p);
    }
}

#[test]
fn realloc_to_zero_frees_and_returns_null() {
    unsafe {
        let p = malloc(32);
        assert!(!p.is_null());
        let result = realloc(p, 0);
        assert!(result.is_null());
    }
}

#[test]
fn calloc_overflow_in_multiplication_returns_null() {
    unsafe {
        let p = calloc(usize::MAX / 2 + 2, 4);
        assert!(p.is_null());
    }
}

#[test]
fn calloc_zero_count_or_size_is_well_defined() {
    unsafe {
        let p = calloc(0, 8);
        assert!(!p.is_null());
        free(p);

        let q = calloc(8, 0);
        assert!(!q.is_null());
        free(q);
    }
}

#[test]
fn free_of_region_base_is_ignored_and_owner_still_freeable() {
    unsafe {
        let p = malloc(100) as *mut u8;
        // A pointer landing inside the region header/block-header span
        // (before the payload starts) must be rejected without panicking
        // or reading out of bounds, same as any other foreign pointer.
        let near_base = (p as usize).saturating_sub(4) as *mut c_void;
        free(near_base);
        free(p as *mut c_void);
    }
}

#[test]
fn returned_pointers_are_sixteen_byte_aligned() {
    unsafe {
        for size in [0usize, 1, 17, 128, 129, 1024, 1025, 4096] {
            let p = malloc(size) as usize;
            assert_ne!(p, 0);
            assert_eq!(p % 16, 0, "pointer for size {size} was not 16-byte aligned");
            free(p as *mut c_void);
        }
    }
}
