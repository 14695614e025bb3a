//! End-to-end scenarios exercised through the public C ABI only.

use fmalloc::{calloc, free, malloc, realloc};
use std::os::raw::c_void;

#[test]
fn realloc_preserves_prefix_and_grows() {
    unsafe {
        let p = malloc(64) as *mut u8;
        assert!(!p.is_null());
        let hello = b"hello";
        p.copy_from_nonoverlapping(hello.as_ptr(), hello.len());

        let q = realloc(p as *mut c_void, 128) as *mut u8;
        assert!(!q.is_null());
        let got = std::slice::from_raw_parts(q, hello.len());
        assert_eq!(got, hello);

        free(q as *mut c_void);
    }
}

#[test]
fn calloc_array_is_all_zero() {
    unsafe {
        let count = 10usize;
        let elem = std::mem::size_of::<i32>();
        let p = calloc(count, elem) as *mut i32;
        assert!(!p.is_null());
        for i in 0..count {
            assert_eq!(*p.add(i), 0);
        }
        free(p as *mut c_void);
    }
}

#[test]
fn two_large_allocations_free_independently() {
    unsafe {
        let a = malloc(2048);
        let b = malloc(4096);
        assert!(!a.is_null());
        assert!(!b.is_null());
        free(a);
        free(b);
    }
}

#[test]
fn many_small_allocations_reuse_regions() {
    unsafe {
        let mut pointers = Vec::with_capacity(200);
        for _ in 0..200 {
            let p = malloc(64);
            assert!(!p.is_null());
            pointers.push(p);
        }
        for p in pointers {
            free(p);
        }
    }
}

#[test]
fn double_free_is_a_silent_noop() {
    unsafe {
        let p = malloc(100);
        assert!(!p.is_null());
        free(p);
        free(p);
    }
}

#[test]
fn free_of_interior_pointer_is_ignored_and_owner_still_freeable() {
    unsafe {
        let p = malloc(100) as *mut u8;
        let interior = p.add(10) as *mut c_void;
        free(interior);
        free(p as *mut c_void);
    }
}

#[test]
fn size_class_boundaries_are_respected() {
    unsafe {
        let tiny = malloc(128);
        let small_low = malloc(129);
        let small_high = malloc(1024);
        let large = malloc(1025);
        assert!(!tiny.is_null());
        assert!(!small_low.is_null());
        assert!(!small_high.is_null());
        assert!(!large.is_null());
        free(tiny);
        free(small_low);
        free(small_high);
        free(large);
    }
}
