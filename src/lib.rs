//! fmalloc - A Region-Based `malloc` Replacement
//!
//! Drop-in replacement for the C heap API (`malloc`, `free`, `realloc`,
//! `calloc`), plus two read-only introspection routines
//! ([`show_alloc_mem`](introspect::show_alloc_mem) and
//! [`show_alloc_mem_ex`](introspect::show_alloc_mem_ex)). Built as a
//! `cdylib` so it can be `LD_PRELOAD`ed into an unmodified process, and as
//! an `rlib` so it can be exercised directly by its own test suite.
//!
//! Allocations never touch the libc heap: every byte comes from an
//! anonymous OS mapping acquired through [`heap::provider`]. Four layers,
//! leaves first:
//!
//! - [`heap::provider`] — OS mapping acquire/release.
//! - [`heap::region`] — one arena, carved into Tiny, Small, or Large.
//! - [`heap::block`] — the intrusive free list inside an arena.
//! - [`heap::registry`] — the single global lock and region list.
//!
//! [`api`] is the public C ABI surface; [`introspect`] reports on the
//! same state read-only.

pub mod api;
pub mod config;
pub mod error;
pub mod heap;
pub mod introspect;
pub mod logging;

pub use api::{calloc, free, malloc, realloc};
pub use introspect::{show_alloc_mem, show_alloc_mem_ex};
