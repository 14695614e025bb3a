//! Diagnostic Logging
//!
//! The public API emits a one-line diagnostic per operation when the
//! `debug-log` feature is enabled at build time, matching the C lineage's
//! `DEBUG_MALLOC`-gated `log_operation`. This is intentionally independent
//! of the `log` facade: the allocator is typically preloaded into a
//! process that never installed a `log` subscriber, so relying solely on
//! `log::debug!` would silently produce no output. The `log` facade is
//! still used at the region-provider seam for trace-level events that are
//! genuinely optional (they cost nothing when no subscriber is installed).

/// Emit `<op>(0x<addr>, <n> bytes)` to stderr, compiled out entirely
/// unless the `debug-log` feature is enabled.
#[inline]
pub fn log_operation(op: &str, addr: usize, size: usize) {
    #[cfg(feature = "debug-log")]
    {
        if size > 0 {
            eprintln!("{op}(0x{addr:X}, {size} bytes)");
        } else {
            eprintln!("{op}(0x{addr:X})");
        }
    }
    #[cfg(not(feature = "debug-log"))]
    {
        let _ = (op, addr, size);
    }
}
