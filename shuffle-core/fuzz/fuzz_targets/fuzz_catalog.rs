#![no_main]

//! Fuzz target for FaceCatalog::from_bytes()
//!
//! Arbitrary bytes must be rejected gracefully, never panic.
//!
//! Run with: cargo +nightly fuzz run fuzz_catalog

use libfuzzer_sys::fuzz_target;
use shuffle_core::FaceCatalog;

fuzz_target!(|data: &[u8]| {
    let _ = FaceCatalog::from_bytes(data);
});
