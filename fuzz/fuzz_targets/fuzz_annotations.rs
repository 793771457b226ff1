//! Fuzz target for `# METADATA` block scanning.
//!
//! Goal: scanning arbitrary policy text should **never panic**. Malformed YAML, dangling
//! blocks and odd rule heads are reported as errors.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_annotations
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }
    if let Ok(text) = std::str::from_utf8(data) {
        regoq_local::fuzz::scan_annotations(text);
    }
});
