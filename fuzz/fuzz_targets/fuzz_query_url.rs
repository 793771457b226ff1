//! Fuzz target for base URL validation and query path translation.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_query_url
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct UrlInput {
    /// Candidate base URL, e.g. "http://localhost:8181/v1"
    base: String,
    /// Dotted query path, e.g. "data.system.authz"
    query: String,
}

fuzz_target!(|input: UrlInput| {
    if input.base.len() > 2048 || input.query.len() > 2048 {
        return;
    }
    regoq_remote::fuzz::query_url(&input.base, &input.query);
});
