//! Policy bundle assembly.
//!
//! This crate is allowed to do filesystem IO: it walks directories, reads policy files and
//! merges them with in-memory policies. It knows nothing about compiling or evaluating them.

#![forbid(unsafe_code)]

mod bundle;
mod load;

pub use bundle::PolicyBundle;
pub use load::{BundleLoader, discover_policy_files, normalize_path};
