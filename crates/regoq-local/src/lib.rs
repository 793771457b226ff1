//! Local policy sources.
//!
//! [`FileSource`] and [`DataSource`] assemble a bundle at configure time, compile it once
//! with the embedded Rego engine and evaluate every query against a fresh copy of the
//! compiled engine.

#![forbid(unsafe_code)]

mod annotations;
mod compiled;
mod source;

pub use annotations::{ModuleMetadata, build_set, scan_module};
pub use compiled::CompiledPolicy;
pub use source::{DataSource, FileSource};

/// Entry points for fuzz targets. These must never panic on any input.
pub mod fuzz {
    /// Scan arbitrary text for metadata blocks, discarding the outcome.
    pub fn scan_annotations(text: &str) {
        if let Ok(module) = crate::annotations::scan_module("fuzz.rego", text) {
            let _ = crate::annotations::build_set(module.annotations);
        }
    }
}
