//! Stable DTOs shared across the regoq workspace.
//!
//! This crate is intentionally boring:
//! - annotation metadata extracted from policy source
//! - source locations used to order and report that metadata
//! - the reserved policy file extension

#![forbid(unsafe_code)]

pub mod annotations;

pub use annotations::{AnnotationScope, AnnotationSet, Annotations, AnnotationsRef, Location};

/// File extension (without the dot) of policy files picked up from directories.
pub const POLICY_EXTENSION: &str = "rego";
