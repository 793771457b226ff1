//! The capability set every policy backend implements.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::options::QueryOptions;
use async_trait::async_trait;
use regoq_types::AnnotationSet;
use serde_json::Value;

/// Annotation set for sources that never compile policy text.
pub static EMPTY_ANNOTATIONS: AnnotationSet = AnnotationSet::empty();

/// A policy backend.
///
/// `configure` is called exactly once, before any query. After that a source is read-only:
/// `query` takes `&self` and may run concurrently from many tasks.
#[async_trait]
pub trait Source: Send + Sync {
    /// Short variant name used in logs and errors (`"file"`, `"remote"`, ...).
    fn kind(&self) -> &'static str;

    fn configure(&mut self, config: &Config) -> Result<()>;

    /// Evaluate `query` against `input`. The returned value is the raw decision; the caller
    /// decodes it through the marshal bridge.
    async fn query(&self, query: &str, input: &Value, options: &QueryOptions) -> Result<Value>;

    fn annotation_set(&self) -> &AnnotationSet {
        &EMPTY_ANNOTATIONS
    }
}

/// Reject options a source cannot honor.
///
/// Each flag states whether the source supports that option.
#[derive(Clone, Copy, Debug)]
pub struct SupportedOptions {
    pub print_hook: bool,
    pub package_suffix: bool,
    pub headers: bool,
}

impl SupportedOptions {
    pub const ALL: SupportedOptions = SupportedOptions {
        print_hook: true,
        package_suffix: true,
        headers: true,
    };

    pub fn check(self, source_kind: &'static str, options: &QueryOptions) -> Result<()> {
        let rejected = if !self.print_hook && options.print_hook().is_some() {
            Some("print_hook")
        } else if !self.package_suffix && options.package_suffix().is_some() {
            Some("package_suffix")
        } else if !self.headers && !options.headers().is_empty() {
            Some("headers")
        } else {
            None
        };

        match rejected {
            Some(option) => Err(Error::InvalidQueryOption {
                option,
                source_kind,
            }),
            None => Ok(()),
        }
    }
}
