//! Remote policy source and admin client for a policy server's REST v1 API.
//!
//! All HTTP goes through an injected [`regoq_core::HttpTransport`]; [`ReqwestTransport`] is
//! used when none is given.

#![forbid(unsafe_code)]

mod admin;
mod exchange;
mod source;
mod transport;
pub mod url;

pub use admin::{AdminClient, PolicyModule};
pub use reqwest::Url;
pub use source::RemoteSource;
pub use transport::{BearerAuth, ReqwestTransport};

/// Entry points for fuzz targets. These must never panic on any input.
pub mod fuzz {
    /// Validate `base` and translate `query` into a request URL, discarding the outcome.
    pub fn query_url(base: &str, query: &str) {
        if let Ok(base) = crate::url::parse_base_url(base) {
            let _ = crate::url::query_url(&base, query);
        }
    }
}
