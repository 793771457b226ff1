//! Uniform policy query client.
//!
//! A [`Client`] owns exactly one configured [`Source`] and answers typed queries against it,
//! whether the policy is compiled in-process ([`FileSource`], [`DataSource`]) or evaluated by a
//! policy server ([`RemoteSource`]).
//!
//! ```no_run
//! # async fn run() -> regoq::Result<()> {
//! use regoq::{Client, FileSource};
//! use serde_json::json;
//!
//! let client = Client::new(FileSource::new().with_dir("policies"))?;
//! let allowed: bool = client.query("data.authz.allow", &json!({"user": "alice"})).await?;
//! # let _ = allowed;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod client;
mod mock;

pub use client::{Client, ClientBuilder};
pub use mock::MockSource;

pub use regoq_bundle::{BundleLoader, PolicyBundle};
pub use regoq_core::{
    AnnotationScope, AnnotationSet, Annotations, AnnotationsRef, BoxError, Config, ConfigOption,
    Error, ErrorKind, HttpMethod, HttpRequest, HttpResponse, HttpTransport, Location, Logger,
    PrintHook, QueryOptions, Result, Source, SupportedOptions, TransportError, WriterPrintHook,
    marshal, with_logger,
};
pub use regoq_local::{CompiledPolicy, DataSource, FileSource};
pub use regoq_remote::{AdminClient, BearerAuth, PolicyModule, RemoteSource, ReqwestTransport, Url};
