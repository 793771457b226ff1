//! Contracts shared by every regoq source and the client façade.
//!
//! Nothing in here performs IO. Sources live in their own crates and plug in through
//! [`Source`]; remote transports plug in through [`HttpTransport`].

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod marshal;
pub mod options;
pub mod source;
pub mod transport;

pub use config::{Config, ConfigOption, Logger, with_logger};
pub use error::{BoxError, Error, ErrorKind, Result, TransportError};
pub use options::{PrintHook, QueryOptions, WriterPrintHook};
pub use source::{EMPTY_ANNOTATIONS, Source, SupportedOptions};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

pub use regoq_types::{AnnotationScope, AnnotationSet, Annotations, AnnotationsRef, Location};
