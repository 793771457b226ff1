//! Error taxonomy shared by every source and the client façade.

use std::path::PathBuf;

/// Boxed error used where the concrete failure comes from a pluggable collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse category of an [`Error`], stable across variants that carry different context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NoPolicyData,
    ReadPolicyFile,
    Compile,
    Eval,
    NoEvalResult,
    Decode,
    InvalidUrl,
    RemoteRequestFailed,
    UnexpectedResponse,
    InvalidQueryOption,
    ClientInit,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("no policy data, one or more policy files or in-memory policies are required")]
    NoPolicyData,

    #[error("failed to read policy file {}", .path.display())]
    ReadPolicyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile policy {name}: {message}")]
    Compile { name: String, message: String },

    #[error("failed to evaluate {query}: {message}")]
    Eval { query: String, message: String },

    /// The policy produced nothing for the query. Callers decide whether that is a failure.
    #[error("no evaluation result")]
    NoEvalResult,

    #[error("result does not fit the requested output type: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed with status {status}: {body}")]
    RemoteStatus {
        url: String,
        status: u16,
        body: String,
    },

    #[error("request to {url} failed: {source}")]
    RemoteTransport {
        url: String,
        #[source]
        source: TransportError,
    },

    #[error("unexpected response from {url}: {source} (body: {body})")]
    UnexpectedResponse {
        url: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("query option {option} is not supported by the {source_kind} source")]
    InvalidQueryOption {
        option: &'static str,
        source_kind: &'static str,
    },

    #[error("failed to initialize client with {source_kind} source: {source}")]
    ClientInit {
        source_kind: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::NoPolicyData => ErrorKind::NoPolicyData,
            Error::ReadPolicyFile { .. } => ErrorKind::ReadPolicyFile,
            Error::Compile { .. } => ErrorKind::Compile,
            Error::Eval { .. } => ErrorKind::Eval,
            Error::NoEvalResult => ErrorKind::NoEvalResult,
            Error::Decode { .. } => ErrorKind::Decode,
            Error::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            Error::RemoteStatus { .. } | Error::RemoteTransport { .. } => {
                ErrorKind::RemoteRequestFailed
            }
            Error::UnexpectedResponse { .. } => ErrorKind::UnexpectedResponse,
            Error::InvalidQueryOption { .. } => ErrorKind::InvalidQueryOption,
            Error::ClientInit { .. } => ErrorKind::ClientInit,
        }
    }

    /// True for the "policy is undefined for this input" outcome.
    pub fn is_no_result(&self) -> bool {
        matches!(self, Error::NoEvalResult)
    }

    /// The configure failure behind a [`Error::ClientInit`], or `self` for any other variant.
    pub fn root(&self) -> &Error {
        match self {
            Error::ClientInit { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }
}

/// Failure reported by an [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_variants_share_a_kind() {
        let status = Error::RemoteStatus {
            url: "http://example.com/v1/data/x".to_string(),
            status: 500,
            body: "boom".to_string(),
        };
        let transport = Error::RemoteTransport {
            url: "http://example.com/v1/data/x".to_string(),
            source: TransportError::new("connection refused"),
        };
        assert_eq!(status.kind(), ErrorKind::RemoteRequestFailed);
        assert_eq!(transport.kind(), ErrorKind::RemoteRequestFailed);
        assert!(status.to_string().contains("500"));
        assert!(status.to_string().contains("boom"));
    }

    #[test]
    fn root_peels_client_init() {
        let err = Error::ClientInit {
            source_kind: "file",
            source: Box::new(Error::NoPolicyData),
        };
        assert_eq!(err.kind(), ErrorKind::ClientInit);
        assert_eq!(err.root().kind(), ErrorKind::NoPolicyData);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn read_policy_file_names_the_path() {
        let err = Error::ReadPolicyFile {
            path: PathBuf::from("policies/missing.rego"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("policies/missing.rego"));
    }

    #[test]
    fn transport_error_keeps_its_source() {
        let err = TransportError::with_source(
            "send",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"),
        );
        assert_eq!(err.to_string(), "send");
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "timed out");
    }
}
