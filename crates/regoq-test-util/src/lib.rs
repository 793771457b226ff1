//! Shared test utilities for the regoq workspace.
//!
//! Lives in its own crate because the local, remote and façade crates all need the same
//! transport double and log capture from their `tests/` directories.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use regoq_core::{HttpRequest, HttpResponse, HttpTransport, Logger, TransportError};
use serde_json::Value;
use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

type Responder = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// HTTP transport double: records every request and answers from a closure.
pub struct StubTransport {
    responder: Box<Responder>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with the same status and body.
    pub fn replying(status: u16, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        Self::new(move |_| Ok(HttpResponse::new(status, body.clone())))
    }

    /// Answer every request with `status` and a JSON body.
    pub fn replying_json(status: u16, body: &Value) -> Self {
        Self::replying(status, body.to_string())
    }

    /// Fail every request before a response exists.
    pub fn failing(message: &'static str) -> Self {
        Self::new(move |_| Err(TransportError::new(message)))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests().pop()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl HttpTransport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let response = (self.responder)(&request);
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        response
    }
}

/// Parse a recorded request body as JSON.
pub fn body_json(request: &HttpRequest) -> Value {
    let raw = request.body.as_deref().expect("request has a body");
    serde_json::from_slice(raw).expect("request body is JSON")
}

/// In-memory sink for a [`Logger`] with every level enabled and ANSI colors off.
#[derive(Clone, Default)]
pub struct LogCapture {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logger(&self) -> Logger {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        Logger::from_subscriber(subscriber)
    }

    pub fn contents(&self) -> String {
        let raw = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&raw).into_owned()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

impl Write for LogCapture {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Repo-root `tests/fixtures` directory.
pub fn fixtures_dir() -> Utf8PathBuf {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("tests")
        .join("fixtures")
}

/// Policy tree under `tests/fixtures/policies`.
pub fn policy_fixtures() -> Utf8PathBuf {
    fixtures_dir().join("policies")
}

pub fn utf8_root(dir: &std::path::Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.to_path_buf()).expect("utf8 path")
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Utf8Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, contents).expect("write file");
}
