use regoq_core::{Error, HttpRequest, HttpResponse, HttpTransport, Logger, Result};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub(crate) const CONTENT_TYPE: &str = "Content-Type";
pub(crate) const JSON: &str = "application/json";
pub(crate) const TEXT: &str = "text/plain";

/// Transport plus logger, shared by the query source and the admin client.
#[derive(Clone)]
pub(crate) struct Exchange {
    transport: Arc<dyn HttpTransport>,
    logger: Logger,
}

impl Exchange {
    pub(crate) fn new(transport: Arc<dyn HttpTransport>, logger: Logger) -> Self {
        Self { transport, logger }
    }

    pub(crate) fn set_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }

    pub(crate) fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) {
        self.transport = transport;
    }

    pub(crate) async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.logger.in_scope(|| {
            let body = request
                .body
                .as_deref()
                .map(String::from_utf8_lossy)
                .unwrap_or_default();
            tracing::debug!(method = %request.method, url = %url, body = %body, "sending request")
        });

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|source| Error::RemoteTransport {
                url: url.clone(),
                source,
            })?;

        self.logger.in_scope(|| {
            tracing::debug!(
                url = %url,
                status = response.status,
                body = %response.body_text(),
                "received response"
            )
        });
        Ok(response)
    }
}

/// Fail unless `accept(status)` holds; the body always travels with the error.
pub(crate) fn ensure_status(
    url: &Url,
    response: &HttpResponse,
    accept: impl Fn(&HttpResponse) -> bool,
) -> Result<()> {
    if accept(response) {
        return Ok(());
    }
    Err(Error::RemoteStatus {
        url: url.to_string(),
        status: response.status,
        body: response.body_text(),
    })
}

/// Decode a successful response body.
pub(crate) fn json_body<T: DeserializeOwned>(url: &Url, response: HttpResponse) -> Result<T> {
    let raw = response.body.map_err(|source| Error::RemoteTransport {
        url: url.to_string(),
        source,
    })?;
    serde_json::from_slice(&raw).map_err(|source| Error::UnexpectedResponse {
        url: url.to_string(),
        body: String::from_utf8_lossy(&raw).into_owned(),
        source,
    })
}
