//! Concrete [`HttpTransport`] implementations.

use async_trait::async_trait;
use regoq_core::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};
use std::fmt;

/// Default transport backed by a [`reqwest::Client`].
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::with_source("request could not be sent", err))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|err| TransportError::with_source("response body could not be read", err));
        Ok(HttpResponse { status, body })
    }
}

/// Wraps another transport and adds `Authorization: Bearer <token>` to every request.
#[derive(Clone)]
pub struct BearerAuth<T> {
    inner: T,
    token: String,
}

impl<T> BearerAuth<T> {
    pub fn new(inner: T, token: impl Into<String>) -> Self {
        Self {
            inner,
            token: token.into(),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for BearerAuth<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("inner", &self.inner)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for BearerAuth<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let request = request.header("Authorization", format!("Bearer {}", self.token));
        self.inner.send(request).await
    }
}
