use crate::exchange::{CONTENT_TYPE, Exchange, JSON, ensure_status, json_body};
use crate::transport::ReqwestTransport;
use crate::url::{parse_base_url, query_url};
use async_trait::async_trait;
use regoq_core::{
    Config, Error, HttpMethod, HttpRequest, HttpTransport, Logger, QueryOptions, Result, Source,
    SupportedOptions,
};
use reqwest::Url;
use serde_json::{Map, Value, json};
use std::sync::Arc;

const REMOTE_OPTIONS: SupportedOptions = SupportedOptions {
    print_hook: false,
    package_suffix: false,
    headers: true,
};

/// Queries a policy server over its REST data API.
///
/// `data.a.b` is sent as `POST <base>/data/a/b` with body `{"input": ...}`. The decision is the
/// `result` member of the JSON response; a missing or `null` result is an undefined decision.
#[derive(Clone)]
pub struct RemoteSource {
    raw_url: String,
    base: Option<Url>,
    exchange: Exchange,
}

impl RemoteSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            raw_url: base_url.into(),
            base: None,
            exchange: Exchange::new(Arc::new(ReqwestTransport::default()), Logger::current()),
        }
    }

    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: HttpTransport + 'static,
    {
        self.exchange.set_transport(Arc::new(transport));
        self
    }

    /// Validated base URL, once configured.
    pub fn base_url(&self) -> Option<&Url> {
        self.base.as_ref()
    }
}

impl std::fmt::Debug for RemoteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteSource")
            .field("url", &self.raw_url)
            .field("configured", &self.base.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Source for RemoteSource {
    fn kind(&self) -> &'static str {
        "remote"
    }

    fn configure(&mut self, config: &Config) -> Result<()> {
        self.base = Some(parse_base_url(&self.raw_url)?);
        self.exchange.set_logger(config.logger().clone());
        Ok(())
    }

    async fn query(&self, query: &str, input: &Value, options: &QueryOptions) -> Result<Value> {
        REMOTE_OPTIONS.check(self.kind(), options)?;
        let base = self
            .base
            .as_ref()
            .ok_or_else(|| Error::invalid_input("remote source is not configured"))?;

        let url = query_url(base, query);
        let body = serde_json::to_vec(&json!({ "input": input }))
            .map_err(|err| Error::invalid_input(format!("cannot encode input: {err}")))?;

        let mut request =
            HttpRequest::new(HttpMethod::Post, url.as_str()).header(CONTENT_TYPE, JSON);
        for (name, value) in options.headers() {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = self.exchange.send(request.body(body)).await?;
        ensure_status(&url, &response, |response| response.status == 200)?;

        let mut envelope: Map<String, Value> = json_body(&url, response)?;
        match envelope.remove("result") {
            None | Some(Value::Null) => Err(Error::NoEvalResult),
            Some(result) => Ok(result),
        }
    }
}
