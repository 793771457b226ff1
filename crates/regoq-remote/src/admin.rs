//! Administrative calls against a policy server's REST v1 API: documents and policy modules.

use crate::exchange::{CONTENT_TYPE, Exchange, JSON, TEXT, ensure_status, json_body};
use crate::transport::ReqwestTransport;
use crate::url::{join_segments, parse_base_url};
use regoq_core::{
    Error, HttpMethod, HttpRequest, HttpResponse, HttpTransport, Logger, Result, marshal,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;

/// A policy module as stored by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyModule {
    pub id: String,
    #[serde(default)]
    pub raw: String,
    /// Parsed module as returned by the server; kept opaque.
    #[serde(default)]
    pub ast: Value,
}

#[derive(Deserialize)]
struct PolicyList {
    #[serde(default)]
    result: Vec<PolicyModule>,
}

#[derive(Deserialize)]
struct PolicyEntry {
    #[serde(default)]
    result: Option<PolicyModule>,
}

#[derive(Clone)]
pub struct AdminClient {
    base: Url,
    exchange: Exchange,
}

impl AdminClient {
    /// `base_url` is the server root, e.g. `http://localhost:8181`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base: parse_base_url(base_url)?,
            exchange: Exchange::new(Arc::new(ReqwestTransport::default()), Logger::current()),
        })
    }

    pub fn with_transport<T>(mut self, transport: T) -> Self
    where
        T: HttpTransport + 'static,
    {
        self.exchange.set_transport(Arc::new(transport));
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.exchange.set_logger(logger);
        self
    }

    /// Read the document at `path` (slash separated, empty for the root).
    ///
    /// Without input this is a `GET`; with input the document is evaluated with a `POST`.
    /// Returns `None` when the server reports no result or a `null` one.
    pub async fn get_data<I, O>(&self, path: &str, input: Option<&I>) -> Result<Option<O>>
    where
        I: serde::Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let url = self.data_url(path);
        let request = match input {
            None => HttpRequest::new(HttpMethod::Get, url.as_str()),
            Some(input) => {
                let input = marshal::input_value(input)?;
                json_request(HttpMethod::Post, &url, &json!({ "input": input }))?
            }
        };

        let response = self.call(&url, request).await?;
        let mut envelope: Map<String, Value> = json_body(&url, response)?;
        match envelope.remove("result") {
            None | Some(Value::Null) => Ok(None),
            Some(value) => marshal::convert(&value).map(Some),
        }
    }

    /// Create or replace the document at `path`.
    pub async fn put_data<V>(&self, path: &str, value: &V) -> Result<()>
    where
        V: serde::Serialize + ?Sized,
    {
        let url = self.data_url(path);
        let value = marshal::input_value(value)?;
        let request = json_request(HttpMethod::Put, &url, &value)?;
        self.call(&url, request).await.map(drop)
    }

    pub async fn delete_data(&self, path: &str) -> Result<()> {
        let url = self.data_url(path);
        let request = HttpRequest::new(HttpMethod::Delete, url.as_str());
        self.call(&url, request).await.map(drop)
    }

    pub async fn list_policies(&self) -> Result<Vec<PolicyModule>> {
        let url = self.policies_url(None);
        let request = HttpRequest::new(HttpMethod::Get, url.as_str());
        let response = self.call(&url, request).await?;
        json_body::<PolicyList>(&url, response).map(|list| list.result)
    }

    /// `None` when the server has no module with that id.
    pub async fn get_policy(&self, id: &str) -> Result<Option<PolicyModule>> {
        let url = self.policies_url(Some(id));
        let request = HttpRequest::new(HttpMethod::Get, url.as_str());
        let response = self.exchange.send(request).await?;
        if response.status == 404 {
            return Ok(None);
        }
        ensure_status(&url, &response, HttpResponse::is_success)?;
        json_body::<PolicyEntry>(&url, response).map(|entry| entry.result)
    }

    /// Upload Rego source text under `id`.
    pub async fn put_policy(&self, id: &str, text: &str) -> Result<()> {
        let url = self.policies_url(Some(id));
        let request = HttpRequest::new(HttpMethod::Put, url.as_str())
            .header(CONTENT_TYPE, TEXT)
            .body(text.as_bytes().to_vec());
        self.call(&url, request).await.map(drop)
    }

    pub async fn delete_policy(&self, id: &str) -> Result<()> {
        let url = self.policies_url(Some(id));
        let request = HttpRequest::new(HttpMethod::Delete, url.as_str());
        self.call(&url, request).await.map(drop)
    }

    async fn call(&self, url: &Url, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.exchange.send(request).await?;
        ensure_status(url, &response, HttpResponse::is_success)?;
        Ok(response)
    }

    fn data_url(&self, path: &str) -> Url {
        join_segments(&self.base, ["v1", "data"].into_iter().chain(path.split('/')))
    }

    fn policies_url(&self, id: Option<&str>) -> Url {
        join_segments(&self.base, ["v1", "policies"].into_iter().chain(id))
    }
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

fn json_request(method: HttpMethod, url: &Url, body: &Value) -> Result<HttpRequest> {
    let body = serde_json::to_vec(body)
        .map_err(|err| Error::invalid_input(format!("cannot encode request body: {err}")))?;
    Ok(HttpRequest::new(method, url.as_str())
        .header(CONTENT_TYPE, JSON)
        .body(body))
}
