//! Query path to URL translation.

use regoq_core::{Error, Result};
use reqwest::Url;

/// Parse and validate a policy server base URL.
///
/// Only `http` and `https` URLs that can carry a path are accepted.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|err| invalid(raw, err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid(raw, "URL cannot carry a path".to_string()));
    }
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(raw, format!("unsupported scheme {other:?}"))),
    }
}

/// Append one path segment per non-empty component to a copy of `base`.
pub fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut path = base.path().trim_end_matches('/').to_string();
    for segment in segments.into_iter().filter(|s| !s.is_empty()) {
        path.push('/');
        path.push_str(segment);
    }
    let mut url = base.clone();
    url.set_path(&path);
    url
}

/// `data.system.authz` against `http://h/v1` becomes `http://h/v1/data/system/authz`.
pub fn query_url(base: &Url, query: &str) -> Url {
    join_segments(base, query.split('.'))
}

fn invalid(raw: &str, reason: String) -> Error {
    Error::InvalidUrl {
        url: raw.to_string(),
        reason,
    }
}
