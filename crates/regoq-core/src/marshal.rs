//! Marshal bridge: move a result between representations by re-encoding it as JSON.
//!
//! Engine values and wire values never share a Rust type with the caller's output, so every
//! hop goes through JSON text.

use crate::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Serialize `value` to JSON and deserialize it as `T`.
///
/// Fails with [`Error::Decode`] when the JSON shape does not fit `T`.
pub fn convert<S, T>(value: &S) -> Result<T>
where
    S: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let raw = serde_json::to_vec(value).map_err(|source| Error::Decode { source })?;
    from_json_slice(&raw)
}

/// Deserialize JSON produced by an engine or server into `T`.
pub fn from_json_slice<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    serde_json::from_slice(raw).map_err(|source| Error::Decode { source })
}

/// Turn caller input into the generic JSON value every source accepts.
pub fn input_value<I: Serialize + ?Sized>(input: &I) -> Result<Value> {
    serde_json::to_value(input)
        .map_err(|err| Error::invalid_input(format!("input is not JSON serializable: {err}")))
}
