//! Body serialization.
//!
//! The client never talks to `serde_json` directly; it goes through a
//! [`Serializer`] so that implementations can be swapped. Two JSON
//! implementations ship with the crate:
//!
//! - [`JsonSerializer`]: plain `serde_json`
//! - [`PathAwareJsonSerializer`]: `serde_json` with `serde_path_to_error`,
//!   whose deserialization errors point at the offending field
//!
//! Both treat `null` as "no value" in either direction, and an empty body as
//! `null`.

use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Content type announced for JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Pluggable object serializer used for request and response bodies.
pub trait Serializer: Send + Sync {
    /// Content type of the produced text.
    fn content_type(&self) -> &'static str {
        JSON_CONTENT_TYPE
    }

    /// Serialize a value; `Ok(None)` when the value is null.
    fn serialize<T>(&self, value: &T) -> impl Future<Output = Result<Option<String>>> + Send
    where
        T: Serialize + Sync + ?Sized;

    /// Deserialize text; `Ok(None)` for empty text or `null`.
    fn deserialize<T>(&self, text: &str) -> impl Future<Output = Result<Option<T>>> + Send
    where
        T: DeserializeOwned + Send;
}

/// JSON serializer backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    async fn serialize<T>(&self, value: &T) -> Result<Option<String>>
    where
        T: Serialize + Sync + ?Sized,
    {
        to_json(value)
    }

    async fn deserialize<T>(&self, text: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        if is_null(text) {
            return Ok(None);
        }
        serde_json::from_str(text)
            .map(Some)
            .map_err(|e| Error::json_deserialization("", e.to_string()))
    }
}

/// JSON serializer whose errors carry the path of the failing field.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathAwareJsonSerializer;

impl Serializer for PathAwareJsonSerializer {
    async fn serialize<T>(&self, value: &T) -> Result<Option<String>>
    where
        T: Serialize + Sync + ?Sized,
    {
        to_json(value)
    }

    async fn deserialize<T>(&self, text: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        if is_null(text) {
            return Ok(None);
        }
        from_json(text.as_bytes()).map(Some)
    }
}

fn is_null(text: &str) -> bool {
    let text = text.trim();
    text.is_empty() || text == "null"
}

/// Serialize a value to a JSON string, `None` when it serializes to `null`.
///
/// # Example
///
/// ```
/// use restkit_core::to_json;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let user = User { name: "Alice".to_string() };
/// assert_eq!(to_json(&user).expect("serialize").as_deref(), Some(r#"{"name":"Alice"}"#));
/// assert_eq!(to_json(&None::<User>).expect("serialize"), None);
/// ```
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Option<String>> {
    let text = serde_json::to_string(value)?;
    Ok((text != "null").then_some(text))
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error includes the exact path of the
/// field that failed (e.g. `user.address.city`).
///
/// # Example
///
/// ```
/// use restkit_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = from_json(br#"{"name":"Alice"}"#).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}
