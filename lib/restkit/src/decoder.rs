//! Typed decoding of responses.

use serde::de::DeserializeOwned;

use crate::{CallInfo, Error, Response, Result, Serializer};

/// Reads typed values out of responses with a [`Serializer`].
#[derive(Debug)]
pub struct ResponseDecoder<'a, S> {
    serializer: &'a S,
}

impl<'a, S: Serializer> ResponseDecoder<'a, S> {
    /// Create a decoder.
    #[must_use]
    pub const fn new(serializer: &'a S) -> Self {
        Self { serializer }
    }

    /// Decode the body of `response` as `T`.
    ///
    /// `Ok(None)` for `204 No Content`, for any non-2xx response that reached
    /// this point (the interceptor suppressed its error) and for an empty body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] naming `T`, the request and the status
    /// when the body cannot be read as `T`.
    pub async fn decode<T>(&self, response: &Response, info: &CallInfo) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        if response.is_no_content() || !response.is_success() || response.body().is_empty() {
            return Ok(None);
        }

        let text = response.text_lossy();
        self.serializer
            .deserialize::<T>(&text)
            .await
            .map_err(|source| {
                Error::serialization::<T>(
                    info.method(),
                    info.url().clone(),
                    response.status(),
                    source,
                )
            })
    }
}
