//! Turns an [`Operation`] into an outbound [`Request`].

use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use serde::Serialize;

use crate::{
    Hooks, Operation, Request, RestServiceSettings, Result, Serializer, Transport, auth, headers,
};

/// Composes requests for one client.
#[derive(Debug)]
pub struct RequestComposer<'a, S> {
    serializer: &'a S,
    settings: &'a RestServiceSettings,
    hooks: &'a Hooks,
}

impl<'a, S: Serializer> RequestComposer<'a, S> {
    /// Create a composer.
    #[must_use]
    pub const fn new(
        serializer: &'a S,
        settings: &'a RestServiceSettings,
        hooks: &'a Hooks,
    ) -> Self {
        Self {
            serializer,
            settings,
            hooks,
        }
    }

    /// Build the request for `operation`, resolved against the settings'
    /// base address.
    ///
    /// Headers are layered weakest first: settings default headers, the
    /// authorization header, common headers from the hooks, then the
    /// operation's own headers. The transport may still fill names that
    /// none of them set.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`](crate::Error::InvalidUrl) when the operation
    ///   does not resolve to a valid URL
    /// - serializer errors for the payload
    /// - [`Error::InvalidHeader`](crate::Error::InvalidHeader) for an
    ///   unrenderable credential or content type
    pub async fn compose<D, T>(
        &self,
        operation: &Operation<'_, D>,
        transport: &T,
    ) -> Result<Request>
    where
        D: Serialize + Sync + ?Sized,
        T: Transport,
    {
        let url = self.settings.base_url().join(&operation.relative_url())?;
        let mut builder = Request::builder(operation.method(), url);

        if let Some(data) = operation.payload()
            && let Some(text) = self.serializer.serialize(data).await?
        {
            let content_type = HeaderValue::from_str(self.serializer.content_type())
                .map_err(|e| crate::Error::invalid_header(format!("content-type: {e}")))?;
            builder = builder.header(CONTENT_TYPE, content_type).body(Bytes::from(text));
        }

        let mut request = builder.build();
        let request_headers = request.headers_mut();
        headers::fill_missing(request_headers, self.settings.default_headers());

        let authentication = self.settings.authentication();
        if let Some(value) = auth::authorization(authentication, self.hooks).await? {
            request_headers.insert(AUTHORIZATION, value);
        }
        headers::merge(request_headers, &self.hooks.common_headers());
        headers::merge(request_headers, operation.header_map());

        if !request_headers.contains_key(ACCEPT)
            && !transport.default_headers().contains_key(ACCEPT)
        {
            request_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        Ok(request)
    }
}
