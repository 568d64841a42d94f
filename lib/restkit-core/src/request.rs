//! Outbound HTTP requests.
//!
//! A [`Request`] is built once per call by the composer and handed to a
//! [`Transport`](crate::Transport). Its URL is absolute: placeholders are
//! already substituted and the query string appended.
//!
//! # Example
//!
//! ```
//! use restkit_core::{Completion, Method, Request};
//! use restkit_core::header::{ACCEPT, HeaderValue};
//!
//! let request = Request::builder(Method::Get, "https://api.example.com/users?page=1".parse().unwrap())
//!     .header(ACCEPT, HeaderValue::from_static("application/json"))
//!     .completion(Completion::ResponseHeadersRead)
//!     .build();
//!
//! assert_eq!(request.header("accept"), Some("application/json"));
//! assert_eq!(request.completion(), Completion::ResponseHeadersRead);
//! ```

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Extensions, HeaderMap};

use crate::{Completion, Method};

/// An HTTP request with method, URL, headers, and optional body.
#[derive(Debug, Clone)]
pub struct Request<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HeaderMap,
    body: Option<B>,
    extensions: Extensions,
}

impl Request {
    /// Creates a new [`RequestBuilder`] for a byte body.
    ///
    /// Other body types go through [`RequestBuilder::new`].
    #[must_use]
    pub fn builder(method: Method, url: url::Url) -> RequestBuilder {
        RequestBuilder::new(method, url)
    }
}

impl<B> Request<B> {
    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Request URL.
    #[must_use]
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable access to headers.
    #[must_use]
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First value of a header, if it is visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    /// Request extensions.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable access to extensions.
    #[must_use]
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// How much of the response the transport should buffer.
    ///
    /// Defaults to [`Completion::ResponseContentRead`].
    #[must_use]
    pub fn completion(&self) -> Completion {
        self.extensions
            .get::<Completion>()
            .copied()
            .unwrap_or_default()
    }

    /// Consume into (method, url, headers, body, extensions).
    #[must_use]
    pub fn into_parts(self) -> (Method, url::Url, HeaderMap, Option<B>, Extensions) {
        (
            self.method,
            self.url,
            self.headers,
            self.body,
            self.extensions,
        )
    }
}

/// Builder for constructing [`Request`] instances.
#[derive(Debug, Clone)]
pub struct RequestBuilder<B = Bytes> {
    method: Method,
    url: url::Url,
    headers: HeaderMap,
    body: Option<B>,
    extensions: Extensions,
}

impl<B> RequestBuilder<B> {
    /// Creates a new builder.
    #[must_use]
    pub fn new(method: Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            extensions: Extensions::new(),
        }
    }

    /// Sets a header, replacing any previous value of that name.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets a header from strings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`](crate::Error::InvalidHeader) if the
    /// name or value is not valid on the wire.
    pub fn try_header(self, name: &str, value: &str) -> crate::Result<Self> {
        let name = HeaderName::try_from(name)
            .map_err(|e| crate::Error::invalid_header(format!("{name}: {e}")))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| crate::Error::invalid_header(format!("{name}: {e}")))?;
        Ok(self.header(name, value))
    }

    /// Replaces all headers.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    /// Stores a typed extension for the transport and middleware.
    #[must_use]
    pub fn extension<T: Clone + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    /// Sets how much of the response the transport should buffer.
    #[must_use]
    pub fn completion(self, completion: Completion) -> Self {
        self.extension(completion)
    }

    /// Builds the [`Request`].
    #[must_use]
    pub fn build(self) -> Request<B> {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            extensions: self.extensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use http::header::{ACCEPT, CONTENT_TYPE};

    use super::*;

    fn url() -> url::Url {
        url::Url::parse("https://api.example.com/users").expect("valid URL")
    }

    #[test]
    fn request_builder_basic() {
        let request = Request::builder(Method::Get, url())
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .build();

        check!(request.method() == Method::Get);
        check!(request.url().as_str() == "https://api.example.com/users");
        check!(request.header("Accept") == Some("application/json"));
        check!(request.body().is_none());
        check!(request.completion() == Completion::ResponseContentRead);
    }

    #[test]
    fn header_replaces_previous_value() {
        let request = Request::builder(Method::Get, url())
            .header(ACCEPT, HeaderValue::from_static("text/plain"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .build();

        check!(request.headers().get_all(ACCEPT).iter().count() == 1);
        check!(request.header("accept") == Some("application/json"));
    }

    #[test]
    fn try_header_rejects_invalid_values() {
        let builder = Request::builder(Method::Get, url());
        check!(builder.clone().try_header("X-Ok", "fine").is_ok());
        check!(builder.clone().try_header("bad name", "v").is_err());
        check!(builder.try_header("X-Bad", "line\nbreak").is_err());
    }

    #[test]
    fn request_builder_with_body() {
        let body = Bytes::from(r#"{"name":"test"}"#);
        let request = Request::builder(Method::Post, url())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body.clone())
            .build();

        check!(request.method() == Method::Post);
        check!(request.body() == Some(&body));
    }

    #[test]
    fn completion_travels_in_extensions() {
        let request = Request::builder(Method::Get, url())
            .completion(Completion::ResponseHeadersRead)
            .build();
        let (_, _, _, _, extensions) = request.into_parts();
        check!(extensions.get::<Completion>() == Some(&Completion::ResponseHeadersRead));
    }
}
