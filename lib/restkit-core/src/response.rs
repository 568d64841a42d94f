//! HTTP response handling.
//!
//! [`Response`] exposes status, headers and the buffered body, plus the method
//! and URL of the request it answers when the transport recorded them.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use url::Url;

use crate::Method;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: StatusCode,
    headers: HeaderMap,
    body: B,
    reason: Option<String>,
    origin: Option<(Method, Url)>,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: B) -> Self {
        Self {
            status,
            headers,
            body,
            reason: None,
            origin: None,
        }
    }

    /// Records a reason phrase the server sent instead of the canonical one.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Records the request this response answers.
    #[must_use]
    pub fn with_origin(mut self, method: Method, url: Url) -> Self {
        self.origin = Some((method, url));
        self
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Reason phrase sent by the server, if it was not the canonical one.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Reason phrase of the status line, falling back to the canonical one.
    #[must_use]
    pub fn reason_phrase(&self) -> Option<&str> {
        self.reason
            .as_deref()
            .or_else(|| self.status.canonical_reason())
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if it is visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Method and URL of the originating request.
    #[must_use]
    pub fn origin(&self) -> Option<(Method, &Url)> {
        self.origin.as_ref().map(|(method, url)| (*method, url))
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, B) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Status is 204 No Content.
    #[must_use]
    pub fn is_no_content(&self) -> bool {
        self.status == StatusCode::NO_CONTENT
    }

    /// Transform the body with a function.
    pub fn map_body<F, B2>(self, f: F) -> Response<B2>
    where
        F: FnOnce(B) -> B2,
    {
        Response {
            status: self.status,
            headers: self.headers,
            body: f(self.body),
            reason: self.reason,
            origin: self.origin,
        }
    }
}

impl Response<Bytes> {
    /// Stand-in for a call that produced no real response.
    ///
    /// Carries `205 Reset Content` and an empty body.
    #[must_use]
    pub fn placeholder(method: Method, url: Url) -> Self {
        Self::new(StatusCode::RESET_CONTENT, HeaderMap::new(), Bytes::new())
            .with_origin(method, url)
    }

    /// Get the response body as text.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid UTF-8.
    pub fn text(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.body)
    }

    /// Body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use assert2::check;
    use http::header::{CONTENT_TYPE, HeaderValue};

    use super::*;

    #[test]
    fn response_basic() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = Response::new(StatusCode::OK, headers, Bytes::from(r#"{"id":1}"#));

        check!(response.status() == StatusCode::OK);
        check!(response.header("content-type") == Some("application/json"));
        check!(response.is_success());
        check!(!response.is_no_content());
        check!(response.origin().is_none());
    }

    #[test]
    fn reason_phrase_prefers_the_server_one() {
        let response = Response::new(StatusCode::NOT_FOUND, HeaderMap::new(), Bytes::new());
        check!(response.reason().is_none());
        check!(response.reason_phrase() == Some("Not Found"));

        let response = response.with_reason("No Such Customer").map_body(|b| b.len());
        check!(response.reason() == Some("No Such Customer"));
        check!(response.reason_phrase() == Some("No Such Customer"));
    }

    #[test]
    fn placeholder_is_reset_content() {
        let url = Url::parse("https://api.example.com/users").expect("valid URL");
        let response = Response::placeholder(Method::Delete, url.clone());

        check!(response.status() == StatusCode::RESET_CONTENT);
        check!(response.body().is_empty());
        check!(response.origin() == Some((Method::Delete, &url)));
    }

    #[test]
    fn response_text() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), Bytes::from("Hello"));
        check!(response.text() == Ok("Hello"));

        let response = Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from_static(b"bad \xff"),
        );
        check!(response.text().is_err());
        check!(response.text_lossy() == "bad \u{fffd}");
    }

    #[test]
    fn response_map_body() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), Bytes::from("test"));
        let mapped = response.map_body(|b| b.len());

        check!(mapped.status() == StatusCode::OK);
        check!(*mapped.body() == 4);
    }
}
