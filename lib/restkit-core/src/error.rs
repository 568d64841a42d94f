//! Error types for restkit.
//!
//! Every failure surfaced by a call is one [`Error`]. The variants fall into
//! four families:
//!
//! | Family        | Variants                                  |
//! |---------------|-------------------------------------------|
//! | protocol      | [`Error::Http`]                           |
//! | serialization | [`Error::Serialization`]                  |
//! | transport     | [`Error::Connection`], [`Error::Tls`], [`Error::Timeout`] |
//! | cancellation  | [`Error::Cancelled`]                      |
//!
//! The remaining variants are raised while building a request, before
//! anything is sent.

use derive_more::{Display, Error, From};
use http::StatusCode;
use url::Url;

use crate::Method;

/// Main error type for restkit operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[display(
        "{method} {url} failed with status {} {}",
        status.as_u16(),
        reason_text(*status, reason.as_deref())
    )]
    #[from(skip)]
    Http {
        /// Response status.
        status: StatusCode,
        /// Reason phrase sent by the server, when it is not the canonical one.
        #[error(not(source))]
        reason: Option<String>,
        /// Method of the failed request.
        method: Method,
        /// Absolute URL of the failed request.
        url: Url,
        /// Raw response body text, if any could be read.
        #[error(not(source))]
        body: Option<String>,
    },

    /// A successful response body could not be read as the requested type.
    #[display("cannot read `{type_name}` from {method} {url} (status {status}): {source}")]
    #[from(skip)]
    Serialization {
        /// Name of the requested type.
        type_name: &'static str,
        /// Method of the request.
        method: Method,
        /// Absolute URL of the request.
        url: Url,
        /// Status of the response that could not be parsed.
        status: StatusCode,
        /// The serializer failure.
        source: Box<Error>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The call was cancelled through its cancellation token.
    #[display("request cancelled")]
    #[from(skip)]
    Cancelled,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// Invalid path or query parameter.
    #[display("invalid parameter: {_0}")]
    #[from(skip)]
    InvalidParameter(#[error(not(source))] String),

    /// A header name or value is not valid on the wire.
    #[display("invalid header: {_0}")]
    #[from(skip)]
    InvalidHeader(#[error(not(source))] String),

    /// Invalid client settings.
    #[display("configuration error: {_0}")]
    #[from(skip)]
    Configuration(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city"), empty at the root.
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

fn reason_text(status: StatusCode, reason: Option<&str>) -> &str {
    reason.or_else(|| status.canonical_reason()).unwrap_or_default()
}

impl Error {
    /// Create a protocol error for a non-2xx response.
    #[must_use]
    pub fn http(status: StatusCode, method: Method, url: Url, body: Option<String>) -> Self {
        Self::Http {
            status,
            reason: None,
            method,
            url,
            body,
        }
    }

    /// Attach the server's reason phrase to a protocol error.
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn with_reason(mut self, phrase: impl Into<String>) -> Self {
        if let Self::Http { reason, .. } = &mut self {
            *reason = Some(phrase.into());
        }
        self
    }

    /// Wrap a serializer failure for a successful response.
    #[must_use]
    pub fn serialization<T: ?Sized>(
        method: Method,
        url: Url,
        status: StatusCode,
        source: Self,
    ) -> Self {
        Self::Serialization {
            type_name: std::any::type_name::<T>(),
            method,
            url,
            status,
            source: Box::new(source),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an invalid parameter error.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Create an invalid header error.
    #[must_use]
    pub fn invalid_header(message: impl Into<String>) -> Self {
        Self::InvalidHeader(message.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns `true` for a non-2xx response.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    /// Returns `true` when a successful body could not be deserialized.
    #[must_use]
    pub const fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Returns `true` for network level failures (connection, TLS, timeout).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Tls(_) | Self::Timeout)
    }

    /// Returns `true` if the call was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns the response status for protocol and serialization errors.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } | Self::Serialization { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Reason phrase of the response: the one the server sent, or the
    /// canonical phrase of [`Error::status`].
    #[must_use]
    pub fn reason_phrase(&self) -> Option<&str> {
        match self {
            Self::Http { status, reason, .. } => {
                reason.as_deref().or_else(|| status.canonical_reason())
            }
            Self::Serialization { status, .. } => status.canonical_reason(),
            _ => None,
        }
    }

    /// Method of the request this error belongs to.
    #[must_use]
    pub const fn method(&self) -> Option<Method> {
        match self {
            Self::Http { method, .. } | Self::Serialization { method, .. } => Some(*method),
            _ => None,
        }
    }

    /// Absolute URL of the request this error belongs to.
    #[must_use]
    pub const fn url(&self) -> Option<&Url> {
        match self {
            Self::Http { url, .. } | Self::Serialization { url, .. } => Some(url),
            _ => None,
        }
    }

    /// Raw body text of a non-2xx response.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Name of the type that failed to deserialize.
    #[must_use]
    pub const fn type_name(&self) -> Option<&'static str> {
        match self {
            Self::Serialization { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.is_protocol() && self.status().is_some_and(|s| s.is_client_error())
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.is_protocol() && self.status().is_some_and(|s| s.is_server_error())
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.is_protocol() && self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Try to decode the raw body of a protocol error as JSON.
    ///
    /// Returns `None` when this is not a protocol error or there is no body.
    ///
    /// # Example
    ///
    /// ```ignore
    /// #[derive(Debug, Deserialize)]
    /// struct ApiError {
    ///     code: String,
    /// }
    ///
    /// if let Err(err) = client.get::<User>("users/{id}", &path, &query, &headers).await {
    ///     if let Some(Ok(api)) = err.decode_body::<ApiError>() {
    ///         tracing::warn!(code = %api.code, "api rejected the call");
    ///     }
    /// }
    /// ```
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.raw_body()
            .filter(|body| !body.is_empty())
            .map(|body| crate::from_json(body.as_bytes()))
    }
}
