//! Core types for restkit.
//!
//! This crate holds everything a call needs that does not perform I/O:
//! - [`PathParameters`], [`QueryParameters`] and [`compose_url`] - parameter encoding
//! - [`Method`], [`Request`] and [`Response`] - HTTP exchange types
//! - [`Error`] and [`Result`] - the error taxonomy
//! - [`Serializer`] - pluggable body serialization, with [`JsonSerializer`]
//!   and [`PathAwareJsonSerializer`]
//! - [`TimeSpan`] - signed duration with a fixed `[-][d.]hh:mm:ss[.fffffff]` wire form
//! - [`Transport`] - the collaborator that actually sends requests
//! - [`Authentication`] and [`Credential`] - authentication configuration
//! - [`StatusCode`] and [`header`] - re-exported from the `http` crate

mod auth;
mod error;
mod method;
mod params;
pub mod prelude;
mod request;
mod response;
mod serializer;
mod timespan;
mod transport;

pub use auth::{Authentication, Credential};
pub use error::{Error, Result};
pub use method::Method;
pub use params::{PathParameters, QueryParameter, QueryParameters, QueryValue, compose_url};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use serializer::{
    JSON_CONTENT_TYPE, JsonSerializer, PathAwareJsonSerializer, Serializer, from_json, to_json,
};
pub use timespan::{TimeSpan, TimeSpanError};
pub use transport::{Completion, Transport};

// Re-export http crate types for status codes and headers
pub use http::{HeaderMap, StatusCode, header};

// Cancellation token threaded through every call
pub use tokio_util::sync::CancellationToken;
