//! Typed REST calls over a pluggable transport.
//!
//! A [`RestClient`] turns an [`Operation`] (verb, path template, path and
//! query parameters, payload, per-call headers) into a request, sends it
//! through a [`Transport`], runs the before/after interceptors from its
//! [`Hooks`], and returns either the raw [`Response`] or a decoded value,
//! together with the [`CallInfo`] of the call.
//!
//! # Example
//!
//! ```no_run
//! use restkit::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct Order {
//!     id: u64,
//!     total: f64,
//! }
//!
//! #[derive(Serialize)]
//! pub struct NewOrder<'a> {
//!     sku: &'a str,
//!     quantity: u32,
//! }
//!
//! # async fn run() -> restkit::Result<()> {
//! let settings = RestServiceSettings::builder("https://shop.example.com/api")
//!     .basic_auth("me", "secret")
//!     .build()?;
//! let client = RestClient::connect(settings);
//!
//! let order = NewOrder { sku: "A-1", quantity: 2 };
//! let created = client
//!     .send_typed::<Order, _>(Operation::post("customers/{id}/orders")
//!         .path(path_params! { "id" => 7 }?)
//!         .data(&order))
//!     .await?
//!     .into_value();
//!
//! let open = client
//!     .send_typed::<Vec<Order>, _>(Operation::get("orders")
//!         .query(query_params! { "status" => ["open", "late"], "page" => 1 }?))
//!     .await?;
//! # let _ = (created, open);
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! Everything fails with [`Error`]. A non-2xx answer is [`Error::Http`], a
//! body that does not match the requested type is [`Error::Serialization`],
//! transport failures are [`Error::Connection`], [`Error::Tls`] or
//! [`Error::Timeout`], and a cancelled call is [`Error::Cancelled`]. The
//! after-call interceptor can suppress all of them except serialization
//! errors.

mod auth;
mod client;
mod composer;
mod config;
mod connector;
mod decoder;
mod dispatcher;
mod headers;
mod hooks;
pub mod middleware;
mod operation;
pub mod prelude;
mod provider;
mod settings;
#[cfg(test)]
mod testing;
mod transport;

pub use client::{RestClient, RestClientBuilder};
pub use composer::RequestComposer;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use decoder::ResponseDecoder;
pub use dispatcher::{Call, CallInfo, Dispatched, Dispatcher};
pub use hooks::{CredentialFuture, Hooks, HooksBuilder};
pub use operation::Operation;
pub use provider::{Direct, Named, PerCall, TransportFactory, TransportProvider};
pub use settings::{RestServiceSettings, RestServiceSettingsBuilder};
pub use transport::{
    BoxedService, HyperTransport, HyperTransportBuilder, HyperTransportFactory, ServiceFuture,
};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types
pub use restkit_core::{
    Authentication, CancellationToken, Completion, Credential, Error, HeaderMap,
    JSON_CONTENT_TYPE, JsonSerializer, Method, PathAwareJsonSerializer, PathParameters,
    QueryParameter, QueryParameters, QueryValue, Request, RequestBuilder, Response, Result,
    Serializer, StatusCode, TimeSpan, TimeSpanError, Transport, compose_url, from_json, header,
    to_json,
};

// Re-export parameter macros
pub use restkit_core::{path_params, query_params};

pub use url;
