//! Tower middleware for [`HyperTransport`](crate::HyperTransport).
//!
//! Any [`tower::Layer`] whose service maps `Request<Bytes>` to
//! `Response<Bytes>` with [`Error`](crate::Error) can be added through
//! [`HyperTransportBuilder::layer`](crate::HyperTransportBuilder::layer).

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};
