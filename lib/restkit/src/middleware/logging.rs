//! Exchange logging for [`HyperTransport`](crate::HyperTransport).
//!
//! One `transport_exchange` span per request, with the outcome logged when the
//! exchange ends. Sensitive header values (such as `Authorization`) are
//! rendered as `Sensitive` at debug level.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use bytes::Bytes;
use tower::{Layer, Service};
use tracing::{Instrument, Level, debug, info, span, warn};

use crate::{Error, Request, Response, Result};

/// Layer that logs every exchange going through the transport.
///
/// # Example
///
/// ```no_run
/// use restkit::HyperTransport;
/// use restkit::middleware::LoggingLayer;
///
/// let transport = HyperTransport::builder("https://api.example.com/")
///     .layer(LoggingLayer::debug())
///     .build();
/// # let _ = transport;
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// Verbosity of [`LoggingLayer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Request and response headers, body sizes.
    Debug,
    /// Method, URL, status and elapsed time.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Info-level logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Debug-level logging.
    #[must_use]
    pub const fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }

    /// Configured verbosity.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service produced by [`LoggingLayer`].
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Service<Request<Bytes>> for Logging<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let method = request.method();
        let url = request.url().to_string();
        let level = self.level;
        let span = span!(Level::INFO, "transport_exchange", %method, %url);

        let mut inner = self.inner.clone();
        Box::pin(
            async move {
                let start = Instant::now();
                match level {
                    LogLevel::Debug => debug!(
                        headers = ?request.headers(),
                        body_bytes = request.body().map_or(0, Bytes::len),
                        completion = ?request.completion(),
                        "sending request"
                    ),
                    LogLevel::Info => info!("sending request"),
                }

                let result = inner.call(request).await;
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

                match (&result, level) {
                    (Ok(response), LogLevel::Debug) => debug!(
                        status = response.status().as_u16(),
                        headers = ?response.headers(),
                        body_bytes = response.body().len(),
                        elapsed_ms,
                        "response received"
                    ),
                    (Ok(response), LogLevel::Info) => {
                        info!(status = response.status().as_u16(), elapsed_ms, "response received");
                    }
                    (Err(err), _) => warn!(error = %err, elapsed_ms, "exchange failed"),
                }

                result
            }
            .instrument(span),
        )
    }
}
