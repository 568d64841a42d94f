//! Transport collaborator.
//!
//! A [`Transport`] is a base-address scoped HTTP connection: it knows the
//! base URL relative operations resolve against and the default headers it
//! adds to every request, and it sends fully composed requests.
//!
//! Implement it directly to plug in another HTTP stack or a test double.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use http::HeaderMap;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{Request, Response, Result};

/// How much of the response a transport buffers before resolving `send`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Completion {
    /// The whole body is read within the request timeout.
    #[default]
    ResponseContentRead,
    /// Only the status line and headers count against the request timeout;
    /// the body is read afterwards.
    ResponseHeadersRead,
}

/// Base-address scoped HTTP transport.
///
/// # Example
///
/// ```ignore
/// use restkit_core::{Request, Response, Result, Transport};
///
/// struct Recording {
///     base_url: Url,
///     headers: HeaderMap,
///     sent: Mutex<Vec<String>>,
/// }
///
/// impl Transport for Recording {
///     fn base_url(&self) -> &Url {
///         &self.base_url
///     }
///
///     fn default_headers(&self) -> &HeaderMap {
///         &self.headers
///     }
///
///     async fn send(&self, request: Request, _cancel: &CancellationToken) -> Result<Response> {
///         self.sent.lock().unwrap().push(request.url().to_string());
///         Ok(Response::new(StatusCode::NO_CONTENT, HeaderMap::new(), Bytes::new()))
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Base URL relative operations are resolved against.
    fn base_url(&self) -> &Url;

    /// Headers added to every request that does not already carry them.
    fn default_headers(&self) -> &HeaderMap;

    /// Send a request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`](crate::Error::Cancelled) when `cancel`
    /// fires first, and a transport error (connection, TLS, timeout) when the
    /// exchange fails. Non-2xx responses are *not* errors at this level.
    fn send(
        &self,
        request: Request<Bytes>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn base_url(&self) -> &Url {
        (**self).base_url()
    }

    fn default_headers(&self) -> &HeaderMap {
        (**self).default_headers()
    }

    fn send(
        &self,
        request: Request<Bytes>,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).send(request, cancel)
    }
}
