//! [`HyperTransport`]: the reference [`Transport`] over hyper-util and rustls.
//!
//! Requests go through a boxed tower service, so any tower [`Layer`] can be
//! stacked on top of the raw connection pool.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use http_body_util::{BodyExt, Full};
use hyper::ext::ReasonPhrase;
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tokio::time::{Instant, timeout_at};
use tower::Layer;
use tower::util::BoxCloneService;
use tower_service::Service;
use url::Url;

use crate::{
    CancellationToken, Completion, Error, Request, Response, RestServiceSettings, Result,
    Transport, TransportFactory,
    config::{ClientConfig, ClientConfigBuilder},
    connector::https_connector,
    headers,
    middleware::LoggingLayer,
};

/// Type-erased service layers are stacked on.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future returned by the boxed service.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

type LayerFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Makes the boxed service `Sync`: the lock is only held to clone it.
#[derive(Clone)]
struct SyncService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SyncService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();

        Box::pin(async move { service.call(request).await })
    }
}

/// Innermost service: the hyper connection pool.
#[derive(Clone)]
struct RawHyperClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl RawHyperClient {
    fn new(config: &ClientConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(config.connect_timeout));

        Self {
            inner,
            timeout: config.timeout,
        }
    }

    fn build_hyper_request(request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body, extensions) = request.into_parts();

        let mut http_request = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str())
            .body(body.map_or_else(Full::default, Full::new))
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        *http_request.headers_mut() = headers;
        *http_request.extensions_mut() = extensions;

        Ok(http_request)
    }

    async fn execute(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let method = request.method();
        let url = request.url().clone();
        let completion = request.completion();
        let hyper_request = Self::build_hyper_request(request)?;
        let deadline = Instant::now() + self.timeout;

        let response = timeout_at(deadline, self.inner.request(hyper_request))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(Self::map_hyper_error)?;

        let (parts, body) = response.into_parts();
        let collected = match completion {
            Completion::ResponseContentRead => timeout_at(deadline, body.collect())
                .await
                .map_err(|_| Error::Timeout)?,
            Completion::ResponseHeadersRead => body.collect().await,
        }
        .map_err(|e| Error::connection(e.to_string()))?;

        let mut response = Response::new(parts.status, parts.headers, collected.to_bytes())
            .with_origin(method, url);
        if let Some(reason) = parts.extensions.get::<ReasonPhrase>() {
            response = response.with_reason(String::from_utf8_lossy(reason.as_bytes()));
        }
        Ok(response)
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_hyper_error(err: hyper_util::client::legacy::Error) -> Error {
        let msg = err.to_string();

        if err.is_connect() {
            return Error::connection(msg);
        }

        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(msg);
        }

        Error::connection(msg)
    }
}

impl Service<Request<Bytes>> for RawHyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.execute(request).await })
    }
}

/// Base-address scoped HTTP transport with connection pooling, TLS and tower
/// middleware.
///
/// Default headers are added to requests that do not already carry a header
/// of the same name. Sending races the cancellation token.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use restkit::HyperTransport;
///
/// # fn main() -> restkit::Result<()> {
/// let transport = HyperTransport::builder("https://api.example.com/v1/")
///     .timeout(Duration::from_secs(30))
///     .default_header("X-Tenant", "acme")
///     .with_logging()
///     .build()?;
/// # let _ = transport;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    service: SyncService,
    config: ClientConfig,
    base_url: Url,
    default_headers: HeaderMap,
}

impl fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransport")
            .field("base_url", &self.base_url.as_str())
            .field("default_headers", &self.default_headers)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperTransport {
    /// Transport for `settings` with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`HyperTransportBuilder::build`].
    pub fn new(settings: &RestServiceSettings) -> Result<Self> {
        Self::from_settings(settings).build()
    }

    /// Builder pre-filled with the base URL and default headers of `settings`.
    #[must_use]
    pub fn from_settings(settings: &RestServiceSettings) -> HyperTransportBuilder {
        HyperTransportBuilder {
            base_address: settings.base_url().to_string(),
            default_headers: settings.default_headers().clone(),
            ..HyperTransportBuilder::default()
        }
    }

    /// Create a new transport builder.
    #[must_use]
    pub fn builder(base_address: impl Into<String>) -> HyperTransportBuilder {
        HyperTransportBuilder {
            base_address: base_address.into(),
            ..HyperTransportBuilder::default()
        }
    }

    /// Connection configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Transport for HyperTransport {
    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    async fn send(
        &self,
        mut request: Request<Bytes>,
        cancel: &CancellationToken,
    ) -> Result<Response<Bytes>> {
        headers::fill_missing(request.headers_mut(), &self.default_headers);

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            result = self.service.call(request) => result,
        }
    }
}

/// Builder for [`HyperTransport`].
#[derive(Default)]
pub struct HyperTransportBuilder {
    base_address: String,
    default_headers: HeaderMap,
    invalid_headers: Vec<String>,
    config: ClientConfigBuilder,
    layers: Vec<LayerFn>,
}

impl fmt::Debug for HyperTransportBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperTransportBuilder")
            .field("base_address", &self.base_address)
            .field("default_headers", &self.default_headers)
            .field("config", &self.config)
            .field("layers_count", &self.layers.len())
            .finish_non_exhaustive()
    }
}

impl HyperTransportBuilder {
    /// Set the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Replace the whole connection configuration.
    #[must_use]
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.config = ClientConfig::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_per_host(config.pool_idle_per_host)
            .pool_idle_timeout(config.pool_idle_timeout);
        self
    }

    /// Add a default header. A repeated name adds another value.
    #[must_use]
    pub fn default_header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.default_headers.append(name, value);
            }
            _ => self.invalid_headers.push(name.to_owned()),
        }
        self
    }

    /// Add a tower layer.
    ///
    /// Layers are applied in order: first added = outermost.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers.push(Arc::new(move |service| {
            BoxCloneService::new(layer.layer(service))
        }));
        self
    }

    /// Log every exchange at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log every exchange at debug level, headers included.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Build the transport.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] for a missing base address or an invalid
    ///   default header
    /// - [`Error::InvalidUrl`] for an unparsable base address
    pub fn build(self) -> Result<HyperTransport> {
        if let Some(name) = self.invalid_headers.first() {
            return Err(Error::configuration(format!("invalid default header `{name}`")));
        }
        let base_address = self.base_address.trim();
        if base_address.is_empty() {
            return Err(Error::configuration("base address is required"));
        }
        let base_url = Url::parse(base_address)?;

        let config = self.config.build();
        let mut service = BoxCloneService::new(RawHyperClient::new(&config));
        // First added = outermost, so wrap in reverse.
        for layer in self.layers.iter().rev() {
            service = layer(service);
        }

        Ok(HyperTransport {
            service: SyncService::new(service),
            config,
            base_url,
            default_headers: self.default_headers,
        })
    }
}

/// [`TransportFactory`] producing [`HyperTransport`]s from service settings.
///
/// The created transport takes its base URL and default headers from the
/// settings; connection options and logging come from the factory.
#[derive(Debug, Clone, Default)]
pub struct HyperTransportFactory {
    config: ClientConfig,
    logging: Option<LoggingLayer>,
}

impl HyperTransportFactory {
    /// Factory with the given connection configuration.
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self {
            config,
            logging: None,
        }
    }

    /// Add a logging layer to every created transport.
    #[must_use]
    pub const fn with_logging(mut self, layer: LoggingLayer) -> Self {
        self.logging = Some(layer);
        self
    }
}

impl TransportFactory for HyperTransportFactory {
    type Transport = HyperTransport;

    fn create(
        &self,
        _name: Option<&str>,
        settings: &RestServiceSettings,
    ) -> Result<HyperTransport> {
        let mut builder = HyperTransport::from_settings(settings).config(&self.config);
        if let Some(layer) = self.logging {
            builder = builder.layer(layer);
        }
        builder.build()
    }
}
