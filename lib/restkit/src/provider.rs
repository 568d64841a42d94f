//! Where a client gets its transport from.
//!
//! - [`Direct`]: one injected transport shared by every call
//! - [`PerCall`]: a fresh transport from a [`TransportFactory`] for every call
//! - [`Named`]: one transport created by a factory on first use, then reused

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::{RestServiceSettings, Result, Transport};

/// Supplies the transport a call is sent through.
pub trait TransportProvider: Send + Sync {
    /// Transport handed out for one call.
    type Transport: Transport;

    /// Transport for the next call.
    ///
    /// # Errors
    ///
    /// Returns the factory's error when a transport has to be created and
    /// cannot be.
    fn transport(
        &self,
        settings: &RestServiceSettings,
    ) -> impl Future<Output = Result<Self::Transport>> + Send;
}

/// Creates transports from service settings.
pub trait TransportFactory: Send + Sync {
    /// Created transport.
    type Transport: Transport;

    /// Create a transport for `settings`; `name` is the named-handle
    /// discriminator, if any.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) (or a TLS
    /// error) when the transport cannot be built.
    fn create(&self, name: Option<&str>, settings: &RestServiceSettings) -> Result<Self::Transport>;
}

impl<F, T> TransportFactory for F
where
    F: Fn(Option<&str>, &RestServiceSettings) -> Result<T> + Send + Sync,
    T: Transport,
{
    type Transport = T;

    fn create(&self, name: Option<&str>, settings: &RestServiceSettings) -> Result<T> {
        self(name, settings)
    }
}

/// One injected transport shared by every call.
#[derive(Debug)]
pub struct Direct<T> {
    transport: Arc<T>,
}

impl<T> Direct<T> {
    /// Wrap a transport.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Share an already shared transport.
    #[must_use]
    pub const fn from_arc(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

impl<T> Clone for Direct<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport> TransportProvider for Direct<T> {
    type Transport = Arc<T>;

    async fn transport(&self, _settings: &RestServiceSettings) -> Result<Arc<T>> {
        Ok(Arc::clone(&self.transport))
    }
}

/// A fresh transport for every call.
#[derive(Debug, Clone)]
pub struct PerCall<F> {
    factory: F,
}

impl<F: TransportFactory> PerCall<F> {
    /// Create transports with `factory`.
    #[must_use]
    pub const fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F: TransportFactory> TransportProvider for PerCall<F> {
    type Transport = F::Transport;

    async fn transport(&self, settings: &RestServiceSettings) -> Result<F::Transport> {
        self.factory.create(settings.name(), settings)
    }
}

/// One transport created on first use and cached for the client's lifetime.
///
/// Concurrent first calls wait for a single creation.
pub struct Named<F: TransportFactory> {
    factory: F,
    transport: OnceCell<Arc<F::Transport>>,
}

impl<F: TransportFactory> Named<F> {
    /// Lazily create the transport with `factory`.
    #[must_use]
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            transport: OnceCell::new(),
        }
    }

    /// Whether the transport has been created yet.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.transport.initialized()
    }
}

impl<F: TransportFactory> fmt::Debug for Named<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Named")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl<F: TransportFactory> TransportProvider for Named<F> {
    type Transport = Arc<F::Transport>;

    async fn transport(&self, settings: &RestServiceSettings) -> Result<Arc<F::Transport>> {
        let transport = self
            .transport
            .get_or_try_init(|| async {
                debug!(
                    name = settings.name(),
                    base_url = %settings.base_url(),
                    "creating named transport"
                );
                self.factory.create(settings.name(), settings).map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(transport))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert2::{check, let_assert};

    use super::*;
    use crate::Error;
    use crate::testing::StubTransport;

    fn settings() -> RestServiceSettings {
        RestServiceSettings::builder("https://api.example.com/")
            .name("inventory")
            .build()
            .expect("valid settings")
    }

    fn counting_factory(
        created: &Arc<AtomicUsize>,
    ) -> impl Fn(Option<&str>, &RestServiceSettings) -> Result<StubTransport> + Send + Sync + use<> {
        let created = Arc::clone(created);
        move |name: Option<&str>, settings: &RestServiceSettings| {
            check!(name == Some("inventory"));
            created.fetch_add(1, Ordering::SeqCst);
            Ok(StubTransport::new(settings.base_url().as_str()))
        }
    }

    #[tokio::test]
    async fn direct_hands_out_the_same_transport() {
        let provider = Direct::new(StubTransport::new("https://api.example.com/"));

        let first = provider.transport(&settings()).await.expect("transport");
        let second = provider.transport(&settings()).await.expect("transport");

        check!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn per_call_creates_every_time() {
        let created = Arc::new(AtomicUsize::new(0));
        let provider = PerCall::new(counting_factory(&created));

        provider.transport(&settings()).await.expect("transport");
        provider.transport(&settings()).await.expect("transport");

        check!(created.load(Ordering::SeqCst) == 2);
    }

    #[tokio::test]
    async fn named_creates_once() {
        let created = Arc::new(AtomicUsize::new(0));
        let provider = Named::new(counting_factory(&created));
        check!(!provider.is_initialized());

        let first = provider.transport(&settings()).await.expect("transport");
        let second = provider.transport(&settings()).await.expect("transport");

        check!(Arc::ptr_eq(&first, &second));
        check!(provider.is_initialized());
        check!(created.load(Ordering::SeqCst) == 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn named_creates_once_under_concurrency() {
        let created = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(Named::new(counting_factory(&created)));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let provider = Arc::clone(&provider);
                tokio::spawn(async move { provider.transport(&settings()).await.map(|_| ()) })
            })
            .collect();
        for task in tasks {
            task.await.expect("joined").expect("transport");
        }

        check!(created.load(Ordering::SeqCst) == 1);
    }

    #[tokio::test]
    async fn named_retries_after_a_failed_creation() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let provider = Named::new(move |_: Option<&str>, settings: &RestServiceSettings| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::configuration("not yet"))
            } else {
                Ok(StubTransport::new(settings.base_url().as_str()))
            }
        });

        let_assert!(Err(Error::Configuration(_)) = provider.transport(&settings()).await);
        check!(provider.transport(&settings()).await.is_ok());
        check!(attempts.load(Ordering::SeqCst) == 2);
    }
}
