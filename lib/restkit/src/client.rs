//! [`RestClient`]: the typed call facade.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{
    Call, CallInfo, Direct, Hooks, HyperTransportFactory, JsonSerializer, Named, Operation,
    PerCall, RequestComposer, Response, ResponseDecoder, RestServiceSettings, Result, Serializer,
    Transport, TransportFactory, TransportProvider, dispatcher::Dispatcher,
};

/// Client of one REST service.
///
/// A call composes the request from an [`Operation`] (URL, body,
/// authorization and headers), dispatches it through the provider's transport
/// with the interceptors applied, and either hands back the raw
/// [`Response`] or decodes it.
///
/// Cloning is cheap; clones share the transport, hooks and
/// [`last_call`](Self::last_call).
///
/// # Example
///
/// ```no_run
/// use restkit::{Operation, RestClient, RestServiceSettings, path_params};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn run() -> restkit::Result<()> {
/// let settings = RestServiceSettings::builder("https://api.example.com/v1")
///     .basic_auth("me", "secret")
///     .build()?;
/// let client = RestClient::connect(settings);
///
/// let call = client
///     .send_typed::<User, _>(Operation::get("users/{id}").path(path_params! { "id" => 42 }?))
///     .await?;
/// println!("{:?} in {:?}", call.value(), call.info().elapsed());
/// # Ok(())
/// # }
/// ```
pub struct RestClient<P, S = JsonSerializer> {
    inner: Arc<Inner<P, S>>,
}

struct Inner<P, S> {
    settings: RestServiceSettings,
    provider: P,
    serializer: S,
    hooks: Hooks,
    throw_on_cancellation: bool,
    last_call: Mutex<Option<CallInfo>>,
}

impl<P, S> Clone for RestClient<P, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P, S> fmt::Debug for RestClient<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("settings", &self.inner.settings)
            .field("hooks", &self.inner.hooks)
            .field("throw_on_cancellation", &self.inner.throw_on_cancellation)
            .finish_non_exhaustive()
    }
}

impl RestClient<Named<HyperTransportFactory>> {
    /// Client over a lazily created, cached [`HyperTransport`](crate::HyperTransport)
    /// with the default connection configuration.
    #[must_use]
    pub fn connect(settings: RestServiceSettings) -> Self {
        RestClient::builder(settings)
            .named(HyperTransportFactory::default())
            .build()
    }
}

impl RestClient<()> {
    /// Create a new client builder.
    #[must_use]
    pub fn builder(settings: RestServiceSettings) -> RestClientBuilder {
        RestClientBuilder {
            settings,
            provider: (),
            serializer: JsonSerializer,
            hooks: Hooks::default(),
            throw_on_cancellation: true,
        }
    }
}

impl<P, S> RestClient<P, S> {
    /// Service settings.
    #[must_use]
    pub fn settings(&self) -> &RestServiceSettings {
        &self.inner.settings
    }

    /// Hooks consulted on every call.
    #[must_use]
    pub fn hooks(&self) -> &Hooks {
        &self.inner.hooks
    }

    /// Whether a cancelled call is raised when the interceptor lets it.
    #[must_use]
    pub fn throw_on_cancellation(&self) -> bool {
        self.inner.throw_on_cancellation
    }

    /// Metadata of the most recently finished call.
    ///
    /// Concurrent calls race for this slot; prefer [`Call::info`].
    #[must_use]
    pub fn last_call(&self) -> Option<CallInfo> {
        self.inner
            .last_call
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, info: &CallInfo) {
        *self
            .inner
            .last_call
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(info.clone());
    }
}

impl<P, S> RestClient<P, S>
where
    P: TransportProvider,
    S: Serializer,
{
    /// Issue the call and return the raw response.
    ///
    /// A non-2xx response is an [`Error::Http`](crate::Error::Http) unless the
    /// after-call interceptor suppresses it, in which case the response is
    /// returned as is. A suppressed transport failure or cancellation returns
    /// a `205 Reset Content` placeholder with
    /// [`CallInfo::has_response`] `false`.
    ///
    /// # Errors
    ///
    /// Composition errors (URL, payload serialization, headers), the
    /// provider's error, and every error the interceptor lets through.
    pub async fn send<D>(&self, operation: Operation<'_, D>) -> Result<Call<Response>>
    where
        D: Serialize + Sync + ?Sized,
    {
        let inner = &*self.inner;
        let transport = inner.provider.transport(&inner.settings).await?;
        self.send_through(&transport, &operation).await
    }

    /// Issue the call and decode a 2xx body as `T`.
    ///
    /// The value is `None` for `204 No Content`, an empty body, or an error the
    /// interceptor suppressed.
    ///
    /// # Errors
    ///
    /// Everything [`send`](Self::send) returns, plus
    /// [`Error::Serialization`](crate::Error::Serialization) when the body
    /// cannot be read as `T`. Serialization errors are never offered to the
    /// interceptor.
    pub async fn send_typed<T, D>(&self, operation: Operation<'_, D>) -> Result<Call<Option<T>>>
    where
        T: DeserializeOwned + Send,
        D: Serialize + Sync + ?Sized,
    {
        let (response, info) = self.send(operation).await?.into_parts();
        let value = ResponseDecoder::new(&self.inner.serializer)
            .decode::<T>(&response, &info)
            .await?;
        Ok(Call::new(value, info))
    }

    async fn send_through<T, D>(
        &self,
        transport: &T,
        operation: &Operation<'_, D>,
    ) -> Result<Call<Response>>
    where
        T: Transport,
        D: Serialize + Sync + ?Sized,
    {
        let inner = &*self.inner;
        let request = RequestComposer::new(&inner.serializer, &inner.settings, &inner.hooks)
            .compose(operation, transport)
            .await?;

        let dispatched = Dispatcher::new(&inner.hooks, inner.throw_on_cancellation)
            .dispatch(transport, request, operation.cancellation_token())
            .await;
        self.record(&dispatched.info);
        dispatched.into_call()
    }
}

/// Builder for [`RestClient`].
///
/// The transport provider is chosen with [`direct`](Self::direct),
/// [`per_call`](Self::per_call), [`named`](Self::named) or
/// [`provider`](Self::provider) before [`build`](Self::build) is available.
pub struct RestClientBuilder<P = (), S = JsonSerializer> {
    settings: RestServiceSettings,
    provider: P,
    serializer: S,
    hooks: Hooks,
    throw_on_cancellation: bool,
}

impl<P, S> fmt::Debug for RestClientBuilder<P, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClientBuilder")
            .field("settings", &self.settings)
            .field("hooks", &self.hooks)
            .field("throw_on_cancellation", &self.throw_on_cancellation)
            .finish_non_exhaustive()
    }
}

impl<P, S> RestClientBuilder<P, S> {
    /// Use any transport provider.
    #[must_use]
    pub fn provider<Q: TransportProvider>(self, provider: Q) -> RestClientBuilder<Q, S> {
        RestClientBuilder {
            settings: self.settings,
            provider,
            serializer: self.serializer,
            hooks: self.hooks,
            throw_on_cancellation: self.throw_on_cancellation,
        }
    }

    /// Send every call through one injected transport.
    ///
    /// Requests are still resolved against the settings' base address and
    /// carry the settings' default headers.
    #[must_use]
    pub fn direct<T: Transport>(self, transport: T) -> RestClientBuilder<Direct<T>, S> {
        if transport.base_url() != self.settings.base_url() {
            warn!(
                settings = %self.settings.base_url(),
                transport = %transport.base_url(),
                "injected transport has another base address, using the settings one"
            );
        }
        self.provider(Direct::new(transport))
    }

    /// Create a new transport for every call.
    #[must_use]
    pub fn per_call<F: TransportFactory>(self, factory: F) -> RestClientBuilder<PerCall<F>, S> {
        self.provider(PerCall::new(factory))
    }

    /// Create one transport on first use and reuse it.
    #[must_use]
    pub fn named<F: TransportFactory>(self, factory: F) -> RestClientBuilder<Named<F>, S> {
        self.provider(Named::new(factory))
    }

    /// Use another serializer.
    #[must_use]
    pub fn serializer<S2: Serializer>(self, serializer: S2) -> RestClientBuilder<P, S2> {
        RestClientBuilder {
            settings: self.settings,
            provider: self.provider,
            serializer,
            hooks: self.hooks,
            throw_on_cancellation: self.throw_on_cancellation,
        }
    }

    /// Set the hooks.
    #[must_use]
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Whether a cancelled call is raised (default) or answered with a
    /// placeholder response.
    #[must_use]
    pub const fn throw_on_cancellation(mut self, throw: bool) -> Self {
        self.throw_on_cancellation = throw;
        self
    }
}

impl<P: TransportProvider, S: Serializer> RestClientBuilder<P, S> {
    /// Build the client.
    #[must_use]
    pub fn build(self) -> RestClient<P, S> {
        RestClient {
            inner: Arc::new(Inner {
                settings: self.settings,
                provider: self.provider,
                serializer: self.serializer,
                hooks: self.hooks,
                throw_on_cancellation: self.throw_on_cancellation,
                last_call: Mutex::new(None),
            }),
        }
    }
}
