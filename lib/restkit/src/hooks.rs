//! Per-client capability hooks.
//!
//! A [`Hooks`] value bundles the optional behaviours a client consults during
//! a call: credential providers for [`Authentication::External`], common
//! headers, and the before/after call interceptors. Unset hooks fall back to
//! doing nothing (and the after-call interceptor to "raise").
//!
//! [`Authentication::External`]: crate::Authentication::External

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::HeaderMap;

use crate::{Credential, Error, Request, Response};

/// Boxed future returned by an async credential provider.
pub type CredentialFuture = Pin<Box<dyn Future<Output = Option<Credential>> + Send>>;

type CredentialFn = Arc<dyn Fn() -> Option<Credential> + Send + Sync>;
type AsyncCredentialFn = Arc<dyn Fn() -> CredentialFuture + Send + Sync>;
type CommonHeadersFn = Arc<dyn Fn() -> HeaderMap + Send + Sync>;
type BeforeCallFn = Arc<dyn Fn(&mut Request) + Send + Sync>;
type AfterCallFn = Arc<dyn Fn(Option<&Response>, Option<&Error>) -> bool + Send + Sync>;

/// Function-valued hooks of a client.
///
/// # Example
///
/// ```
/// use restkit::{Credential, Hooks};
///
/// let hooks = Hooks::builder()
///     .credential(|| Some(Credential::bearer("token")))
///     .after_call(|response, _error| {
///         // swallow 404s, raise everything else
///         !response.is_some_and(|r| r.status().as_u16() == 404)
///     })
///     .build();
/// # let _ = hooks;
/// ```
#[derive(Clone, Default)]
pub struct Hooks {
    credential: Option<CredentialFn>,
    credential_async: Option<AsyncCredentialFn>,
    common_headers: Option<CommonHeadersFn>,
    before_call: Option<BeforeCallFn>,
    after_call: Option<AfterCallFn>,
}

impl Hooks {
    /// Create a new hooks builder.
    #[must_use]
    pub fn builder() -> HooksBuilder {
        HooksBuilder::default()
    }

    /// Synchronous credential, if a provider is set and yields one.
    #[must_use]
    pub fn credential(&self) -> Option<Credential> {
        self.credential.as_ref().and_then(|provider| provider())
    }

    /// Asynchronous credential, if a provider is set and yields one.
    pub async fn credential_async(&self) -> Option<Credential> {
        match &self.credential_async {
            Some(provider) => provider().await,
            None => None,
        }
    }

    /// Headers added to every call before per-call headers.
    #[must_use]
    pub fn common_headers(&self) -> HeaderMap {
        self.common_headers
            .as_ref()
            .map_or_else(HeaderMap::new, |provider| provider())
    }

    /// Run the before-call interceptor.
    pub fn before_call(&self, request: &mut Request) {
        if let Some(hook) = &self.before_call {
            hook(request);
        }
    }

    /// Run the after-call interceptor; `true` means "raise the error".
    pub fn after_call(&self, response: Option<&Response>, error: Option<&Error>) -> bool {
        self.after_call
            .as_ref()
            .is_none_or(|hook| hook(response, error))
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("credential", &self.credential.is_some())
            .field("credential_async", &self.credential_async.is_some())
            .field("common_headers", &self.common_headers.is_some())
            .field("before_call", &self.before_call.is_some())
            .field("after_call", &self.after_call.is_some())
            .finish()
    }
}

/// Builder for [`Hooks`].
#[derive(Default)]
pub struct HooksBuilder {
    hooks: Hooks,
}

impl fmt::Debug for HooksBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HooksBuilder")
            .field("hooks", &self.hooks)
            .finish()
    }
}

impl HooksBuilder {
    /// Set the synchronous credential provider.
    #[must_use]
    pub fn credential<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> Option<Credential> + Send + Sync + 'static,
    {
        self.hooks.credential = Some(Arc::new(provider));
        self
    }

    /// Set the asynchronous credential provider, consulted before the
    /// synchronous one.
    #[must_use]
    pub fn credential_async<F, Fut>(mut self, provider: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<Credential>> + Send + 'static,
    {
        self.hooks.credential_async =
            Some(Arc::new(move || -> CredentialFuture { Box::pin(provider()) }));
        self
    }

    /// Set the common headers provider.
    #[must_use]
    pub fn common_headers<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> HeaderMap + Send + Sync + 'static,
    {
        self.hooks.common_headers = Some(Arc::new(provider));
        self
    }

    /// Set the before-call interceptor. It may mutate the composed request.
    #[must_use]
    pub fn before_call<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Request) + Send + Sync + 'static,
    {
        self.hooks.before_call = Some(Arc::new(hook));
        self
    }

    /// Set the after-call interceptor.
    ///
    /// It sees the response (absent on transport failure or cancellation)
    /// and the error (absent on success). Returning `false` suppresses the
    /// error.
    #[must_use]
    pub fn after_call<F>(mut self, hook: F) -> Self
    where
        F: Fn(Option<&Response>, Option<&Error>) -> bool + Send + Sync + 'static,
    {
        self.hooks.after_call = Some(Arc::new(hook));
        self
    }

    /// Build the hooks.
    #[must_use]
    pub fn build(self) -> Hooks {
        self.hooks
    }
}
