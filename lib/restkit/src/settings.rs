//! Service settings: where a client talks to and how it authenticates.

use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;
use url::Url;

use crate::{Authentication, Error, Result};

/// Construction-time settings of a REST service client.
///
/// The base address always ends with `/`, so relative operations resolve
/// beneath it: with `https://api.example.com/v2`, the operation `users/1`
/// targets `https://api.example.com/v2/users/1`.
///
/// # Example
///
/// ```
/// use restkit::RestServiceSettings;
///
/// let settings = RestServiceSettings::builder("https://api.example.com/v2")
///     .name("billing")
///     .basic_auth("me", "secret")
///     .default_header("X-Tenant", "acme")
///     .build()
///     .expect("valid settings");
///
/// assert_eq!(settings.base_url().as_str(), "https://api.example.com/v2/");
/// assert_eq!(settings.name(), Some("billing"));
/// ```
#[derive(Debug, Clone)]
pub struct RestServiceSettings {
    base_url: Url,
    name: Option<String>,
    authentication: Authentication,
    default_headers: HeaderMap,
}

impl RestServiceSettings {
    /// Settings with only a base address.
    ///
    /// # Errors
    ///
    /// See [`RestServiceSettingsBuilder::build`].
    pub fn new(base_address: impl Into<String>) -> Result<Self> {
        Self::builder(base_address).build()
    }

    /// Create a new settings builder.
    #[must_use]
    pub fn builder(base_address: impl Into<String>) -> RestServiceSettingsBuilder {
        RestServiceSettingsBuilder {
            base_address: base_address.into(),
            ..RestServiceSettingsBuilder::default()
        }
    }

    /// Normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Discriminator of the named transport, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Authentication mode.
    #[must_use]
    pub const fn authentication(&self) -> &Authentication {
        &self.authentication
    }

    /// Headers every transport created from these settings sends by default.
    #[must_use]
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }
}

/// Builder for [`RestServiceSettings`].
#[derive(Debug, Clone, Default)]
pub struct RestServiceSettingsBuilder {
    base_address: String,
    name: Option<String>,
    authentication: Authentication,
    default_headers: Vec<(String, String)>,
}

impl RestServiceSettingsBuilder {
    /// Set the named-transport discriminator.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the authentication mode.
    #[must_use]
    pub fn authentication(mut self, authentication: Authentication) -> Self {
        self.authentication = authentication;
        self
    }

    /// Use basic authentication.
    #[must_use]
    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.authentication(Authentication::basic(username, password))
    }

    /// Ask the client's credential providers for every call.
    #[must_use]
    pub fn external_auth(self) -> Self {
        self.authentication(Authentication::External)
    }

    /// Add a default header. A repeated name adds another value.
    #[must_use]
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Build the settings.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] when the base address is empty or cannot be
    ///   a base for relative URLs
    /// - [`Error::InvalidUrl`] when it does not parse
    /// - [`Error::InvalidHeader`] for an invalid default header
    pub fn build(self) -> Result<RestServiceSettings> {
        let base_address = self.base_address.trim();
        if base_address.is_empty() {
            return Err(Error::configuration("base address is required"));
        }

        let mut base_url = Url::parse(base_address)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::configuration(format!(
                "`{base_address}` cannot be used as a base address"
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut default_headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|e| Error::invalid_header(format!("{name}: {e}")))?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::invalid_header(format!("{name}: {e}")))?;
            default_headers.append(header_name, header_value);
        }

        Ok(RestServiceSettings {
            base_url,
            name: self.name,
            authentication: self.authentication,
            default_headers,
        })
    }
}
