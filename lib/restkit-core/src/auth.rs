//! Authentication configuration.

use std::fmt;

use http::HeaderValue;

use crate::{Error, Result};

/// How a client authenticates its calls.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Authentication {
    /// No `Authorization` header is added.
    #[default]
    None,
    /// `Authorization: Basic base64(username:password)` on every call.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// The client's credential providers supply a [`Credential`] per call.
    External,
}

impl Authentication {
    /// Basic authentication with the given credentials.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::External => f.write_str("External"),
        }
    }
}

/// A `(scheme, value)` pair rendered as `Authorization: <scheme> <value>`.
///
/// # Example
///
/// ```
/// use restkit_core::Credential;
///
/// let credential = Credential::bearer("abc123");
/// assert!(credential.is_valid());
/// assert_eq!(credential.header_value().expect("valid").to_str().ok(), Some("Bearer abc123"));
/// assert!(!Credential::new("Bearer", "").is_valid());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    scheme: String,
    value: String,
}

impl Credential {
    /// Credential with an arbitrary scheme.
    #[must_use]
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// `Bearer` credential.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::new("Bearer", token)
    }

    /// Authentication scheme, e.g. `Bearer`.
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Credential value, e.g. the token.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Both scheme and value are non-blank.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.scheme.trim().is_empty() && !self.value.trim().is_empty()
    }

    /// The `Authorization` header value, marked sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the rendered value contains
    /// characters not allowed in a header.
    pub fn header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::try_from(format!("{} {}", self.scheme, self.value))
            .map_err(|e| Error::invalid_header(format!("authorization: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("scheme", &self.scheme)
            .field("value", &"<redacted>")
            .finish()
    }
}
