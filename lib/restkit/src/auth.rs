//! Authorization header resolution.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderValue;
use tracing::warn;

use crate::{Authentication, Credential, Hooks, Result};

/// Resolve the `Authorization` header value for one call.
///
/// - [`Authentication::None`]: no header
/// - [`Authentication::Basic`]: `Basic base64(username:password)`, computed
///   per call; characters outside ASCII are sent as `?`
/// - [`Authentication::External`]: the async credential provider, then the
///   sync one; no header (and a warning) when neither yields a valid
///   [`Credential`]
///
/// # Errors
///
/// Returns [`Error::InvalidHeader`](crate::Error::InvalidHeader) when the
/// credential cannot be rendered as a header value.
pub async fn authorization(
    authentication: &Authentication,
    hooks: &Hooks,
) -> Result<Option<HeaderValue>> {
    match authentication {
        Authentication::None => Ok(None),
        Authentication::Basic { username, password } => {
            basic(username, password).header_value().map(Some)
        }
        Authentication::External => {
            let credential = hooks
                .credential_async()
                .await
                .filter(Credential::is_valid)
                .or_else(|| hooks.credential().filter(Credential::is_valid));
            if let Some(credential) = credential {
                credential.header_value().map(Some)
            } else {
                warn!("external authentication is configured but no credential was provided");
                Ok(None)
            }
        }
    }
}

fn basic(username: &str, password: &str) -> Credential {
    let raw: String = format!("{username}:{password}")
        .chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect();
    Credential::new("Basic", STANDARD.encode(raw))
}
