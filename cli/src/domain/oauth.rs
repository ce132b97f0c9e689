//! OAuth gateway configuration validation.
//!
//! Pure functions only: no I/O.

use siteio_common::OAuthConfig;
use url::Url;

use crate::domain::error::LifecycleError;

/// OAuth settings gathered from the operator, before validation.
#[derive(Debug, Clone, Default)]
pub struct OAuthInput {
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Validate an OIDC issuer and normalize it to end with `/`.
///
/// # Errors
///
/// Returns [`LifecycleError::Validation`] unless the issuer is an absolute
/// `https://` URL with a host.
pub fn normalize_issuer_url(raw: &str) -> Result<String, LifecycleError> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .map_err(|e| LifecycleError::Validation(format!("Invalid issuer URL '{raw}': {e}")))?;
    if url.scheme() != "https" {
        return Err(LifecycleError::Validation(format!(
            "Issuer URL must use https:// (got '{raw}')"
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(LifecycleError::Validation(format!(
            "Issuer URL has no host: '{raw}'"
        )));
    }
    let mut normalized = url.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

/// Build the OAuth document from operator input.
///
/// # Errors
///
/// Returns [`LifecycleError::Validation`] for a bad issuer or empty client
/// credentials.
pub fn build_oauth_config(
    input: &OAuthInput,
    cookie_domain: &str,
    cookie_secret: String,
) -> Result<OAuthConfig, LifecycleError> {
    let issuer_url = normalize_issuer_url(&input.issuer_url)?;
    let client_id = required("Client ID", &input.client_id)?;
    let client_secret = required("Client secret", &input.client_secret)?;
    Ok(OAuthConfig {
        issuer_url,
        client_id,
        client_secret,
        cookie_secret,
        cookie_domain: cookie_domain.to_string(),
    })
}

fn required(label: &str, value: &str) -> Result<String, LifecycleError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LifecycleError::Validation(format!("{label} must not be empty")));
    }
    Ok(value.to_string())
}
