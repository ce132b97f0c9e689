//! Connection token codec.
//!
//! A connection token packs the agent's public API URL and API key into one
//! opaque string that clients paste into `siteio login`. The encoding is
//! URL-safe base64 (no padding) over a compact JSON object.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned when decoding a connection token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("connection token is not valid base64")]
    Encoding(#[from] base64::DecodeError),

    #[error("connection token payload is malformed: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("connection token is missing {0}")]
    Missing(&'static str),
}

/// Decoded connection token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionToken {
    pub api_url: String,
    pub api_key: String,
}

#[derive(Serialize)]
struct WireRef<'a> {
    url: &'a str,
    key: &'a str,
}

#[derive(Deserialize)]
struct Wire {
    url: String,
    key: String,
}

impl ConnectionToken {
    #[must_use]
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Encode into the opaque token string.
    #[must_use]
    pub fn encode(&self) -> String {
        let wire = WireRef {
            url: &self.api_url,
            key: &self.api_key,
        };
        // Serializing two strings into a JSON object cannot fail.
        let json = serde_json::to_vec(&wire).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token produced by [`ConnectionToken::encode`].
    pub fn decode(token: &str) -> Result<Self, TokenError> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
        let wire: Wire = serde_json::from_slice(&bytes)?;
        if wire.url.is_empty() {
            return Err(TokenError::Missing("api url"));
        }
        if wire.key.is_empty() {
            return Err(TokenError::Missing("api key"));
        }
        Ok(Self {
            api_url: wire.url,
            api_key: wire.key,
        })
    }
}
