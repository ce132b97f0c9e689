//! Domain types and validators for the agent configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use siteio_common::AgentConfig;

use crate::domain::error::ConfigError;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &["apiKey", "domain", "cloudflareToken"];

/// Fixed mask rendered in place of sensitive values.
pub const MASK: &str = "****";

static DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // Pattern is a compile-time constant
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
        .expect("valid domain regex")
});

// ── Config keys ──────────────────────────────────────────────────────────────

/// Whitelisted agent configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    ApiKey,
    Domain,
    CloudflareToken,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [Self::ApiKey, Self::Domain, Self::CloudflareToken];

    /// Parses a user-supplied key against the whitelist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownKey`] if the key is not recognised.
    pub fn parse(key: &str) -> Result<Self> {
        match key {
            "apiKey" => Ok(Self::ApiKey),
            "domain" => Ok(Self::Domain),
            "cloudflareToken" => Ok(Self::CloudflareToken),
            _ => Err(ConfigError::UnknownKey {
                key: key.to_string(),
                valid: VALID_CONFIG_KEYS.join(", "),
            }
            .into()),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "apiKey",
            Self::Domain => "domain",
            Self::CloudflareToken => "cloudflareToken",
        }
    }

    /// Keys that may never be removed once set.
    #[must_use]
    pub fn is_required(self) -> bool {
        matches!(self, Self::ApiKey)
    }

    #[must_use]
    pub fn is_sensitive(self) -> bool {
        matches!(self, Self::ApiKey | Self::CloudflareToken)
    }

    /// Read the field this key names.
    #[must_use]
    pub fn get(self, config: &AgentConfig) -> Option<&str> {
        match self {
            Self::ApiKey => config.api_key.as_deref(),
            Self::Domain => config.domain.as_deref(),
            Self::CloudflareToken => config.cloudflare_token.as_deref(),
        }
    }

    fn slot(self, config: &mut AgentConfig) -> &mut Option<String> {
        match self {
            Self::ApiKey => &mut config.api_key,
            Self::Domain => &mut config.domain,
            Self::CloudflareToken => &mut config.cloudflare_token,
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Patches ──────────────────────────────────────────────────────────────────

/// A shallow partial update of [`AgentConfig`].
///
/// `Some(value)` sets a field; `None` is the absent sentinel and removes it.
/// Keys not present in the patch are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch(BTreeMap<ConfigKey, Option<String>>);

impl ConfigPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn set(mut self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.0.insert(key, Some(value.into()));
        self
    }

    #[must_use]
    pub fn unset(mut self, key: ConfigKey) -> Self {
        self.0.insert(key, None);
        self
    }

    /// Returns `true` if the patch removes `key`.
    #[must_use]
    pub fn unsets(&self, key: ConfigKey) -> bool {
        matches!(self.0.get(&key), Some(None))
    }

    /// Merge this patch into `config`.
    pub fn apply_to(&self, config: &mut AgentConfig) {
        for (key, value) in &self.0 {
            *key.slot(config) = value.clone();
        }
    }
}

// ── Masking ──────────────────────────────────────────────────────────────────

/// Returns `true` for keys whose values must be masked when displayed.
#[must_use]
pub fn is_sensitive_key(key: &str) -> bool {
    ConfigKey::parse(key).is_ok_and(ConfigKey::is_sensitive)
}

/// Mask a secret for display.
///
/// Values of 8 characters or fewer render as the bare mask; longer values
/// keep their last 4 characters.
#[must_use]
pub fn mask_value(value: &str) -> String {
    let count = value.chars().count();
    if count <= 8 {
        return MASK.to_string();
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("{MASK}{tail}")
}

/// Render a config value for display, masking sensitive keys.
#[must_use]
pub fn display_value(key: ConfigKey, value: &str) -> String {
    if key.is_sensitive() {
        mask_value(value)
    } else {
        value.to_string()
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a fully-qualified domain name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if `domain` is not a lowercase FQDN.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.len() > 253 || !DOMAIN_RE.is_match(domain) {
        return Err(ConfigError::InvalidValue {
            key: "domain".to_string(),
            value: domain.to_string(),
            reason: "Expected a lowercase fully-qualified domain, e.g. apps.example.com".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Validates a value for the given key.
///
/// # Errors
///
/// Returns an error if the value is empty or not valid for the key.
pub fn validate_config_value(key: ConfigKey, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "Value must not be empty".to_string(),
        }
        .into());
    }
    if key == ConfigKey::Domain {
        validate_domain(value)?;
    }
    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
