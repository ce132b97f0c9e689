//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Lifecycle errors ──────────────────────────────────────────────────────────

/// Failure kinds raised by the agent lifecycle steps.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot reach {target}: {detail}")]
    Connectivity { target: String, detail: String },

    #[error("elevation failed: {0}")]
    Privilege(String),

    #[error("{0}")]
    DependencyUnavailable(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    StateConflict(String),
}

// ── DNS provider errors ───────────────────────────────────────────────────────

/// Errors reported by the DNS provider API.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Cloudflare rejected the API token (invalid or expired token)")]
    AuthInvalid,

    #[error("Cloudflare API error: {0}")]
    Api(String),
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\n{reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
