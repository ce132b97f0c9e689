//! JSON output helpers for `--json` code paths.

use anyhow::{Context, Result};
use serde::Serialize;

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("JSON serialization failed")?;
    println!("{text}");
    Ok(())
}

/// Stable machine-readable code for an error chain.
#[must_use]
pub fn error_code(err: &anyhow::Error) -> &'static str {
    use crate::domain::error::{ConfigError, LifecycleError};

    if let Some(e) = err.chain().find_map(|c| c.downcast_ref::<LifecycleError>()) {
        return match e {
            LifecycleError::Connectivity { .. } => "connectivity",
            LifecycleError::Privilege(_) => "privilege",
            LifecycleError::DependencyUnavailable(_) => "dependency_unavailable",
            LifecycleError::NotFound(_) => "not_found",
            LifecycleError::Provider(_) => "provider",
            LifecycleError::Validation(_) => "validation",
            LifecycleError::StateConflict(_) => "state_conflict",
        };
    }
    if err.chain().any(|c| c.downcast_ref::<ConfigError>().is_some()) {
        return "validation";
    }
    "error"
}
