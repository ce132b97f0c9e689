//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod dns;
pub mod error;
pub mod oauth;
pub mod secrets;
pub mod step;
pub mod target;
pub mod unit;

pub use config::{ConfigKey, ConfigPatch, is_sensitive_key, mask_value};
pub use error::{ConfigError, LifecycleError, ProviderError};
pub use step::{SequenceReport, StepOutcome, StepPolicy, StepRecord, StepStatus};
pub use target::Target;
