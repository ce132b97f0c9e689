//! Application services: use-case orchestration.
//!
//! Each service module implements a single use-case by composing domain logic
//! with port trait calls. Services import only from `crate::domain` and
//! `crate::application::ports`, never from `crate::infra`, `crate::commands`,
//! or `crate::output`.

pub mod config_service;
pub mod containers;
pub mod dns_reconciler;
pub mod host;
pub mod oauth_service;
pub mod provisioner;
pub mod remote;
pub mod sequencer;
pub mod status;
pub mod teardown;
