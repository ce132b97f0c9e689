//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, SSH
//! transport, config files, and the DNS and IP-echo HTTP clients.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod cloudflare;
pub mod command_runner;
pub mod config;
pub mod executor;
pub mod fs;
pub mod privilege;
pub mod public_ip;
