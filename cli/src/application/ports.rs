//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::Result;
use siteio_common::{AgentConfig, OAuthConfig};

use crate::domain::dns::{DnsRecord, DnsZone, NewDnsRecord};

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: std::time::Duration,
    ) -> Result<Output>;
    /// Run a program with inherited stdio and return only its exit status.
    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus>;
}

// ── Host Execution Port ───────────────────────────────────────────────────────

/// Runs commands on the lifecycle target: the local host or an SSH peer.
///
/// Lifecycle steps are written once against this capability; the local and
/// remote implementations decide how an argument vector reaches a process.
#[allow(async_fn_in_trait)]
pub trait HostExecutor {
    /// `true` when commands cross an SSH transport.
    fn is_remote(&self) -> bool;
    /// Human-readable target name for messages.
    fn describe(&self) -> String;
    /// Run non-interactively and capture exit code, stdout and stderr.
    ///
    /// Must never block on a prompt.
    async fn run_captured(&self, argv: &[&str]) -> Result<Output>;
    /// Run attached to the caller's terminal; only the exit status comes back.
    async fn run_streamed(&self, argv: &[&str]) -> Result<ExitStatus>;
}

// ── Privilege Port ────────────────────────────────────────────────────────────

/// Decides whether privileged commands need an elevation prefix.
pub trait PrivilegeAdapter {
    /// `true` when the current user can act as root without elevation.
    fn is_privileged(&self) -> bool;
    /// Prefix `argv` with the elevation command unless already privileged.
    fn wrap<'a>(&self, argv: &[&'a str]) -> Vec<&'a str>;
    /// Login name of the invoking user, when known.
    fn user(&self) -> Option<&str>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait: no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a neutral message (skipped steps, hints).
    fn info(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Config Port ───────────────────────────────────────────────────────────────

/// Persisted configuration documents under the agent data directory.
pub trait ConfigStore {
    /// Load the agent config. Missing or unreadable files yield an empty document.
    fn load(&self, data_dir: &Path) -> AgentConfig;
    /// Replace the agent config file, creating `data_dir` if needed.
    fn save(&self, data_dir: &Path, config: &AgentConfig) -> Result<()>;
    /// Load the OAuth config, if one has been written and parses.
    fn load_oauth(&self, data_dir: &Path) -> Option<OAuthConfig>;
    /// Replace the OAuth config file.
    fn save_oauth(&self, data_dir: &Path, config: &OAuthConfig) -> Result<()>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// Local filesystem access used by the install sequence.
pub trait LocalFs {
    fn exists(&self, path: &Path) -> bool;
    /// Resolve symlinks and relative components.
    fn canonicalize(&self, path: &Path) -> Result<PathBuf>;
    fn write(&self, path: &Path, content: &str) -> Result<()>;
}

// ── DNS Ports ─────────────────────────────────────────────────────────────────

/// DNS provider operations needed for wildcard reconciliation.
#[allow(async_fn_in_trait)]
pub trait DnsApi {
    /// All zones visible to the credential.
    async fn list_zones(&self) -> Result<Vec<DnsZone>>;
    /// Records in `zone_id` with exactly this name and type.
    async fn find_records(
        &self,
        zone_id: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Vec<DnsRecord>>;
    async fn create_record(&self, zone_id: &str, record: &NewDnsRecord) -> Result<DnsRecord>;
    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<()>;
}

/// Builds a [`DnsApi`] client for a provider token found at runtime.
pub trait DnsConnector {
    type Api: DnsApi;
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    fn connect(&self, token: &str) -> Result<Self::Api>;
}

/// Discovers the host's public IPv4 address.
#[allow(async_fn_in_trait)]
pub trait PublicIpResolver {
    async fn public_ipv4(&self) -> Result<String>;
}
