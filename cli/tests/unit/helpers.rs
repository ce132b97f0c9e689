//! Shared test doubles: scripted host, fake DNS provider, fake filesystem
//! and a reporter that records every event.

#![allow(dead_code, clippy::expect_used)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::rc::Rc;

use anyhow::Result;
use siteio_cli::application::ports::{
    DnsApi, DnsConnector, HostExecutor, LocalFs, ProgressReporter, PublicIpResolver,
};
use siteio_cli::domain::dns::{DnsRecord, DnsZone, NewDnsRecord};

// ── Output constructors ──────────────────────────────────────────────────────

/// Build an `ExitStatus` from a logical exit code.
///
/// The raw wait status keeps the exit code in bits 8–15.
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── Scripted host ────────────────────────────────────────────────────────────

/// A [`HostExecutor`] answering from prefix rules and recording every call.
///
/// Commands are matched on their space-joined argv; the first rule whose
/// prefix matches wins. Unmatched commands succeed with empty output.
pub struct ScriptedHost {
    rules: Vec<(String, Result<Output, String>)>,
    streamed_code: i32,
    remote: bool,
    calls: RefCell<Vec<String>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            streamed_code: 0,
            remote: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    /// A remote host named `deploy@example.net`.
    pub fn remote() -> Self {
        Self {
            remote: true,
            ..Self::new()
        }
    }

    /// A host where the agent unit is installed and running.
    pub fn installed() -> Self {
        Self::new().on("systemctl is-active", ok_output(b"active\n"))
    }

    /// A host where the unit file does not exist.
    pub fn not_installed() -> Self {
        Self::new().on("test -f", err_output(1, b""))
    }

    #[must_use]
    pub fn on(mut self, prefix: &str, output: Output) -> Self {
        self.rules.push((prefix.to_string(), Ok(output)));
        self
    }

    /// Make commands with this prefix fail to spawn.
    #[must_use]
    pub fn fail_spawn(mut self, prefix: &str, message: &str) -> Self {
        self.rules.push((prefix.to_string(), Err(message.to_string())));
        self
    }

    #[must_use]
    pub fn streamed_exit(mut self, code: i32) -> Self {
        self.streamed_code = code;
        self
    }

    /// Every command run so far, space-joined.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// `true` if some command started with `prefix`.
    pub fn ran(&self, prefix: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }

    /// Position of the first command starting with `prefix`.
    pub fn position(&self, prefix: &str) -> Option<usize> {
        self.calls.borrow().iter().position(|c| c.starts_with(prefix))
    }

    fn answer(&self, line: &str) -> Result<Output> {
        let rule = self.rules.iter().find(|(prefix, _)| line.starts_with(prefix.as_str()));
        match rule {
            Some((_, Ok(output))) => Ok(output.clone()),
            Some((_, Err(message))) => anyhow::bail!("{message}"),
            None => Ok(ok_output(b"")),
        }
    }
}

impl HostExecutor for ScriptedHost {
    fn is_remote(&self) -> bool {
        self.remote
    }

    fn describe(&self) -> String {
        if self.remote {
            "deploy@example.net".to_string()
        } else {
            "localhost".to_string()
        }
    }

    async fn run_captured(&self, argv: &[&str]) -> Result<Output> {
        let line = argv.join(" ");
        self.calls.borrow_mut().push(line.clone());
        self.answer(&line)
    }

    async fn run_streamed(&self, argv: &[&str]) -> Result<ExitStatus> {
        let line = argv.join(" ");
        self.calls.borrow_mut().push(line.clone());
        self.answer(&line)?;
        Ok(exit_status(self.streamed_code))
    }
}

// ── Fake DNS provider ────────────────────────────────────────────────────────

#[derive(Default)]
pub struct DnsState {
    pub zones: Vec<DnsZone>,
    /// `(zone_id, record)` pairs currently present.
    pub records: Vec<(String, DnsRecord)>,
    pub created: Vec<(String, NewDnsRecord)>,
    pub deleted: Vec<String>,
    pub tokens: Vec<String>,
    pub reject_token: bool,
    next_id: u32,
}

/// In-memory DNS provider that acts as both connector and API.
#[derive(Clone, Default)]
pub struct FakeDns {
    pub state: Rc<RefCell<DnsState>>,
}

impl FakeDns {
    pub fn with_zones(names: &[&str]) -> Self {
        let dns = Self::default();
        dns.state.borrow_mut().zones = names
            .iter()
            .enumerate()
            .map(|(i, name)| DnsZone {
                id: format!("zone-{i}"),
                name: (*name).to_string(),
            })
            .collect();
        dns
    }

    /// Pre-existing A record in the zone called `zone_name`.
    #[must_use]
    pub fn with_record(self, zone_name: &str, name: &str, content: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            let zone_id = state
                .zones
                .iter()
                .find(|z| z.name == zone_name)
                .map(|z| z.id.clone())
                .expect("zone registered");
            state.next_id += 1;
            let id = format!("rec-{}", state.next_id);
            state.records.push((
                zone_id,
                DnsRecord {
                    id,
                    name: name.to_string(),
                    content: content.to_string(),
                },
            ));
        }
        self
    }

    #[must_use]
    pub fn rejecting_tokens(self) -> Self {
        self.state.borrow_mut().reject_token = true;
        self
    }

    pub fn created(&self) -> Vec<(String, NewDnsRecord)> {
        self.state.borrow().created.clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.borrow().deleted.clone()
    }

    pub fn record_count(&self) -> usize {
        self.state.borrow().records.len()
    }
}

impl DnsApi for FakeDns {
    async fn list_zones(&self) -> Result<Vec<DnsZone>> {
        if self.state.borrow().reject_token {
            anyhow::bail!("Cloudflare rejected the API token (invalid or expired token)");
        }
        Ok(self.state.borrow().zones.clone())
    }

    async fn find_records(
        &self,
        zone_id: &str,
        name: &str,
        _record_type: &str,
    ) -> Result<Vec<DnsRecord>> {
        Ok(self
            .state
            .borrow()
            .records
            .iter()
            .filter(|(z, r)| z == zone_id && r.name == name)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_record(&self, zone_id: &str, record: &NewDnsRecord) -> Result<DnsRecord> {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let created = DnsRecord {
            id: format!("rec-{}", state.next_id),
            name: record.name.clone(),
            content: record.content.clone(),
        };
        state.records.push((zone_id.to_string(), created.clone()));
        state.created.push((zone_id.to_string(), record.clone()));
        Ok(created)
    }

    async fn delete_record(&self, _zone_id: &str, record_id: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.records.retain(|(_, r)| r.id != record_id);
        state.deleted.push(record_id.to_string());
        Ok(())
    }
}

impl DnsConnector for FakeDns {
    type Api = FakeDns;

    fn connect(&self, token: &str) -> Result<Self::Api> {
        self.state.borrow_mut().tokens.push(token.to_string());
        Ok(self.clone())
    }
}

/// Public IP resolver with a fixed answer.
pub struct FixedIp(pub &'static str);

impl PublicIpResolver for FixedIp {
    async fn public_ipv4(&self) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// Public IP resolver that is always offline.
pub struct OfflineIp;

impl PublicIpResolver for OfflineIp {
    async fn public_ipv4(&self) -> Result<String> {
        anyhow::bail!("ipify unreachable")
    }
}

// ── Fake filesystem ──────────────────────────────────────────────────────────

/// Filesystem where only `existing` paths exist; writes go to the real disk
/// so staged files can be inspected.
pub struct FakeFs {
    pub existing: Vec<PathBuf>,
}

impl FakeFs {
    pub fn with(paths: &[&str]) -> Self {
        Self {
            existing: paths.iter().map(PathBuf::from).collect(),
        }
    }
}

impl LocalFs for FakeFs {
    fn exists(&self, path: &Path) -> bool {
        self.existing.iter().any(|p| p == path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        Ok(path.to_path_buf())
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ── Recording reporter ───────────────────────────────────────────────────────

/// A [`ProgressReporter`] that keeps every event as `kind: message`.
#[derive(Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<String>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| e.strip_prefix("warn: ").map(str::to_string))
            .collect()
    }

    fn push(&self, kind: &str, message: &str) {
        self.events.borrow_mut().push(format!("{kind}: {message}"));
    }
}

impl ProgressReporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.push("step", message);
    }
    fn success(&self, message: &str) {
        self.push("success", message);
    }
    fn info(&self, message: &str) {
        self.push("info", message);
    }
    fn warn(&self, message: &str) {
        self.push("warn", message);
    }
}
