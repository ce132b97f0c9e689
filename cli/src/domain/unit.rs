//! systemd unit generation for the agent service.
//!
//! Pure functions only: the rendered text is written by the provisioner.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// systemd unit name of the agent.
pub const SERVICE_NAME: &str = "siteio-agent";

/// Installed unit file path.
pub const UNIT_PATH: &str = "/etc/systemd/system/siteio-agent.service";

/// Container runtime unit the agent orders itself after.
pub const CONTAINER_RUNTIME_UNIT: &str = "docker.service";

/// Fixed restart backoff, in seconds.
pub const RESTART_SEC: u32 = 5;

/// Inputs for the rendered agent unit.
#[derive(Debug, Clone)]
pub struct UnitSpec {
    pub binary: PathBuf,
    pub data_dir: PathBuf,
    pub domain: String,
    pub api_key: String,
    pub email: Option<String>,
}

/// Render `siteio-agent.service`.
///
/// Returns the unit file string; it does NOT write to disk.
#[must_use]
pub fn render_unit(spec: &UnitSpec) -> String {
    let mut out = String::new();
    // `write!` into a String is infallible.
    let _ = writeln!(out, "# Generated by siteio agent install - DO NOT EDIT");
    out.push_str("[Unit]\n");
    out.push_str("Description=siteio agent\n");
    let _ = writeln!(out, "After=network-online.target {CONTAINER_RUNTIME_UNIT}");
    out.push_str("Wants=network-online.target\n");
    let _ = writeln!(out, "Requires={CONTAINER_RUNTIME_UNIT}");
    out.push('\n');
    out.push_str("[Service]\n");
    out.push_str("Type=simple\n");
    let _ = writeln!(out, "ExecStart={} agent start", systemd_path(&spec.binary));
    let _ = writeln!(out, "WorkingDirectory={}", systemd_path(&spec.data_dir));
    out.push_str("Restart=always\n");
    let _ = writeln!(out, "RestartSec={RESTART_SEC}");
    out.push('\n');
    let _ = writeln!(out, "{}", environment("DOMAIN", &spec.domain));
    let _ = writeln!(out, "{}", environment("API_KEY", &spec.api_key));
    let _ = writeln!(
        out,
        "{}",
        environment("DATA_DIR", &spec.data_dir.display().to_string())
    );
    if let Some(email) = spec.email.as_deref().filter(|e| !e.is_empty()) {
        let _ = writeln!(out, "{}", environment("EMAIL", email));
    }
    out.push('\n');
    out.push_str("[Install]\n");
    out.push_str("WantedBy=multi-user.target\n");
    out
}

/// `Environment=` line, quoted so values with spaces survive systemd parsing.
fn environment(name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("Environment=\"{name}={escaped}\"")
}

fn systemd_path(path: &Path) -> String {
    path.display().to_string().replace(' ', "\\x20")
}
