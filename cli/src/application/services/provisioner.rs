//! Application service: local agent installation.
//!
//! Imports only from `crate::domain`, `crate::application::ports` and sibling
//! services. The intent is fully resolved before [`install_agent`] runs; no
//! step prompts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use siteio_common::{ConnectionToken, api_url_for};

use crate::application::ports::{
    ConfigStore, DnsConnector, HostExecutor, LocalFs, PrivilegeAdapter, ProgressReporter,
    PublicIpResolver,
};
use crate::application::services::config_service;
use crate::application::services::dns_reconciler::setup_wildcard_dns;
use crate::application::services::host::{Host, stderr_text};
use crate::application::services::sequencer::Sequencer;
use crate::domain::config::{ConfigKey, ConfigPatch, validate_domain};
use crate::domain::error::LifecycleError;
use crate::domain::secrets::generate_api_key;
use crate::domain::step::{SequenceReport, StepOutcome, StepPolicy};
use crate::domain::unit::{SERVICE_NAME, UNIT_PATH, UnitSpec, render_unit};

/// How long the service is given to come up before its state is checked.
pub const SETTLE_INTERVAL: Duration = Duration::from_secs(3);

const LOCATE_STEP: &str = "locate binary";

/// Everything an install needs, gathered before any side effect.
#[derive(Debug, Clone)]
pub struct InstallIntent {
    pub domain: String,
    pub email: Option<String>,
    pub cloudflare_token: Option<String>,
    pub data_dir: PathBuf,
    /// Paths tried in order when locating the `siteio` executable.
    pub binary_candidates: Vec<PathBuf>,
    /// Directory the unit file is staged in before it is installed.
    pub staging_dir: PathBuf,
    pub settle: Duration,
}

/// Result of a successful install.
#[derive(Debug)]
pub struct InstallResult {
    pub report: SequenceReport,
    pub binary: PathBuf,
    pub api_url: String,
    pub api_key: String,
    pub token: String,
}

/// Install steps that run once the binary is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStep {
    CheckRuntime,
    CreateDataDir,
    PersistConfig,
    ConfigureDns,
    InstallUnit,
    EnableService,
    StartService,
}

impl InstallStep {
    pub const ORDER: [Self; 7] = [
        Self::CheckRuntime,
        Self::CreateDataDir,
        Self::PersistConfig,
        Self::ConfigureDns,
        Self::InstallUnit,
        Self::EnableService,
        Self::StartService,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::CheckRuntime => "container runtime check",
            Self::CreateDataDir => "create data directory",
            Self::PersistConfig => "save configuration",
            Self::ConfigureDns => "dns setup",
            Self::InstallUnit => "install unit file",
            Self::EnableService => "enable service",
            Self::StartService => "start service",
        }
    }

    /// DNS can be fixed after the fact; everything else is required.
    #[must_use]
    pub fn policy(self) -> StepPolicy {
        match self {
            Self::ConfigureDns => StepPolicy::BestEffort,
            _ => StepPolicy::Fatal,
        }
    }
}

/// Ports the install sequence writes through, besides the target host.
pub struct InstallPorts<'a, S, F, C, I> {
    pub store: &'a S,
    pub fs: &'a F,
    pub dns: &'a C,
    pub ip: &'a I,
}

/// Values fixed before the step loop starts.
struct Resolved<'a> {
    intent: &'a InstallIntent,
    binary: PathBuf,
    api_key: String,
}

/// Install, enable and start the agent on the local host.
///
/// # Errors
///
/// Returns the first fatal step's error, naming the step. DNS failures are
/// recorded as warnings and do not abort the install.
pub async fn install_agent<E, P, S, F, C, I>(
    host: Host<'_, E, P>,
    ports: &InstallPorts<'_, S, F, C, I>,
    reporter: &impl ProgressReporter,
    intent: &InstallIntent,
) -> Result<InstallResult>
where
    E: HostExecutor,
    P: PrivilegeAdapter,
    S: ConfigStore,
    F: LocalFs,
    C: DnsConnector,
    I: PublicIpResolver,
{
    validate_domain(&intent.domain)?;

    let mut seq = Sequencer::new(reporter);
    reporter.step("locating siteio binary...");
    let binary = match locate_binary(ports.fs, &intent.binary_candidates) {
        Ok(path) => path,
        Err(e) => return Err(seq.fail(LOCATE_STEP, e)),
    };
    seq.record(
        LOCATE_STEP,
        StepOutcome::Done(format!("Using {}", binary.display())),
    )?;

    let existing = ports.store.load(&intent.data_dir).api_key;
    let api_key = match existing {
        Some(key) if !key.trim().is_empty() => {
            tracing::debug!("reusing api key on record");
            key
        }
        _ => generate_api_key(),
    };
    let resolved = Resolved {
        intent,
        binary,
        api_key,
    };

    for step in InstallStep::ORDER {
        reporter.step(&format!("{}...", step.name()));
        let result = run_step(step, host, ports, &resolved).await;
        seq.settle(step.name(), step.policy(), result)?;
    }

    let api_url = api_url_for(&intent.domain);
    let token = ConnectionToken::new(api_url.clone(), resolved.api_key.clone()).encode();
    Ok(InstallResult {
        report: seq.finish(),
        binary: resolved.binary,
        api_url,
        api_key: resolved.api_key,
        token,
    })
}

/// First existing candidate, with symlinks resolved.
///
/// # Errors
///
/// Returns [`LifecycleError::NotFound`] when no candidate exists.
pub fn locate_binary(fs: &impl LocalFs, candidates: &[PathBuf]) -> Result<PathBuf> {
    let Some(found) = candidates.iter().find(|p| fs.exists(p)) else {
        let tried = candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(LifecycleError::NotFound(format!(
            "siteio executable not found (tried: {tried})"
        ))
        .into());
    };
    fs.canonicalize(found)
        .with_context(|| format!("resolving {}", found.display()))
}

async fn run_step<E, P, S, F, C, I>(
    step: InstallStep,
    host: Host<'_, E, P>,
    ports: &InstallPorts<'_, S, F, C, I>,
    resolved: &Resolved<'_>,
) -> Result<StepOutcome>
where
    E: HostExecutor,
    P: PrivilegeAdapter,
    S: ConfigStore,
    F: LocalFs,
    C: DnsConnector,
    I: PublicIpResolver,
{
    let intent = resolved.intent;
    match step {
        InstallStep::CheckRuntime => check_runtime(host).await,
        InstallStep::CreateDataDir => create_data_dir(host, &intent.data_dir).await,
        InstallStep::PersistConfig => {
            let mut patch = ConfigPatch::new()
                .set(ConfigKey::ApiKey, resolved.api_key.as_str())
                .set(ConfigKey::Domain, intent.domain.as_str());
            if let Some(token) = &intent.cloudflare_token {
                patch = patch.set(ConfigKey::CloudflareToken, token.as_str());
            }
            config_service::update(ports.store, &intent.data_dir, &patch)?;
            Ok(StepOutcome::Done(format!(
                "Saved configuration to {}",
                intent.data_dir.display()
            )))
        }
        InstallStep::ConfigureDns => {
            let Some(token) = &intent.cloudflare_token else {
                return Ok(StepOutcome::Skipped(
                    "No Cloudflare token given; configure *.<domain> DNS yourself".to_string(),
                ));
            };
            let api = ports.dns.connect(token)?;
            let outcome = setup_wildcard_dns(&api, ports.ip, &intent.domain).await?;
            Ok(if outcome.skipped {
                StepOutcome::Skipped(outcome.message)
            } else {
                StepOutcome::Done(outcome.message)
            })
        }
        InstallStep::InstallUnit => {
            let unit = render_unit(&UnitSpec {
                binary: resolved.binary.clone(),
                data_dir: intent.data_dir.clone(),
                domain: intent.domain.clone(),
                api_key: resolved.api_key.clone(),
                email: intent.email.clone(),
            });
            install_unit(host, ports.fs, &intent.staging_dir, &unit).await
        }
        InstallStep::EnableService => {
            host.run_privileged_checked(&["systemctl", "daemon-reload"])
                .await?;
            host.run_privileged_checked(&["systemctl", "enable", SERVICE_NAME])
                .await?;
            Ok(StepOutcome::Done(format!("Enabled {SERVICE_NAME}")))
        }
        InstallStep::StartService => start_and_verify(host, intent.settle).await,
    }
}

async fn check_runtime<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
) -> Result<StepOutcome> {
    let unavailable = |detail: String| -> anyhow::Error {
        LifecycleError::DependencyUnavailable(format!(
            "Docker is not available ({detail}). Is Docker installed and running?"
        ))
        .into()
    };
    let output = host
        .run_privileged(&["docker", "info"])
        .await
        .map_err(|e| unavailable(format!("{e:#}")))?;
    if !output.status.success() {
        return Err(unavailable(stderr_text(&output)));
    }
    Ok(StepOutcome::Done("Docker is running".to_string()))
}

async fn create_data_dir<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    data_dir: &Path,
) -> Result<StepOutcome> {
    let dir = data_dir.to_string_lossy();
    host.run_privileged_checked(&["mkdir", "-p", &dir]).await?;
    if !host.privilege.is_privileged()
        && let Some(user) = host.privilege.user()
    {
        host.run_privileged_checked(&["chown", user, &dir]).await?;
    }
    Ok(StepOutcome::Done(format!("Data directory {dir} ready")))
}

async fn install_unit<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    fs: &impl LocalFs,
    staging_dir: &Path,
    unit: &str,
) -> Result<StepOutcome> {
    let staged = staging_dir.join(format!("{SERVICE_NAME}.service"));
    fs.write(&staged, unit)
        .with_context(|| format!("staging unit file at {}", staged.display()))?;
    let staged = staged.to_string_lossy();
    host.run_privileged_checked(&["install", "-m", "600", &staged, UNIT_PATH])
        .await?;
    Ok(StepOutcome::Done(format!("Installed {UNIT_PATH}")))
}

async fn start_and_verify<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    settle: Duration,
) -> Result<StepOutcome> {
    host.run_privileged_checked(&["systemctl", "start", SERVICE_NAME])
        .await?;
    tokio::time::sleep(settle).await;
    let state = host.unit_state().await?;
    if state != "active" {
        anyhow::bail!(
            "{SERVICE_NAME} is {state} after start. Inspect the logs with: journalctl -u {SERVICE_NAME} -n 50"
        );
    }
    Ok(StepOutcome::Done(format!("{SERVICE_NAME} is running")))
}
