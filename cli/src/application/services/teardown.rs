//! Application service: local agent teardown.
//!
//! Split in two so prompts can sit between them: [`inspect`] only reads state
//! and [`execute`] runs the ordered steps without asking anything.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use crate::application::ports::{
    ConfigStore, DnsConnector, HostExecutor, PrivilegeAdapter, ProgressReporter,
};
use crate::application::services::containers::{
    ContainerInfo, list_platform_containers, remove_containers,
};
use crate::application::services::dns_reconciler::remove_wildcard_dns;
use crate::application::services::host::Host;
use crate::application::services::sequencer::Sequencer;
use crate::domain::dns::wildcard_name;
use crate::domain::step::{SequenceReport, StepOutcome, StepPolicy};
use crate::domain::unit::{SERVICE_NAME, UNIT_PATH};

/// What the DNS cleanup step can do with the config on record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DnsCleanup {
    /// Domain and provider token are both on record.
    Configured { domain: String, token: String },
    /// A domain is on record but the token needed to clean it up is not.
    TokenMissing { domain: String },
    NotConfigured,
}

/// State gathered before any confirmation is asked.
#[derive(Debug, Clone)]
pub struct TeardownPlan {
    pub data_dir: PathBuf,
    pub containers: Vec<ContainerInfo>,
    /// Why containers could not be listed, if they could not.
    pub container_error: Option<String>,
    pub dns: DnsCleanup,
}

/// Operator decisions, resolved before [`execute`] runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownIntent {
    pub remove_containers: bool,
    pub remove_data: bool,
}

/// Command-line switches that decide teardown questions up front.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownFlags {
    /// `--yes`: take every default without asking.
    pub yes: bool,
    pub remove_data: bool,
    pub remove_containers: bool,
}

/// Turn flags and answers into a [`TeardownIntent`].
///
/// `confirm` is only called for questions the flags leave open; it receives
/// the prompt and its default. Containers default to removal, the data
/// directory defaults to being kept, and `yes` takes both defaults.
///
/// # Errors
///
/// Returns whatever error `confirm` returns.
pub fn resolve_intent(
    flags: TeardownFlags,
    plan: &TeardownPlan,
    mut confirm: impl FnMut(&str, bool) -> Result<bool>,
) -> Result<TeardownIntent> {
    let remove_containers = flags.remove_containers
        || flags.yes
        || plan.containers.is_empty()
        || confirm(
            &format!("Remove {} siteio container(s)?", plan.containers.len()),
            true,
        )?;
    let remove_data = flags.remove_data
        || (!flags.yes
            && confirm(
                &format!(
                    "Delete the data directory {}? This cannot be undone",
                    plan.data_dir.display()
                ),
                false,
            )?);
    Ok(TeardownIntent {
        remove_containers,
        remove_data,
    })
}

/// Teardown steps in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownStep {
    RemoveDns,
    RemoveContainers,
    StopService,
    DisableService,
    RemoveUnitFile,
    ReloadDaemon,
    RemoveDataDir,
}

impl TeardownStep {
    pub const ORDER: [Self; 7] = [
        Self::RemoveDns,
        Self::RemoveContainers,
        Self::StopService,
        Self::DisableService,
        Self::RemoveUnitFile,
        Self::ReloadDaemon,
        Self::RemoveDataDir,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::RemoveDns => "dns cleanup",
            Self::RemoveContainers => "container cleanup",
            Self::StopService => "stop service",
            Self::DisableService => "disable service",
            Self::RemoveUnitFile => "remove unit file",
            Self::ReloadDaemon => "daemon reload",
            Self::RemoveDataDir => "remove data directory",
        }
    }

    /// Only a unit file left behind would leave the host half-uninstalled.
    #[must_use]
    pub fn policy(self) -> StepPolicy {
        match self {
            Self::RemoveUnitFile => StepPolicy::Fatal,
            _ => StepPolicy::BestEffort,
        }
    }
}

/// Read everything teardown needs to know.
///
/// Returns `None` when the agent unit is not installed; in that case the unit
/// existence check is the only command run.
///
/// # Errors
///
/// Returns an error if the unit existence check cannot be run.
pub async fn inspect<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    store: &impl ConfigStore,
    data_dir: &Path,
) -> Result<Option<TeardownPlan>> {
    if !host.unit_installed().await? {
        return Ok(None);
    }

    let (containers, container_error) = match list_platform_containers(host).await {
        Ok(list) => (list, None),
        Err(e) => (Vec::new(), Some(format!("{e:#}"))),
    };

    let config = store.load(data_dir);
    let dns = match (config.domain, config.cloudflare_token) {
        (Some(domain), Some(token)) => DnsCleanup::Configured { domain, token },
        (Some(domain), None) => DnsCleanup::TokenMissing { domain },
        (None, _) => DnsCleanup::NotConfigured,
    };

    Ok(Some(TeardownPlan {
        data_dir: data_dir.to_path_buf(),
        containers,
        container_error,
        dns,
    }))
}

/// Run every teardown step in order.
///
/// # Errors
///
/// Returns an error only when the unit file cannot be removed; every other
/// failure is recorded as a warning in the report.
pub async fn execute<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    dns: &impl DnsConnector,
    reporter: &impl ProgressReporter,
    plan: &TeardownPlan,
    intent: TeardownIntent,
) -> Result<SequenceReport> {
    let mut seq = Sequencer::new(reporter);
    for step in TeardownStep::ORDER {
        reporter.step(&format!("{}...", step.name()));
        let result = run_step(step, host, dns, reporter, plan, intent).await;
        seq.settle(step.name(), step.policy(), result)?;
    }
    Ok(seq.finish())
}

async fn run_step<E: HostExecutor, P: PrivilegeAdapter>(
    step: TeardownStep,
    host: Host<'_, E, P>,
    dns: &impl DnsConnector,
    reporter: &impl ProgressReporter,
    plan: &TeardownPlan,
    intent: TeardownIntent,
) -> Result<StepOutcome> {
    match step {
        TeardownStep::RemoveDns => remove_dns(dns, &plan.dns).await,
        TeardownStep::RemoveContainers => {
            remove_platform_containers(host, reporter, plan, intent).await
        }
        TeardownStep::StopService => {
            host.run_privileged_checked(&["systemctl", "stop", SERVICE_NAME])
                .await?;
            Ok(StepOutcome::Done(format!("Stopped {SERVICE_NAME}")))
        }
        TeardownStep::DisableService => {
            host.run_privileged_checked(&["systemctl", "disable", SERVICE_NAME])
                .await?;
            Ok(StepOutcome::Done(format!("Disabled {SERVICE_NAME}")))
        }
        TeardownStep::RemoveUnitFile => {
            host.run_privileged_checked(&["rm", "-f", UNIT_PATH]).await?;
            Ok(StepOutcome::Done(format!("Removed {UNIT_PATH}")))
        }
        TeardownStep::ReloadDaemon => {
            host.run_privileged_checked(&["systemctl", "daemon-reload"])
                .await?;
            Ok(StepOutcome::Done("Reloaded systemd".to_string()))
        }
        TeardownStep::RemoveDataDir => remove_data_dir(host, &plan.data_dir, intent).await,
    }
}

async fn remove_dns(connector: &impl DnsConnector, dns: &DnsCleanup) -> Result<StepOutcome> {
    match dns {
        DnsCleanup::NotConfigured => {
            Ok(StepOutcome::Skipped("No DNS configuration on record".to_string()))
        }
        DnsCleanup::TokenMissing { domain } => Ok(StepOutcome::Warning(format!(
            "{domain} is on record but no Cloudflare token is; remove {} manually",
            wildcard_name(domain)
        ))),
        DnsCleanup::Configured { domain, token } => {
            let api = connector.connect(token)?;
            let outcome = remove_wildcard_dns(&api, domain).await?;
            Ok(if outcome.skipped {
                StepOutcome::Skipped(outcome.message)
            } else {
                StepOutcome::Done(outcome.message)
            })
        }
    }
}

async fn remove_platform_containers<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    reporter: &impl ProgressReporter,
    plan: &TeardownPlan,
    intent: TeardownIntent,
) -> Result<StepOutcome> {
    if let Some(err) = &plan.container_error {
        return Ok(StepOutcome::Warning(err.clone()));
    }
    if plan.containers.is_empty() {
        return Ok(StepOutcome::Skipped("No siteio containers found".to_string()));
    }
    if !intent.remove_containers {
        return Ok(StepOutcome::Skipped(format!(
            "Keeping {} container(s)",
            plan.containers.len()
        )));
    }

    let names: Vec<String> = plan.containers.iter().map(|c| c.name.clone()).collect();
    let report = remove_containers(host, reporter, &names).await;
    if report.failed.is_empty() {
        return Ok(StepOutcome::Done(format!(
            "Removed {} container(s)",
            report.removed.len()
        )));
    }
    let failed = report
        .failed
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    Ok(StepOutcome::Warning(format!(
        "removed {} of {} container(s); failed: {failed}",
        report.removed.len(),
        names.len()
    )))
}

async fn remove_data_dir<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    data_dir: &Path,
    intent: TeardownIntent,
) -> Result<StepOutcome> {
    if !intent.remove_data {
        return Ok(StepOutcome::Skipped(format!(
            "Keeping data directory {}",
            data_dir.display()
        )));
    }
    if !is_removable_dir(data_dir) {
        anyhow::bail!("refusing to remove {}", data_dir.display());
    }
    let path = data_dir.to_string_lossy();
    host.run_privileged_checked(&["rm", "-rf", &path]).await?;
    Ok(StepOutcome::Done(format!("Removed {path}")))
}

/// An absolute path with at least one normal component below the root.
fn is_removable_dir(path: &Path) -> bool {
    path.is_absolute()
        && path
            .components()
            .any(|c| matches!(c, Component::Normal(_)))
        && !path.components().any(|c| matches!(c, Component::ParentDir))
}
