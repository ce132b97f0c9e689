//! Platform container discovery and cleanup.
//!
//! Containers are recognised only by their `siteio-` name prefix. Removal is
//! sequential so every failure can be reported against a container name.

use anyhow::Result;
use serde::Serialize;

use crate::application::ports::{HostExecutor, PrivilegeAdapter, ProgressReporter};
use crate::application::services::host::{Host, command_failure, stderr_text};
use crate::domain::error::LifecycleError;

/// Name prefix shared by every container the platform starts.
pub const CONTAINER_PREFIX: &str = "siteio-";

/// A platform container as listed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerInfo {
    pub name: String,
    /// Coarse runtime status, e.g. `Up 3 hours` or `Exited (0) 2 days ago`.
    pub status: String,
}

/// Per-container removal results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub removed: Vec<String>,
    /// `(name, reason)` for every container that could not be removed.
    pub failed: Vec<(String, String)>,
}

/// List every container whose name carries the platform prefix.
///
/// # Errors
///
/// Returns [`LifecycleError::DependencyUnavailable`] if the container runtime
/// cannot be queried.
pub async fn list_platform_containers<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
) -> Result<Vec<ContainerInfo>> {
    let filter = format!("name=^{CONTAINER_PREFIX}");
    let output = host
        .run_privileged(&[
            "docker",
            "ps",
            "-a",
            "--filter",
            &filter,
            "--format",
            "{{.Names}}\t{{.Status}}",
        ])
        .await
        .map_err(|e| LifecycleError::DependencyUnavailable(format!("cannot list containers: {e:#}")))?;
    if !output.status.success() {
        return Err(LifecycleError::DependencyUnavailable(format!(
            "cannot list containers: {}",
            stderr_text(&output)
        ))
        .into());
    }
    Ok(parse_container_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse `docker ps --format '{{.Names}}\t{{.Status}}'` output, keeping only
/// platform containers.
#[must_use]
pub fn parse_container_list(stdout: &str) -> Vec<ContainerInfo> {
    stdout
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            let (name, status) = line.split_once('\t').unwrap_or((line, ""));
            name.starts_with(CONTAINER_PREFIX).then(|| ContainerInfo {
                name: name.to_string(),
                status: status.trim().to_string(),
            })
        })
        .collect()
}

/// Stop and force-remove each container, one at a time.
///
/// A failed stop is ignored (the force-remove handles running containers);
/// a failed remove is recorded and the loop moves on.
pub async fn remove_containers<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    reporter: &impl ProgressReporter,
    names: &[String],
) -> RemovalReport {
    let mut report = RemovalReport::default();
    for name in names {
        if let Ok(out) = host.run_privileged(&["docker", "stop", name]).await
            && !out.status.success()
        {
            tracing::debug!(container = %name, stderr = %stderr_text(&out), "docker stop failed");
        }
        let argv = ["docker", "rm", "-f", name.as_str()];
        let result = match host.run_privileged(&argv).await {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(command_failure(&argv, &out)),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                reporter.success(&format!("Removed container {name}"));
                report.removed.push(name.clone());
            }
            Err(e) => {
                reporter.warn(&format!("Could not remove container {name}: {e:#}"));
                report.failed.push((name.clone(), format!("{e:#}")));
            }
        }
    }
    report
}
