//! Application service: lifecycle commands delegated to a remote host.
//!
//! The remote host runs its own `siteio` binary; this side only checks that
//! it can get there and streams the delegated command.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use anyhow::Result;

use crate::application::ports::HostExecutor;
use crate::application::services::host::stderr_text;
use crate::domain::error::LifecycleError;

/// Executable the remote host must have on its `PATH`.
pub const REMOTE_BINARY: &str = "siteio";

/// Flags forwarded to a remote `siteio agent install`.
#[derive(Debug, Clone, Default)]
pub struct RemoteInstallArgs {
    pub domain: String,
    pub email: Option<String>,
    pub cloudflare_token: Option<String>,
    /// Forwarded as `--data-dir` when set.
    pub data_dir: Option<PathBuf>,
    pub yes: bool,
}

/// Flags forwarded to a remote `siteio agent uninstall`.
#[derive(Debug, Clone, Default)]
pub struct RemoteUninstallArgs {
    pub remove_data: bool,
    pub remove_containers: bool,
    /// Forwarded as `--data-dir` when set.
    pub data_dir: Option<PathBuf>,
    pub yes: bool,
}

/// Leading `siteio [--data-dir DIR] agent <action>` words.
fn base_argv(action: &str, data_dir: Option<&Path>) -> Vec<String> {
    let mut argv = vec![REMOTE_BINARY.to_string()];
    if let Some(dir) = data_dir {
        argv.extend(["--data-dir".to_string(), dir.display().to_string()]);
    }
    argv.extend(["agent".to_string(), action.to_string()]);
    argv
}

impl RemoteInstallArgs {
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        let mut argv = base_argv("install", self.data_dir.as_deref());
        argv.extend(["--domain".to_string(), self.domain.clone()]);
        if let Some(email) = &self.email {
            argv.extend(["--email".to_string(), email.clone()]);
        }
        if let Some(token) = &self.cloudflare_token {
            argv.extend(["--cloudflare-token".to_string(), token.clone()]);
        }
        if self.yes {
            argv.push("--yes".to_string());
        }
        argv
    }
}

impl RemoteUninstallArgs {
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        let mut argv = base_argv("uninstall", self.data_dir.as_deref());
        if self.remove_data {
            argv.push("--remove-data".to_string());
        }
        if self.remove_containers {
            argv.push("--remove-containers".to_string());
        }
        if self.yes {
            argv.push("--yes".to_string());
        }
        argv
    }
}

/// Check that the remote host answers a trivial command.
///
/// # Errors
///
/// Returns [`LifecycleError::Connectivity`] carrying ssh's stderr.
pub async fn probe(exec: &impl HostExecutor) -> Result<()> {
    let connectivity = |detail: String| -> anyhow::Error {
        LifecycleError::Connectivity {
            target: exec.describe(),
            detail,
        }
        .into()
    };
    let output = exec
        .run_captured(&["true"])
        .await
        .map_err(|e| connectivity(format!("{e:#}")))?;
    if !output.status.success() {
        return Err(connectivity(stderr_text(&output)));
    }
    Ok(())
}

/// Check that `siteio` is installed on the remote host.
///
/// # Errors
///
/// Returns [`LifecycleError::NotFound`] when `command -v siteio` fails.
pub async fn require_remote_binary(exec: &impl HostExecutor) -> Result<()> {
    let output = exec
        .run_captured(&["command", "-v", REMOTE_BINARY])
        .await?;
    if !output.status.success() {
        return Err(LifecycleError::NotFound(format!(
            "{REMOTE_BINARY} is not installed on {}. Install it there first.",
            exec.describe()
        ))
        .into());
    }
    Ok(())
}

/// Probe, require the binary, then stream the delegated install.
///
/// # Errors
///
/// Returns an error if the host is unreachable, lacks `siteio`, or the
/// stream cannot be started. A non-zero remote exit is returned as status.
pub async fn install(exec: &impl HostExecutor, args: &RemoteInstallArgs) -> Result<ExitStatus> {
    probe(exec).await?;
    require_remote_binary(exec).await?;
    stream(exec, &args.argv()).await
}

/// Probe, then stream the delegated uninstall.
///
/// # Errors
///
/// Returns an error if the host is unreachable or the stream cannot be
/// started. A non-zero remote exit is returned as status.
pub async fn uninstall(
    exec: &impl HostExecutor,
    args: RemoteUninstallArgs,
) -> Result<ExitStatus> {
    probe(exec).await?;
    stream(exec, &args.argv()).await
}

async fn stream(exec: &impl HostExecutor, argv: &[String]) -> Result<ExitStatus> {
    let argv: Vec<&str> = argv.iter().map(String::as_str).collect();
    exec.run_streamed(&argv).await
}
