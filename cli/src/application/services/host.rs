//! Privileged command execution on the lifecycle target.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::process::Output;

use anyhow::Result;

use crate::application::ports::{HostExecutor, PrivilegeAdapter};
use crate::domain::error::LifecycleError;
use crate::domain::unit::{SERVICE_NAME, UNIT_PATH};

/// A target executor paired with the privilege policy for that target.
pub struct Host<'a, E, P> {
    pub exec: &'a E,
    pub privilege: &'a P,
}

impl<E, P> Clone for Host<'_, E, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, P> Copy for Host<'_, E, P> {}

impl<'a, E: HostExecutor, P: PrivilegeAdapter> Host<'a, E, P> {
    #[must_use]
    pub fn new(exec: &'a E, privilege: &'a P) -> Self {
        Self { exec, privilege }
    }

    /// Run `argv` with elevation when needed, capturing output.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process cannot be spawned; a non-zero
    /// exit is returned in the `Output`.
    pub async fn run_privileged(&self, argv: &[&str]) -> Result<Output> {
        let wrapped = self.privilege.wrap(argv);
        self.exec.run_captured(&wrapped).await
    }

    /// Run `argv` with elevation and fail on a non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Privilege`] when elevation was refused, or an
    /// error carrying the command's stderr verbatim.
    pub async fn run_privileged_checked(&self, argv: &[&str]) -> Result<Output> {
        let output = self.run_privileged(argv).await?;
        if output.status.success() {
            return Ok(output);
        }
        Err(command_failure(argv, &output))
    }

    /// `true` if the agent unit file exists on the target.
    ///
    /// # Errors
    ///
    /// Returns an error if the existence check cannot be run.
    pub async fn unit_installed(&self) -> Result<bool> {
        let output = self.exec.run_captured(&["test", "-f", UNIT_PATH]).await?;
        Ok(output.status.success())
    }

    /// Current `systemctl is-active` state of the agent, e.g. `active`, `failed`.
    ///
    /// # Errors
    ///
    /// Returns an error if `systemctl` cannot be run.
    pub async fn unit_state(&self) -> Result<String> {
        let output = self
            .exec
            .run_captured(&["systemctl", "is-active", SERVICE_NAME])
            .await?;
        let state = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if state.is_empty() {
            "unknown".to_string()
        } else {
            state
        })
    }
}

/// Trimmed stderr of a finished command, falling back to stdout.
#[must_use]
pub fn stderr_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    }
}

/// Build the error for a command that exited non-zero.
#[must_use]
pub fn command_failure(argv: &[&str], output: &Output) -> anyhow::Error {
    let detail = stderr_text(output);
    if is_elevation_refusal(&detail) {
        return LifecycleError::Privilege(detail).into();
    }
    let code = output
        .status
        .code()
        .map_or_else(|| "a signal".to_string(), |c| c.to_string());
    let program = argv.first().copied().unwrap_or("command");
    if detail.is_empty() {
        anyhow::anyhow!("{program} exited with {code}")
    } else {
        anyhow::anyhow!("{program} exited with {code}: {detail}")
    }
}

/// sudo's refusals; some, like the sudoers one, carry no `sudo:` prefix.
const ELEVATION_REFUSALS: [&str; 5] = [
    "password is required",
    "is not in the sudoers file",
    "is not allowed to run sudo",
    "a terminal is required",
    "incorrect password attempt",
];

fn is_elevation_refusal(stderr: &str) -> bool {
    ELEVATION_REFUSALS
        .iter()
        .any(|needle| stderr.contains(needle))
}
