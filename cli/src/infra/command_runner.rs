//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution, with an optional timeout and kill.

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use crate::application::ports::CommandRunner;

/// Default timeout for captured probes (`id -u`, ssh reachability checks).
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(60);

/// Production `CommandRunner`.
///
/// Dropping the `.output()` future on timeout would leave the child running;
/// `tokio::select!` with an explicit `child.kill()` terminates it.
pub struct TokioCommandRunner {
    timeout: Option<Duration>,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// A runner whose captured commands may take as long as they need.
    ///
    /// Used for lifecycle commands: `sudo` may sit at a password prompt and
    /// `systemctl start` waits on the unit's own start timeout.
    #[must_use]
    pub fn without_timeout() -> Self {
        Self { timeout: None }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        capture(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output> {
        capture(program, args, Some(timeout)).await
    }

    async fn run_status(&self, program: &str, args: &[&str]) -> Result<ExitStatus> {
        tracing::debug!(program, argc = args.len(), "running attached command");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        child
            .wait()
            .await
            .with_context(|| format!("waiting for {program}"))
    }
}

/// Run to completion with captured output, killing the child at `timeout`.
async fn capture(program: &str, args: &[&str], timeout: Option<Duration>) -> Result<Output> {
    tracing::debug!(program, argc = args.len(), "running command");
    let mut child = tokio::process::Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn {program}"))?;

    let mut stdout_handle = child.stdout.take();
    let mut stderr_handle = child.stderr.take();

    tokio::select! {
        result = async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stdout_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
                async {
                    let mut buf = Vec::new();
                    if let Some(ref mut h) = stderr_handle {
                        let _ = h.read_to_end(&mut buf).await;
                    }
                    buf
                },
            );
            let status = status.with_context(|| format!("waiting for {program}"))?;
            tracing::debug!(program, code = ?status.code(), "command finished");
            Ok(Output { status, stdout, stderr })
        } => result,
        Some(limit) = expire(timeout) => {
            let _ = child.kill().await;
            anyhow::bail!("{program} timed out after {}s", limit.as_secs())
        }
    }
}

/// Resolves to the limit once it has elapsed; never resolves without one.
async fn expire(timeout: Option<Duration>) -> Option<Duration> {
    match timeout {
        Some(limit) => {
            tokio::time::sleep(limit).await;
            Some(limit)
        }
        None => std::future::pending().await,
    }
}
