//! `HostExecutor` implementations: the local host and an SSH peer.

use std::path::PathBuf;
use std::process::{ExitStatus, Output};

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, HostExecutor};
use crate::domain::target::shell_join;

/// Seconds ssh waits for the TCP connection before giving up.
pub const SSH_CONNECT_TIMEOUT_SECS: u32 = 10;

/// Runs argument vectors directly on this machine.
pub struct LocalExecutor<R> {
    runner: R,
}

impl<R: CommandRunner> LocalExecutor<R> {
    #[must_use]
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

fn split<'a>(argv: &'a [&'a str]) -> Result<(&'a str, &'a [&'a str])> {
    argv.split_first()
        .map(|(program, args)| (*program, args))
        .context("empty command")
}

impl<R: CommandRunner> HostExecutor for LocalExecutor<R> {
    fn is_remote(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "localhost".to_string()
    }

    async fn run_captured(&self, argv: &[&str]) -> Result<Output> {
        let (program, args) = split(argv)?;
        self.runner.run(program, args).await
    }

    async fn run_streamed(&self, argv: &[&str]) -> Result<ExitStatus> {
        let (program, args) = split(argv)?;
        self.runner.run_status(program, args).await
    }
}

/// Runs commands on `user@host` over the system `ssh` client.
///
/// Captured commands use `BatchMode` so a missing key fails instead of
/// prompting. Streamed commands allocate a TTY and inherit stdio, so the
/// remote side may prompt.
pub struct SshExecutor<R> {
    runner: R,
    target: String,
    identity: Option<PathBuf>,
}

impl<R: CommandRunner> SshExecutor<R> {
    #[must_use]
    pub fn new(runner: R, target: impl Into<String>, identity: Option<PathBuf>) -> Self {
        Self {
            runner,
            target: target.into(),
            identity,
        }
    }

    fn identity_args(&self) -> Vec<String> {
        self.identity
            .as_ref()
            .map(|p| vec!["-i".to_string(), p.display().to_string()])
            .unwrap_or_default()
    }

    /// ssh arguments for a captured, non-interactive run.
    #[must_use]
    pub fn captured_args(&self, argv: &[&str]) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={SSH_CONNECT_TIMEOUT_SECS}"),
        ];
        args.extend(self.identity_args());
        args.push(self.target.clone());
        args.push(shell_join(argv));
        args
    }

    /// ssh arguments for a streamed run with a TTY.
    #[must_use]
    pub fn streamed_args(&self, argv: &[&str]) -> Vec<String> {
        let mut args = vec!["-t".to_string()];
        args.extend(self.identity_args());
        args.push(self.target.clone());
        args.push(shell_join(argv));
        args
    }
}

impl<R: CommandRunner> HostExecutor for SshExecutor<R> {
    fn is_remote(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        self.target.clone()
    }

    async fn run_captured(&self, argv: &[&str]) -> Result<Output> {
        tracing::debug!(host = %self.target, program = argv.first().copied().unwrap_or(""), "ssh captured");
        let args = self.captured_args(argv);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run("ssh", &args).await
    }

    async fn run_streamed(&self, argv: &[&str]) -> Result<ExitStatus> {
        tracing::debug!(host = %self.target, program = argv.first().copied().unwrap_or(""), "ssh streamed");
        let args = self.streamed_args(argv);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.runner.run_status("ssh", &args).await
    }
}
