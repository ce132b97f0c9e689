//! Command implementations

pub mod config;
pub mod install;
pub mod oauth;
pub mod status;
pub mod token;
pub mod uninstall;

use std::path::PathBuf;
use std::process::{ExitCode, ExitStatus};

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::executor::SshExecutor;

/// `siteio agent` subcommands.
#[derive(Subcommand)]
pub enum AgentCommand {
    /// Install the agent as a systemd service
    Install(install::InstallArgs),
    /// Stop and remove the agent
    Uninstall(uninstall::UninstallArgs),
    /// Configure OAuth (OIDC) sign-in for protected sites
    Oauth(oauth::OAuthArgs),
    /// Show agent service and configuration status
    Status,
    /// Print the client connection token
    Token,
    /// Read and change the agent configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),
}

/// Run an agent subcommand.
///
/// # Errors
///
/// Returns an error if the command fails.
pub async fn run(app: &AppContext, cmd: AgentCommand) -> Result<ExitCode> {
    match cmd {
        AgentCommand::Install(args) => install::run(app, args).await,
        AgentCommand::Uninstall(args) => uninstall::run(app, args).await,
        AgentCommand::Oauth(args) => oauth::run(app, args).await,
        AgentCommand::Status => status::run(app).await,
        AgentCommand::Token => token::run(app),
        AgentCommand::Config(cmd) => config::run(app, cmd),
    }
}

/// SSH executor for a remote lifecycle target.
pub(crate) fn ssh_executor(
    target: &str,
    identity: Option<PathBuf>,
) -> SshExecutor<TokioCommandRunner> {
    SshExecutor::new(TokioCommandRunner::default(), target, identity)
}

/// Process exit code mirroring a delegated remote command.
pub(crate) fn exit_code_of(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    }
}
