//! CLI argument parsing with clap derive

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use siteio_common::DEFAULT_DATA_DIR;

use crate::app::{AppContext, AppFlags, BehaviourFlags, OutputFlags};
use crate::commands;

/// Install and manage the siteio deployment agent
#[derive(Parser)]
#[command(
    name = "siteio",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output (`NO_COLOR` is also honoured)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Assume yes for every prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    /// Agent data directory
    #[arg(
        long,
        global = true,
        env = "SITEIO_DATA_DIR",
        default_value = DEFAULT_DATA_DIR,
        value_name = "DIR"
    )]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install, configure and remove the agent
    #[command(subcommand)]
    Agent(commands::AgentCommand),
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<ExitCode> {
        let Cli {
            json,
            quiet,
            no_color,
            yes,
            data_dir,
            command,
        } = self;
        let app = AppContext::new(&AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            behaviour: BehaviourFlags { yes, data_dir },
        });
        match command {
            Command::Agent(cmd) => commands::run(&app, cmd).await,
        }
    }
}
