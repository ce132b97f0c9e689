//! `siteio agent uninstall`: remove the agent locally or on `user@host`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::PrivilegeAdapter;
use crate::application::services::host::Host;
use crate::application::services::remote::{self, RemoteUninstallArgs};
use crate::application::services::teardown::{self, TeardownFlags};
use crate::commands::{exit_code_of, ssh_executor};
use crate::domain::target::Target;
use crate::output::human::HumanRenderer;
use crate::output::json;
use crate::output::reporter::TerminalReporter;

/// Arguments for the uninstall command.
#[derive(Args)]
pub struct UninstallArgs {
    /// Remote host as `user@host`; uninstalls from this machine when omitted
    pub target: Option<String>,

    /// Also delete the data directory (config, site data)
    #[arg(long)]
    pub remove_data: bool,

    /// Remove siteio containers without asking
    #[arg(long)]
    pub remove_containers: bool,

    /// SSH identity file for a remote target
    #[arg(short = 'i', long = "identity", value_name = "FILE")]
    pub identity: Option<PathBuf>,
}

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if the remote host is unreachable, a prompt fails, or
/// the unit file cannot be removed.
pub async fn run(app: &AppContext, args: UninstallArgs) -> Result<ExitCode> {
    match Target::parse(args.target.as_deref()) {
        Target::Remote(dest) => {
            app.output
                .info(&format!("Uninstalling the siteio agent from {dest}"));
            let exec = ssh_executor(&dest, args.identity);
            let status = remote::uninstall(
                &exec,
                RemoteUninstallArgs {
                    remove_data: args.remove_data,
                    remove_containers: args.remove_containers,
                    data_dir: app.remote_data_dir(),
                    yes: app.non_interactive,
                },
            )
            .await?;
            Ok(exit_code_of(status))
        }
        Target::Local => uninstall_local(app, &args).await,
    }
}

async fn uninstall_local(app: &AppContext, args: &UninstallArgs) -> Result<ExitCode> {
    let exec = app.local_executor();
    let privilege = app.privilege().await;
    let host = Host::new(&exec, &privilege);

    let Some(plan) = teardown::inspect(host, &app.config_store, &app.data_dir).await? else {
        if app.is_json() {
            json::print(&serde_json::json!({ "installed": false, "steps": [] }))?;
        } else {
            app.output
                .success("siteio agent is not installed; nothing to uninstall");
        }
        return Ok(ExitCode::SUCCESS);
    };

    HumanRenderer::new(&app.output).render_teardown_plan(&plan);
    let proceed = app.non_interactive || app.confirm("Uninstall the siteio agent?", false)?;
    if !proceed {
        app.output.info("Uninstall cancelled");
        return Ok(ExitCode::SUCCESS);
    }
    let flags = TeardownFlags {
        yes: app.non_interactive,
        remove_data: args.remove_data,
        remove_containers: args.remove_containers,
    };
    let intent = teardown::resolve_intent(flags, &plan, |prompt, default| {
        app.confirm(prompt, default)
    })?;

    let report = {
        let reporter = TerminalReporter::new(&app.output)
            .with_spinner(privilege.is_privileged());
        teardown::execute(host, &app.dns, &reporter, &plan, intent).await?
    };

    if app.is_json() {
        json::print(&serde_json::json!({ "installed": false, "steps": report.steps }))?;
    } else {
        HumanRenderer::new(&app.output).render_teardown_result(&report);
    }
    Ok(ExitCode::SUCCESS)
}
