//! `siteio agent install`: install the agent locally or on `user@host`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::PrivilegeAdapter;
use crate::application::services::host::Host;
use crate::application::services::provisioner::{
    InstallIntent, InstallPorts, SETTLE_INTERVAL, install_agent,
};
use crate::application::services::remote::{self, RemoteInstallArgs};
use crate::commands::{exit_code_of, ssh_executor};
use crate::domain::config::validate_domain;
use crate::domain::target::Target;
use crate::infra::fs::binary_candidates;
use crate::output::human::HumanRenderer;
use crate::output::json;
use crate::output::reporter::TerminalReporter;

/// Arguments for the install command.
#[derive(Args)]
pub struct InstallArgs {
    /// Remote host as `user@host`; installs on this machine when omitted
    pub target: Option<String>,

    /// Domain the agent serves sites under (sites become `<name>.<domain>`)
    #[arg(long)]
    pub domain: Option<String>,

    /// Contact email for TLS certificate registration
    #[arg(long)]
    pub email: Option<String>,

    /// Cloudflare API token used to create the `*.<domain>` DNS record
    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub cloudflare_token: Option<String>,

    /// SSH identity file for a remote target
    #[arg(short = 'i', long = "identity", value_name = "FILE")]
    pub identity: Option<PathBuf>,
}

/// Answers gathered before anything runs.
struct Answers {
    domain: String,
    email: Option<String>,
    cloudflare_token: Option<String>,
}

/// Run the install command.
///
/// # Errors
///
/// Returns an error if a prompt fails or a fatal install step fails.
pub async fn run(app: &AppContext, args: InstallArgs) -> Result<ExitCode> {
    let target = Target::parse(args.target.as_deref());
    let answers = gather(app, &args)?;

    match target {
        Target::Remote(dest) => {
            app.output.info(&format!("Installing the siteio agent on {dest}"));
            let exec = ssh_executor(&dest, args.identity);
            let status = remote::install(
                &exec,
                &RemoteInstallArgs {
                    domain: answers.domain,
                    email: answers.email,
                    cloudflare_token: answers.cloudflare_token,
                    data_dir: app.remote_data_dir(),
                    yes: app.non_interactive,
                },
            )
            .await?;
            Ok(exit_code_of(status))
        }
        Target::Local => install_local(app, answers).await,
    }
}

fn gather(app: &AppContext, args: &InstallArgs) -> Result<Answers> {
    let domain = match &args.domain {
        Some(d) => d.trim().to_lowercase(),
        None => app.input("Domain (e.g. apps.example.com)", false)?.to_lowercase(),
    };
    validate_domain(&domain)?;

    let email = match &args.email {
        Some(e) => Some(e.trim().to_string()),
        None if app.non_interactive => None,
        None => Some(app.input("Email for TLS certificates (optional)", true)?),
    }
    .filter(|e| !e.is_empty());

    let cloudflare_token = match &args.cloudflare_token {
        Some(t) => Some(t.trim().to_string()),
        None if app.non_interactive => None,
        None => Some(app.password("Cloudflare API token for DNS (optional)", true)?),
    }
    .filter(|t| !t.is_empty());

    Ok(Answers {
        domain,
        email,
        cloudflare_token,
    })
}

async fn install_local(app: &AppContext, answers: Answers) -> Result<ExitCode> {
    let staging = tempfile::tempdir().context("creating staging directory")?;
    let intent = InstallIntent {
        domain: answers.domain,
        email: answers.email,
        cloudflare_token: answers.cloudflare_token,
        data_dir: app.data_dir.clone(),
        binary_candidates: binary_candidates(),
        staging_dir: staging.path().to_path_buf(),
        settle: SETTLE_INTERVAL,
    };

    let exec = app.local_executor();
    let privilege = app.privilege().await;
    let ports = InstallPorts {
        store: &app.config_store,
        fs: &app.local_fs,
        dns: &app.dns,
        ip: &app.public_ip,
    };
    let result = {
        let reporter = TerminalReporter::new(&app.output)
            .with_spinner(privilege.is_privileged());
        install_agent(Host::new(&exec, &privilege), &ports, &reporter, &intent).await?
    };

    if app.is_json() {
        json::print(&serde_json::json!({
            "installed": true,
            "binary": result.binary.display().to_string(),
            "apiUrl": result.api_url,
            "token": result.token,
            "steps": result.report.steps,
        }))?;
    } else {
        HumanRenderer::new(&app.output).render_install_result(&result);
    }
    Ok(ExitCode::SUCCESS)
}
