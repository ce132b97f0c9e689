//! `siteio agent oauth`: configure OIDC sign-in for protected sites.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::PrivilegeAdapter;
use crate::application::services::host::Host;
use crate::application::services::oauth_service::configure_oauth;
use crate::domain::oauth::OAuthInput;
use crate::output::json;
use crate::output::reporter::TerminalReporter;

/// Arguments for the oauth command. Missing values are prompted for.
#[derive(Args)]
pub struct OAuthArgs {
    /// OIDC issuer URL, e.g. `https://accounts.google.com`
    #[arg(long)]
    pub issuer_url: Option<String>,

    /// OAuth client ID
    #[arg(long)]
    pub client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "SITEIO_OAUTH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}

/// Run the oauth command.
///
/// # Errors
///
/// Returns an error if a prompt fails, the input is invalid, no agent domain
/// is configured, or the config cannot be written.
pub async fn run(app: &AppContext, args: OAuthArgs) -> Result<ExitCode> {
    let input = OAuthInput {
        issuer_url: match args.issuer_url {
            Some(v) => v,
            None => app.input("OIDC issuer URL", false)?,
        },
        client_id: match args.client_id {
            Some(v) => v,
            None => app.input("Client ID", false)?,
        },
        client_secret: match args.client_secret {
            Some(v) => v,
            None => app.password("Client secret", false)?,
        },
    };

    let exec = app.local_executor();
    let privilege = app.privilege().await;
    let result = {
        let reporter = TerminalReporter::new(&app.output)
            .with_spinner(privilege.is_privileged());
        configure_oauth(
            Host::new(&exec, &privilege),
            &app.config_store,
            &reporter,
            &app.data_dir,
            &input,
        )
        .await?
    };

    if app.is_json() {
        json::print(&serde_json::json!({
            "issuerUrl": result.config.issuer_url,
            "clientId": result.config.client_id,
            "cookieDomain": result.config.cookie_domain,
            "restarted": result.restarted,
        }))?;
    }
    Ok(ExitCode::SUCCESS)
}
