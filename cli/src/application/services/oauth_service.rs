//! Application service: OAuth gateway configuration.

use std::path::Path;

use anyhow::Result;
use siteio_common::OAuthConfig;

use crate::application::ports::{ConfigStore, HostExecutor, PrivilegeAdapter, ProgressReporter};
use crate::application::services::host::Host;
use crate::domain::error::LifecycleError;
use crate::domain::oauth::{OAuthInput, build_oauth_config};
use crate::domain::secrets::generate_cookie_secret;
use crate::domain::unit::SERVICE_NAME;

/// Outcome of [`configure_oauth`].
#[derive(Debug)]
pub struct OAuthResult {
    pub config: OAuthConfig,
    /// `true` when the running agent was restarted to pick up the change.
    pub restarted: bool,
}

/// Validate `input`, write the OAuth document wholesale, then restart the
/// agent if it is installed.
///
/// # Errors
///
/// Returns [`LifecycleError::Validation`] when no domain is on record or the
/// input is invalid, or an error if the document cannot be written. A failed
/// restart is reported as a warning.
pub async fn configure_oauth<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    store: &impl ConfigStore,
    reporter: &impl ProgressReporter,
    data_dir: &Path,
    input: &OAuthInput,
) -> Result<OAuthResult> {
    let agent = store.load(data_dir);
    let Some(domain) = agent.domain.filter(|d| !d.is_empty()) else {
        return Err(LifecycleError::Validation(
            "No domain configured. Install the agent first: siteio agent install --domain <domain>"
                .to_string(),
        )
        .into());
    };

    let config = build_oauth_config(input, &domain, generate_cookie_secret())?;
    store.save_oauth(data_dir, &config)?;
    reporter.success(&format!("OAuth configured for {}", config.issuer_url));

    let restarted = restart_if_installed(host, reporter).await;
    Ok(OAuthResult { config, restarted })
}

async fn restart_if_installed<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    reporter: &impl ProgressReporter,
) -> bool {
    match host.unit_installed().await {
        Ok(true) => {}
        Ok(false) => {
            reporter.info("Agent service not installed; the setting applies on next start");
            return false;
        }
        Err(e) => {
            reporter.warn(&format!("Could not check the agent service: {e:#}"));
            return false;
        }
    }
    reporter.step(&format!("restarting {SERVICE_NAME}..."));
    match host
        .run_privileged_checked(&["systemctl", "restart", SERVICE_NAME])
        .await
    {
        Ok(_) => {
            reporter.success(&format!("Restarted {SERVICE_NAME}"));
            true
        }
        Err(e) => {
            reporter.warn(&format!(
                "Could not restart {SERVICE_NAME}: {e:#}. Restart it manually to apply OAuth."
            ));
            false
        }
    }
}
