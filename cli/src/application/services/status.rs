//! Application service: read-only agent status.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use siteio_common::ConnectionToken;

use crate::application::ports::{ConfigStore, HostExecutor, PrivilegeAdapter};
use crate::application::services::host::Host;
use crate::domain::config::mask_value;
use crate::domain::error::LifecycleError;

/// Snapshot of the agent on this host. Secrets are masked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    pub installed: bool,
    /// `systemctl is-active` state; absent when the unit is not installed.
    pub state: Option<String>,
    pub data_dir: String,
    pub domain: Option<String>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub cloudflare_token: Option<String>,
    pub oauth_configured: bool,
}

/// Gather unit and configuration state.
///
/// # Errors
///
/// Returns an error if the unit checks cannot be run.
pub async fn gather_status<E: HostExecutor, P: PrivilegeAdapter>(
    host: Host<'_, E, P>,
    store: &impl ConfigStore,
    data_dir: &Path,
) -> Result<AgentStatus> {
    let installed = host.unit_installed().await?;
    let state = if installed {
        Some(host.unit_state().await?)
    } else {
        None
    };
    let config = store.load(data_dir);
    Ok(AgentStatus {
        installed,
        state,
        data_dir: data_dir.display().to_string(),
        api_url: config.api_url(),
        domain: config.domain,
        api_key: config.api_key.as_deref().map(mask_value),
        cloudflare_token: config.cloudflare_token.as_deref().map(mask_value),
        oauth_configured: store.load_oauth(data_dir).is_some(),
    })
}

/// Connection token for the agent configured under `data_dir`.
///
/// # Errors
///
/// Returns [`LifecycleError::NotFound`] when the domain or API key is missing.
pub fn connection_token(store: &impl ConfigStore, data_dir: &Path) -> Result<ConnectionToken> {
    let config = store.load(data_dir);
    let (Some(api_url), Some(api_key)) = (config.api_url(), config.api_key) else {
        return Err(LifecycleError::NotFound(format!(
            "no agent configuration in {}. Run: siteio agent install",
            data_dir.display()
        ))
        .into());
    };
    Ok(ConnectionToken::new(api_url, api_key))
}
