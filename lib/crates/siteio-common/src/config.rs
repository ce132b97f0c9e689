use serde::{Deserialize, Serialize};

/// Default agent data directory on the host.
pub const DEFAULT_DATA_DIR: &str = "/var/lib/siteio";

/// Agent configuration file name inside the data directory.
pub const AGENT_CONFIG_FILE: &str = "agent-config.json";

/// OAuth configuration file name inside the data directory.
pub const OAUTH_CONFIG_FILE: &str = "oauth-config.json";

/// Persisted agent configuration (`agent-config.json`).
///
/// Every field is optional on disk: a freshly loaded document may be partial
/// or empty. `api_key` is always present once the agent has been installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudflare_token: Option<String>,
}

impl AgentConfig {
    /// Public API base URL derived from the configured domain.
    #[must_use]
    pub fn api_url(&self) -> Option<String> {
        self.domain.as_deref().map(api_url_for)
    }
}

/// Public API base URL for an agent serving `domain`.
#[must_use]
pub fn api_url_for(domain: &str) -> String {
    format!("https://api.{domain}")
}

/// Persisted OAuth gateway configuration (`oauth-config.json`).
///
/// Always written as a whole document; never partially merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthConfig {
    /// OIDC issuer, absolute `https://` URL ending in `/`.
    pub issuer_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// 32 hex characters (16 raw bytes): the proxy accepts only 16, 24 or 32 byte secrets.
    pub cookie_secret: String,
    pub cookie_domain: String,
}
