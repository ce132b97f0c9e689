//! Types shared between the siteio agent runtime and the CLI that manages it.

pub mod config;
pub mod token;

pub use config::{
    AGENT_CONFIG_FILE, AgentConfig, DEFAULT_DATA_DIR, OAUTH_CONFIG_FILE, OAuthConfig, api_url_for,
};
pub use token::{ConnectionToken, TokenError};
