//! Infrastructure implementation of the `ConfigStore` port.
//!
//! Documents are pretty-printed JSON under the data directory, replaced
//! atomically (temp file + rename) with mode `0600`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use siteio_common::{AGENT_CONFIG_FILE, AgentConfig, OAUTH_CONFIG_FILE, OAuthConfig};

use crate::application::ports::ConfigStore;

/// Production `ConfigStore` backed by JSON files on disk.
pub struct JsonConfigStore;

impl ConfigStore for JsonConfigStore {
    fn load(&self, data_dir: &Path) -> AgentConfig {
        read_document(&data_dir.join(AGENT_CONFIG_FILE)).unwrap_or_default()
    }

    fn save(&self, data_dir: &Path, config: &AgentConfig) -> Result<()> {
        write_document(&data_dir.join(AGENT_CONFIG_FILE), config)
    }

    fn load_oauth(&self, data_dir: &Path) -> Option<OAuthConfig> {
        read_document(&data_dir.join(OAUTH_CONFIG_FILE))
    }

    fn save_oauth(&self, data_dir: &Path, config: &OAuthConfig) -> Result<()> {
        write_document(&data_dir.join(OAUTH_CONFIG_FILE), config)
    }
}

/// Missing files are silent; unreadable or corrupt ones are logged and
/// treated as missing.
fn read_document<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read config file");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(doc) => Some(doc),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt config file");
            None
        }
    }
}

fn write_document<T: Serialize>(path: &Path, doc: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let mut content = serde_json::to_string_pretty(doc).context("cannot serialize config")?;
    content.push('\n');

    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, &content)
        .with_context(|| format!("cannot write {}", temp_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("cannot set permissions on {}", temp_path.display()))?;
    }

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("cannot replace {}", path.display()))?;
    tracing::debug!(path = %path.display(), "config written");
    Ok(())
}
