//! Application service: agent configuration use-cases.
//!
//! Every mutation is a fresh read-modify-write through [`update`]; no caller
//! keeps an in-memory copy across invocations.

use std::path::Path;

use anyhow::Result;
use siteio_common::AgentConfig;

use crate::application::ports::ConfigStore;
use crate::domain::config::{ConfigKey, ConfigPatch};
use crate::domain::error::LifecycleError;

/// Load the agent configuration (empty when absent or unreadable).
pub fn load(store: &impl ConfigStore, data_dir: &Path) -> AgentConfig {
    store.load(data_dir)
}

/// Replace the agent configuration wholesale.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save(store: &impl ConfigStore, data_dir: &Path, config: &AgentConfig) -> Result<()> {
    store.save(data_dir, config)
}

/// Load, merge `patch`, save, and return the merged document.
///
/// # Errors
///
/// Returns [`LifecycleError::StateConflict`] without touching the file when
/// the patch would remove a required key, or an error if the save fails.
pub fn update(
    store: &impl ConfigStore,
    data_dir: &Path,
    patch: &ConfigPatch,
) -> Result<AgentConfig> {
    if let Some(key) = ConfigKey::ALL
        .into_iter()
        .find(|k| k.is_required() && patch.unsets(*k))
    {
        return Err(LifecycleError::StateConflict(format!(
            "{key} is required and cannot be unset; use 'set' to replace it"
        ))
        .into());
    }
    let mut config = store.load(data_dir);
    patch.apply_to(&mut config);
    store.save(data_dir, &config)?;
    tracing::debug!(data_dir = %data_dir.display(), "agent config updated");
    Ok(config)
}

/// Read one value.
pub fn get_value(store: &impl ConfigStore, data_dir: &Path, key: ConfigKey) -> Option<String> {
    key.get(&store.load(data_dir)).map(str::to_string)
}

/// Set one value.
///
/// # Errors
///
/// Returns an error if the save fails.
pub fn set_value(
    store: &impl ConfigStore,
    data_dir: &Path,
    key: ConfigKey,
    value: &str,
) -> Result<AgentConfig> {
    update(store, data_dir, &ConfigPatch::new().set(key, value))
}

/// Remove one value.
///
/// # Errors
///
/// Returns [`LifecycleError::StateConflict`] for required keys.
pub fn delete_value(
    store: &impl ConfigStore,
    data_dir: &Path,
    key: ConfigKey,
) -> Result<AgentConfig> {
    update(store, data_dir, &ConfigPatch::new().unset(key))
}
