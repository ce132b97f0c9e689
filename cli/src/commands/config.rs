//! `siteio agent config`: inspect and edit the agent configuration file.

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::app::AppContext;
use crate::application::services::config_service;
use crate::domain::config::{ConfigKey, display_value, validate_config_value};
use crate::domain::error::LifecycleError;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show all settings (secrets masked)
    List,
    /// Print one setting
    Get {
        /// Setting name: apiKey, domain or cloudflareToken
        key: String,
        /// Print secrets unmasked
        #[arg(long)]
        raw: bool,
    },
    /// Change one setting
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
    /// Remove one setting
    Unset {
        /// Setting name
        key: String,
    },
}

/// Run the config command.
///
/// # Errors
///
/// Returns an error for unknown keys, invalid values, attempts to remove a
/// required key, or write failures.
pub fn run(app: &AppContext, cmd: ConfigCommand) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::List => list(app),
        ConfigCommand::Get { key, raw } => get(app, &key, raw),
        ConfigCommand::Set { key, value } => set(app, &key, &value),
        ConfigCommand::Unset { key } => unset(app, &key),
    }
}

fn list(app: &AppContext) -> Result<ExitCode> {
    let config = config_service::load(&app.config_store, &app.data_dir);
    let entries: Vec<(&str, Option<String>)> = ConfigKey::ALL
        .into_iter()
        .map(|key| (key.as_str(), key.get(&config).map(|v| display_value(key, v))))
        .collect();

    if app.is_json() {
        let map: serde_json::Map<String, serde_json::Value> = entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone().into()))
            .collect();
        json::print(&map)?;
    } else {
        HumanRenderer::new(&app.output).render_config(&entries);
    }
    Ok(ExitCode::SUCCESS)
}

fn get(app: &AppContext, key: &str, raw: bool) -> Result<ExitCode> {
    let key = ConfigKey::parse(key)?;
    let value = config_service::get_value(&app.config_store, &app.data_dir, key)
        .ok_or_else(|| LifecycleError::NotFound(format!("{key} is not set")))?;
    let shown = if raw { value } else { display_value(key, &value) };

    if app.is_json() {
        json::print(&serde_json::json!({ "key": key.as_str(), "value": shown }))?;
    } else {
        println!("{shown}");
    }
    Ok(ExitCode::SUCCESS)
}

fn set(app: &AppContext, key: &str, value: &str) -> Result<ExitCode> {
    let key = ConfigKey::parse(key)?;
    let value = value.trim();
    validate_config_value(key, value)?;
    config_service::set_value(&app.config_store, &app.data_dir, key, value)?;

    if app.is_json() {
        json::print(&serde_json::json!({ "key": key.as_str(), "value": display_value(key, value) }))?;
    } else {
        app.output
            .success(&format!("Set {key} = {}", display_value(key, value)));
    }
    Ok(ExitCode::SUCCESS)
}

fn unset(app: &AppContext, key: &str) -> Result<ExitCode> {
    let key = ConfigKey::parse(key)?;
    config_service::delete_value(&app.config_store, &app.data_dir, key)?;

    if app.is_json() {
        json::print(&serde_json::json!({ "key": key.as_str(), "removed": true }))?;
    } else {
        app.output.success(&format!("Removed {key}"));
    }
    Ok(ExitCode::SUCCESS)
}
