//! `siteio agent token`: print the client connection token.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::status::connection_token;
use crate::output::json;

/// Run the token command.
///
/// # Errors
///
/// Returns an error if no agent configuration is on record.
pub fn run(app: &AppContext) -> Result<ExitCode> {
    let token = connection_token(&app.config_store, &app.data_dir)?;
    if app.is_json() {
        json::print(&serde_json::json!({
            "apiUrl": token.api_url,
            "token": token.encode(),
        }))?;
    } else {
        // Printed even with --quiet: the token is the output.
        println!("{}", token.encode());
    }
    Ok(ExitCode::SUCCESS)
}
