//! `siteio agent status`: show agent service and configuration status.

use std::process::ExitCode;

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::host::Host;
use crate::application::services::status::gather_status;
use crate::output::human::HumanRenderer;
use crate::output::json;

/// Run the status command.
///
/// # Errors
///
/// Returns an error if the unit state cannot be queried.
pub async fn run(app: &AppContext) -> Result<ExitCode> {
    let exec = app.local_executor();
    let privilege = app.privilege().await;
    let status = gather_status(Host::new(&exec, &privilege), &app.config_store, &app.data_dir).await?;

    if app.is_json() {
        json::print(&status)?;
    } else {
        HumanRenderer::new(&app.output).render_status(&status);
    }
    Ok(ExitCode::SUCCESS)
}
