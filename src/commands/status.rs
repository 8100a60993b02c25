//! `status` command.

use anyhow::Result;
use doi_engagement::AppContext;
use doi_engagement::pipeline::status;

use crate::app::config_runtime::Settings;
use crate::output;

pub(crate) async fn run_status_command(ctx: &AppContext, settings: &Settings) -> Result<()> {
    let report = status(ctx).await?;
    output::print_lines(&output::render_status(
        &settings.database.display().to_string(),
        &report,
    ));
    Ok(())
}
