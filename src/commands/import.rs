//! `import` command.

use std::fs;

use anyhow::{Context, Result};
use doi_engagement::AppContext;
use tracing::info;

use crate::cli::ImportArgs;
use crate::output;

pub(crate) async fn run_import_command(ctx: &AppContext, args: &ImportArgs) -> Result<()> {
    let payload = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read import file {}", args.file.display()))?;
    let source = format!("<file {}>", args.file.display());

    info!(file = %args.file.display(), bytes = payload.len(), "Importing identifiers");
    let summary = ctx
        .identifiers
        .import(&source, &payload, args.delimiter)
        .await?;

    output::print_lines(&output::render_import_summary(
        &args.file.display().to_string(),
        &summary,
    ));
    Ok(())
}
