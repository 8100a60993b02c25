//! `derive-urls` and `link-ncbi` commands.

use anyhow::Result;
use doi_engagement::pipeline::{derive_urls, link_cross_references};
use doi_engagement::{AppContext, CrossReferenceResolver, LandingPageResolver, Progress};

use crate::app::config_runtime::Settings;
use crate::cli::ForceArgs;
use crate::output;

pub(crate) async fn run_derive_urls_command(
    ctx: &AppContext,
    settings: &Settings,
    args: &ForceArgs,
    progress: &dyn Progress,
) -> Result<()> {
    let resolver = LandingPageResolver::new(&settings.timeouts)?;
    let summary = derive_urls(ctx, &resolver, args.force, progress).await?;
    output::print_lines(&output::render_derive_summary(&summary));
    Ok(())
}

pub(crate) async fn run_link_ncbi_command(
    ctx: &AppContext,
    settings: &Settings,
    args: &ForceArgs,
    progress: &dyn Progress,
) -> Result<()> {
    let resolver = CrossReferenceResolver::new(
        &settings.timeouts,
        settings.ncbi_tool.clone(),
        settings.ncbi_email.clone(),
    )?;
    let summary = link_cross_references(ctx, &resolver, args.force, progress).await?;
    output::print_lines(&output::render_cross_reference_summary(&summary));
    Ok(())
}
