//! `fetch-engagement` command.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use doi_engagement::pipeline::{UrlSelection, capture_engagement, parse_url_list};
use doi_engagement::{AppContext, EngagementFetcher, HttpGraphApi, Progress};
use tracing::info;

use crate::app::config_runtime::Settings;
use crate::cli::FetchArgs;
use crate::output;

fn url_selection(args: &FetchArgs) -> Result<UrlSelection> {
    let Some(path) = &args.urls else {
        return Ok(UrlSelection::All);
    };
    let payload = fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list {}", path.display()))?;
    let urls = parse_url_list(&path.display().to_string(), &payload)?;
    info!(count = urls.len(), "Loaded URL list");
    Ok(UrlSelection::Listed(urls))
}

pub(crate) async fn run_fetch_engagement_command(
    ctx: &AppContext,
    settings: &Settings,
    args: &FetchArgs,
    progress: &dyn Progress,
) -> Result<()> {
    let selection = url_selection(args)?;

    let access_token = args
        .access_token
        .clone()
        .or_else(|| settings.graph_access_token.clone())
        .unwrap_or_default();
    let version = args
        .api_version
        .clone()
        .unwrap_or_else(|| settings.graph_api_version.clone());
    let api = HttpGraphApi::with_base_url(
        &settings.timeouts,
        settings.graph_base_url.clone(),
        version,
        access_token,
    )?;
    let fetcher = EngagementFetcher::new(Arc::new(api));

    let summary = capture_engagement(ctx, &fetcher, &selection, progress).await?;
    output::print_lines(&output::render_engagement_summary(&summary));
    Ok(())
}
