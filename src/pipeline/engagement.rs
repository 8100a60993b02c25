//! Engagement capture step.

use std::collections::HashSet;

use tracing::{info, instrument};

use crate::engagement::{EngagementFetcher, FetchOutcome};
use crate::identifier::ImportError;
use crate::store::{StoreError, UrlRecord};

use super::context::AppContext;
use super::progress::Progress;
use super::summary::{EngagementSummary, ItemFailure};

/// Which stored URLs to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSelection {
    /// Every stored URL.
    All,
    /// Only these URL strings; ones not in the store are reported as unknown.
    Listed(Vec<String>),
}

/// Parses a JSON array of URL strings.
///
/// # Errors
///
/// Returns [`ImportError::MalformedInput`] when the payload is not a JSON
/// array of strings.
pub fn parse_url_list(source_name: &str, payload: &str) -> Result<Vec<String>, ImportError> {
    serde_json::from_str::<Vec<String>>(payload).map_err(|e| ImportError::MalformedInput {
        source_name: source_name.to_string(),
        reason: e.to_string(),
        suggestion: "Provide a JSON array of URL strings, e.g. [\"https://example.org/a\"]"
            .to_string(),
    })
}

async fn select_urls(
    ctx: &AppContext,
    selection: &UrlSelection,
    summary: &mut EngagementSummary,
) -> Result<Vec<UrlRecord>, StoreError> {
    let listed = match selection {
        UrlSelection::All => return ctx.urls.list_all().await,
        UrlSelection::Listed(listed) => listed,
    };

    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(listed.len());
    for url in listed.iter().map(|u| u.trim()) {
        if !seen.insert(url) {
            continue;
        }
        match ctx.urls.get_by_url(url).await? {
            Some(record) => records.push(record),
            None => summary.unknown.push(url.to_string()),
        }
    }
    Ok(records)
}

/// Fetches engagement for the selected URLs and appends one snapshot per
/// successful fetch.
///
/// Failed fetches write nothing and are listed in the summary. Each snapshot
/// is appended as soon as its fetch succeeds.
///
/// # Errors
///
/// Returns [`StoreError`] when reading URLs or appending a snapshot fails.
#[instrument(skip(ctx, fetcher, selection, progress))]
pub async fn capture_engagement(
    ctx: &AppContext,
    fetcher: &EngagementFetcher,
    selection: &UrlSelection,
    progress: &dyn Progress,
) -> Result<EngagementSummary, StoreError> {
    let mut summary = EngagementSummary::default();
    let records = select_urls(ctx, selection, &mut summary).await?;
    summary.requested = records.len();

    progress.start("fetch-engagement", records.len() as u64);
    for record in &records {
        match fetcher.fetch_one(record).await {
            FetchOutcome::Success(fields) => {
                ctx.snapshots.append(&fields).await?;
                summary.snapshots_recorded += 1;
            }
            FetchOutcome::Failure { url, error, .. } => {
                summary.failures.push(ItemFailure::new(url, &error));
            }
        }
        progress.advance(&record.url);
    }
    progress.finish();

    info!(
        requested = summary.requested,
        snapshots_recorded = summary.snapshots_recorded,
        unknown = summary.unknown.len(),
        failures = summary.failures.len(),
        "Engagement capture finished"
    );
    Ok(summary)
}
