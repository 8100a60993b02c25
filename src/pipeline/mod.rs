//! Batch steps that tie resolvers and the fetcher to the stores.
//!
//! Each step walks its items in order, records per-item failures in its
//! summary, and only returns `Err` when the store itself fails.

mod context;
mod derive;
mod engagement;
mod progress;
mod summary;

pub use context::AppContext;
pub use derive::{derive_urls, link_cross_references};
pub use engagement::{UrlSelection, capture_engagement, parse_url_list};
pub use progress::{NoProgress, Progress};
pub use summary::{
    CrossReferenceSummary, DeriveSummary, EngagementSummary, ItemFailure, StatusReport,
    VariantCounts, VariantTally,
};

use tracing::instrument;

use crate::store::StoreError;

/// Counts rows in every table.
///
/// # Errors
///
/// Returns [`StoreError`] if a count query fails.
#[instrument(skip(ctx))]
pub async fn status(ctx: &AppContext) -> Result<StatusReport, StoreError> {
    Ok(StatusReport {
        import_batches: ctx.identifiers.count_batches().await?,
        identifiers: ctx.identifiers.count().await?,
        urls: ctx.urls.count().await?,
        snapshots: ctx.snapshots.count().await?,
    })
}
