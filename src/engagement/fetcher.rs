//! Turns graph API responses into snapshot rows.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::store::UrlRecord;

use super::FetchError;
use super::graph::{ENGAGEMENT_FIELDS, GraphApi};
use super::response::GraphObject;

/// Fields of one engagement snapshot, ready to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFields {
    /// Row id of the URL the snapshot belongs to.
    pub url_id: i64,
    /// The URL string.
    pub url: String,
    /// Raw response body, stored verbatim.
    pub response: String,
    pub reactions: Option<i64>,
    pub shares: Option<i64>,
    pub comments: Option<i64>,
    pub plugin_comments: Option<i64>,
}

/// Result for one URL of a batch.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The URL's counters were captured.
    Success(SnapshotFields),
    /// The URL could not be captured; no snapshot should be written.
    Failure {
        url_id: i64,
        url: String,
        error: FetchError,
    },
}

impl FetchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// URL this outcome is about.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Success(fields) => &fields.url,
            Self::Failure { url, .. } => url,
        }
    }
}

/// Percent-encodes a URL into a graph object identifier.
#[must_use]
pub fn graph_object_id(url: &str) -> String {
    urlencoding::encode(url).into_owned()
}

/// Extracts snapshot fields from a successful response body.
///
/// A body carrying an `error` document is a failure even when the HTTP
/// status was 200.
///
/// # Errors
///
/// Returns [`FetchError::Api`] for an error document and
/// [`FetchError::Malformed`] for a body that does not parse.
pub fn parse_engagement(url_id: i64, url: &str, body: String) -> Result<SnapshotFields, FetchError> {
    let object = GraphObject::parse(&body).map_err(|e| FetchError::malformed(e.to_string()))?;
    if let Some(error) = object.error {
        return Err(FetchError::api(error.code, error.kind, error.message));
    }

    Ok(SnapshotFields {
        url_id,
        url: url.to_string(),
        reactions: object.reactions(),
        shares: object.shares(),
        comments: object.comments(),
        plugin_comments: object.plugin_comments(),
        response: body,
    })
}

/// Captures engagement counters for stored URLs.
///
/// Requests go out one at a time, in input order. A failed URL is reported
/// and never retried within the same batch.
#[derive(Clone)]
pub struct EngagementFetcher {
    api: Arc<dyn GraphApi>,
}

impl EngagementFetcher {
    /// Creates a fetcher over the given graph API implementation.
    #[must_use]
    pub fn new(api: Arc<dyn GraphApi>) -> Self {
        Self { api }
    }

    /// Fetches one URL.
    #[instrument(skip(self, record), fields(url_id = record.id, url = %record.url))]
    pub async fn fetch_one(&self, record: &UrlRecord) -> FetchOutcome {
        let object_id = graph_object_id(&record.url);
        let result = match self.api.get_object(&object_id, ENGAGEMENT_FIELDS).await {
            Ok(body) => parse_engagement(record.id, &record.url, body),
            Err(error) => Err(error),
        };

        match result {
            Ok(fields) => {
                debug!(
                    reactions = ?fields.reactions,
                    shares = ?fields.shares,
                    comments = ?fields.comments,
                    "Captured engagement"
                );
                FetchOutcome::Success(fields)
            }
            Err(error) => {
                warn!(error = %error, "Engagement fetch failed");
                FetchOutcome::Failure {
                    url_id: record.id,
                    url: record.url.clone(),
                    error,
                }
            }
        }
    }

    /// Fetches every URL, returning one outcome per input in the same order.
    pub async fn fetch_batch(&self, urls: &[UrlRecord]) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::with_capacity(urls.len());
        for record in urls {
            outcomes.push(self.fetch_one(record).await);
        }
        outcomes
    }
}

impl std::fmt::Debug for EngagementFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngagementFetcher").finish_non_exhaustive()
    }
}
