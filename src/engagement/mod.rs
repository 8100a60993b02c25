//! Engagement capture through the graph API.
//!
//! - [`GraphApi`] - transport seam, with [`HttpGraphApi`] as the real client
//! - [`EngagementFetcher`] - per-URL fetch producing [`FetchOutcome`]s
//! - [`GraphObject`] - tolerant decoding of the response document

mod error;
mod fetcher;
mod graph;
mod response;

pub use error::FetchError;
pub use fetcher::{
    EngagementFetcher, FetchOutcome, SnapshotFields, graph_object_id, parse_engagement,
};
pub use graph::{
    DEFAULT_GRAPH_API_VERSION, DEFAULT_GRAPH_BASE_URL, ENGAGEMENT_FIELDS, GraphApi, HttpGraphApi,
};
pub use response::{Engagement, GraphErrorBody, GraphObject, OgObject};
