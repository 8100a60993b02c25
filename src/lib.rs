//! DOI Engagement Library
//!
//! Tracks how much social engagement scholarly articles receive. Articles are
//! identified by DOI; every DOI is expanded into the URLs under which it may
//! circulate, and each URL's engagement counters are captured over time into
//! an append-only history.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`db`] - Database connection and schema management
//! - [`identifier`] - DOI syntax validation and import payload parsing
//! - [`store`] - Identifier, URL and snapshot persistence
//! - [`resolve`] - Resolver, landing-page and NCBI URL derivation
//! - [`engagement`] - Graph API client and engagement fetching
//! - [`pipeline`] - Batch steps wiring resolvers and the fetcher to the stores
//! - [`http_client`] - Shared outbound HTTP policy

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod db;
pub mod engagement;
pub mod http_client;
pub mod identifier;
pub mod pipeline;
pub mod resolve;
pub mod store;
mod user_agent;

// Re-export commonly used types
pub use db::{Database, DatabaseOptions, DbError};
pub use engagement::{EngagementFetcher, FetchError, FetchOutcome, GraphApi, HttpGraphApi};
pub use http_client::HttpTimeouts;
pub use identifier::{ImportError, validate};
pub use pipeline::{AppContext, NoProgress, Progress, UrlSelection};
pub use resolve::{CrossReferenceResolver, LandingPageResolver, ResolveError};
pub use store::{
    EngagementSnapshot, Identifier, IdentifierStore, ImportSummary, SnapshotStore, StoreError,
    UrlRecord, UrlStore, UrlVariant,
};
