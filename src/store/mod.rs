//! SQLite-backed stores for identifiers, URLs and engagement snapshots.
//!
//! - [`IdentifierStore`] - deduplicated DOIs, each tagged with its import batch
//! - [`UrlStore`] - globally unique URLs tagged with owner and [`UrlVariant`]
//! - [`SnapshotStore`] - append-only engagement history per URL
//!
//! All stores share one [`Database`](crate::Database) handle. Existence checks
//! are followed by `ON CONFLICT DO NOTHING` inserts, so a concurrent writer
//! surfaces as "already present" rather than as a duplicate row or an error.

mod error;
mod identifiers;
mod snapshots;
mod urls;

pub use error::{DbErrorKind, StoreError};
pub use identifiers::{Identifier, IdentifierStore, ImportBatch, ImportSummary};
pub use snapshots::{EngagementSnapshot, SnapshotStore};
pub use urls::{AddOutcome, UrlRecord, UrlStore, UrlVariant};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
