//! Shared handles for one CLI invocation.

use crate::db::Database;
use crate::store::{IdentifierStore, SnapshotStore, UrlStore};

/// Database plus the three stores built on it.
///
/// Constructed once per process and passed by reference to every pipeline
/// step.
#[derive(Debug, Clone)]
pub struct AppContext {
    db: Database,
    /// Identifier store.
    pub identifiers: IdentifierStore,
    /// URL store.
    pub urls: UrlStore,
    /// Snapshot store.
    pub snapshots: SnapshotStore,
}

impl AppContext {
    /// Builds the stores over `db`.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self {
            identifiers: IdentifierStore::new(db.clone()),
            urls: UrlStore::new(db.clone()),
            snapshots: SnapshotStore::new(db.clone()),
            db,
        }
    }

    /// Underlying database handle.
    #[must_use]
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Closes the connection pool.
    pub async fn close(self) {
        self.db.close().await;
    }
}
