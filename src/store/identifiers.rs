//! Identifier persistence and batch import.

use sqlx::{FromRow, SqliteConnection};
use tracing::{debug, info, instrument};

use crate::db::Database;
use crate::identifier::{
    Candidate, DoiPattern, ImportError, matching_patterns, parse_candidates,
};

use super::urls::{UrlVariant, add_if_absent_on};
use super::{Result, StoreError};

/// A stored, validated DOI.
#[derive(Debug, Clone, FromRow)]
pub struct Identifier {
    /// Unique identifier.
    pub id: i64,
    /// Canonical DOI string (unique across the store).
    pub doi: String,
    /// Batch that first introduced this DOI.
    pub import_batch_id: Option<i64>,
    /// When the row was created.
    pub created_at: String,
}

/// Provenance record for one bulk ingest call.
#[derive(Debug, Clone, FromRow)]
pub struct ImportBatch {
    /// Unique identifier.
    pub id: i64,
    /// Payload origin (e.g. `<file dois.csv>`).
    pub source: String,
    /// Raw payload as received.
    pub raw_payload: String,
    /// When the batch was recorded.
    pub created_at: String,
}

/// Counters produced by one import call.
///
/// Every candidate lands in exactly one identifier counter (`rejected`,
/// `identifiers_added`, `identifiers_already_present`), and every supplied
/// URL of an accepted candidate in exactly one URL counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Row id of the recorded batch.
    pub batch_id: i64,
    /// New identifiers written.
    pub identifiers_added: usize,
    /// Identifiers that already existed.
    pub identifiers_already_present: usize,
    /// New external-import URLs written.
    pub urls_added: usize,
    /// External-import URLs that already existed.
    pub urls_already_present: usize,
    /// Candidates that failed DOI validation.
    pub rejected: usize,
}

async fn insert_identifier_if_absent(
    conn: &mut SqliteConnection,
    doi: &str,
    batch_id: i64,
) -> Result<(i64, bool)> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM identifier WHERE doi = ?")
        .bind(doi)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some(id) = existing {
        return Ok((id, false));
    }

    let inserted = sqlx::query_scalar::<_, i64>(
        r"INSERT INTO identifier (doi, import_batch_id)
          VALUES (?, ?)
          ON CONFLICT(doi) DO NOTHING
          RETURNING id",
    )
    .bind(doi)
    .bind(batch_id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok((id, true));
    }

    debug!(doi = %doi, "identifier inserted concurrently; treating as already present");
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM identifier WHERE doi = ?")
        .bind(doi)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| StoreError::not_found("identifier", doi))?;
    Ok((id, false))
}

/// Deduplicated identifier store.
#[derive(Debug, Clone)]
pub struct IdentifierStore {
    db: Database,
}

impl IdentifierStore {
    /// Creates a store over the given database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Parses a delimited payload and imports it as one batch.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::MalformedInput`] before anything is written when
    /// the payload cannot be parsed, or [`ImportError::Store`] on database failure.
    #[instrument(skip(self, payload), fields(source = %source))]
    pub async fn import(
        &self,
        source: &str,
        payload: &str,
        delimiter: u8,
    ) -> std::result::Result<ImportSummary, ImportError> {
        let candidates = parse_candidates(source, payload, delimiter)?;
        Ok(self.add_batch(source, payload, &candidates).await?)
    }

    /// Records a batch and adds each valid candidate (and its URL) if absent.
    ///
    /// The batch row is written first and unconditionally. Candidates are
    /// processed in order; each accepted candidate's identifier and URL rows
    /// commit together.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a query fails; candidates committed
    /// before the failure stay committed.
    #[instrument(skip(self, raw_payload, candidates), fields(source = %source, candidates = candidates.len()))]
    pub async fn add_batch(
        &self,
        source: &str,
        raw_payload: &str,
        candidates: &[Candidate],
    ) -> Result<ImportSummary> {
        let batch_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO import_batch (source, raw_payload) VALUES (?, ?) RETURNING id",
        )
        .bind(source)
        .bind(raw_payload)
        .fetch_one(self.db.pool())
        .await?;

        let mut summary = ImportSummary {
            batch_id,
            ..ImportSummary::default()
        };

        for candidate in candidates {
            let doi = candidate.doi.trim();
            let forms = matching_patterns(doi);
            if forms.is_empty() {
                debug!(doi = %doi, "Rejected candidate with invalid DOI syntax");
                summary.rejected += 1;
                continue;
            }
            debug!(
                doi = %doi,
                forms = ?forms.iter().copied().map(DoiPattern::as_str).collect::<Vec<_>>(),
                "Accepted candidate"
            );

            let mut tx = self.db.pool().begin().await?;
            let (identifier_id, identifier_created) =
                insert_identifier_if_absent(&mut tx, doi, batch_id).await?;
            let url_outcome = match candidate.url.as_deref().map(str::trim) {
                Some(url) if !url.is_empty() => Some(
                    add_if_absent_on(&mut tx, url, identifier_id, UrlVariant::ExternalImport)
                        .await?,
                ),
                _ => None,
            };
            tx.commit().await?;

            if identifier_created {
                summary.identifiers_added += 1;
            } else {
                summary.identifiers_already_present += 1;
            }
            match url_outcome {
                Some(outcome) if outcome.created => summary.urls_added += 1,
                Some(_) => summary.urls_already_present += 1,
                None => {}
            }
        }

        info!(
            batch_id,
            identifiers_added = summary.identifiers_added,
            identifiers_already_present = summary.identifiers_already_present,
            urls_added = summary.urls_added,
            urls_already_present = summary.urls_already_present,
            rejected = summary.rejected,
            "Import batch recorded"
        );
        Ok(summary)
    }

    /// Looks up an identifier by exact DOI string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_doi(&self, doi: &str) -> Result<Option<Identifier>> {
        let identifier = sqlx::query_as::<_, Identifier>("SELECT * FROM identifier WHERE doi = ?")
            .bind(doi)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(identifier)
    }

    /// Lists all identifiers in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Identifier>> {
        let identifiers =
            sqlx::query_as::<_, Identifier>("SELECT * FROM identifier ORDER BY id ASC")
                .fetch_all(self.db.pool())
                .await?;

        Ok(identifiers)
    }

    /// Lists import batches, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn list_batches(&self) -> Result<Vec<ImportBatch>> {
        let batches = sqlx::query_as::<_, ImportBatch>("SELECT * FROM import_batch ORDER BY id DESC")
            .fetch_all(self.db.pool())
            .await?;

        Ok(batches)
    }

    /// Counts stored identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM identifier")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    /// Counts recorded import batches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count_batches(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM import_batch")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    /// Deletes every identifier together with its URLs and their snapshots.
    ///
    /// Import batches are kept as provenance.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the delete fails.
    #[instrument(skip(self))]
    pub async fn purge_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM identifier")
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn store() -> IdentifierStore {
        IdentifierStore::new(Database::new_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_add_batch_counts_new_pair() {
        let store = store().await;
        let summary = store
            .add_batch(
                "<test>",
                "",
                &[Candidate::new("10.1000/xyz123", Some("http://example.org/a"))],
            )
            .await
            .unwrap();

        assert_eq!(summary.identifiers_added, 1);
        assert_eq!(summary.identifiers_already_present, 0);
        assert_eq!(summary.urls_added, 1);
        assert_eq!(summary.urls_already_present, 0);
        assert_eq!(summary.rejected, 0);
    }

    #[tokio::test]
    async fn test_add_batch_records_batch_even_when_all_rejected() {
        let store = store().await;
        let summary = store
            .add_batch("<test>", "doi\nnope\n", &[Candidate::new("nope", None)])
            .await
            .unwrap();

        assert_eq!(summary.rejected, 1);
        assert_eq!(store.count().await.unwrap(), 0);
        let batches = store.list_batches().await.unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].id, summary.batch_id);
        assert_eq!(batches[0].raw_payload, "doi\nnope\n");
        assert_eq!(store.count_batches().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_batch_duplicate_within_batch_counts_once() {
        let store = store().await;
        let summary = store
            .add_batch(
                "<test>",
                "",
                &[
                    Candidate::new("10.1000/xyz123", None),
                    Candidate::new("10.1000/XYZ123", None),
                    Candidate::new("10.1000/xyz123", None),
                ],
            )
            .await
            .unwrap();

        // Uniqueness is by exact string, so case variants are distinct rows.
        assert_eq!(summary.identifiers_added, 2);
        assert_eq!(summary.identifiers_already_present, 1);
    }

    #[tokio::test]
    async fn test_add_batch_existing_identifier_keeps_first_batch() {
        let store = store().await;
        let first = store
            .add_batch("<one>", "", &[Candidate::new("10.1000/xyz123", None)])
            .await
            .unwrap();
        store
            .add_batch("<two>", "", &[Candidate::new("10.1000/xyz123", None)])
            .await
            .unwrap();

        let identifier = store.get_by_doi("10.1000/xyz123").await.unwrap().unwrap();
        assert_eq!(identifier.import_batch_id, Some(first.batch_id));
    }

    #[tokio::test]
    async fn test_add_batch_trims_candidate_doi() {
        let store = store().await;
        let summary = store
            .add_batch("<test>", "", &[Candidate::new("  10.1000/xyz123 ", None)])
            .await
            .unwrap();
        assert_eq!(summary.identifiers_added, 1);
        assert!(store.get_by_doi("10.1000/xyz123").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_batch_accepts_non_generic_forms() {
        let store = store().await;
        let summary = store
            .add_batch(
                "<test>",
                "",
                &[
                    Candidate::new(
                        "10.1002/(SICI)1097-4571(199806)49:8<693::AID-ASI4>3.0.CO;2-0",
                        None,
                    ),
                    Candidate::new("10.1207/s15327752jpa8502&3_01", None),
                ],
            )
            .await
            .unwrap();
        assert_eq!(summary.identifiers_added, 2);
        assert_eq!(summary.rejected, 0);
    }

    #[tokio::test]
    async fn test_import_malformed_payload_creates_no_batch() {
        let store = store().await;
        let err = store
            .import("<bad>", "title,link\nx,y\n", b',')
            .await
            .unwrap_err();
        assert!(err.is_malformed());
        assert!(store.list_batches().await.unwrap().is_empty());
    }
}
