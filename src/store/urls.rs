//! URL persistence with global uniqueness by string value.

use std::fmt;

use sqlx::{FromRow, SqliteConnection};
use tracing::{debug, instrument};

use crate::db::Database;

use super::{Result, StoreError};

/// Why/how a URL was derived for an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UrlVariant {
    /// Legacy HTTP resolver form (`http://dx.doi.org/...`).
    DoiOld,
    /// HTTPS resolver form (`https://doi.org/...`).
    DoiNew,
    /// Publisher page the resolver redirects to.
    LandingPage,
    /// PubMed record page.
    Pubmed,
    /// PubMed Central article page.
    PubmedCentral,
    /// URL supplied alongside the identifier in an import file.
    ExternalImport,
}

impl UrlVariant {
    /// Every variant, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::DoiOld,
        Self::DoiNew,
        Self::LandingPage,
        Self::Pubmed,
        Self::PubmedCentral,
        Self::ExternalImport,
    ];

    /// Returns the database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DoiOld => "doi_old",
            Self::DoiNew => "doi_new",
            Self::LandingPage => "landing_page",
            Self::Pubmed => "pubmed",
            Self::PubmedCentral => "pubmed_central",
            Self::ExternalImport => "external_import",
        }
    }
}

impl fmt::Display for UrlVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UrlVariant {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| format!("invalid url variant: {s}"))
    }
}

/// A stored URL row.
#[derive(Debug, Clone, FromRow)]
pub struct UrlRecord {
    /// Unique identifier.
    pub id: i64,
    /// The URL string (unique across the store).
    pub url: String,
    /// Owning identifier row.
    pub identifier_id: i64,
    /// Variant kind (stored as text, parsed via `variant()`).
    #[sqlx(rename = "variant")]
    pub variant_str: String,
    /// When the row was created.
    pub created_at: String,
}

impl UrlRecord {
    /// Returns the parsed variant.
    ///
    /// # Errors
    ///
    /// Returns the offending text when the stored value names no known variant.
    pub fn variant(&self) -> std::result::Result<UrlVariant, String> {
        self.variant_str.parse()
    }
}

/// Result of an insert-if-absent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOutcome {
    /// Whether a new row was written.
    pub created: bool,
    /// Row id of the new or pre-existing record.
    pub id: i64,
}

impl AddOutcome {
    fn created(id: i64) -> Self {
        Self { created: true, id }
    }

    fn existing(id: i64) -> Self {
        Self { created: false, id }
    }
}

async fn find_url_id(conn: &mut SqliteConnection, url: &str) -> Result<Option<i64>> {
    let id = sqlx::query_scalar::<_, i64>("SELECT id FROM url WHERE url = ?")
        .bind(url)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

/// Existence check followed by conditional insert, on a caller-supplied
/// connection so it can join an enclosing transaction.
///
/// The insert also carries `ON CONFLICT DO NOTHING`: if another writer slipped
/// the same URL in between, the row is reported as already present.
pub(crate) async fn add_if_absent_on(
    conn: &mut SqliteConnection,
    url: &str,
    identifier_id: i64,
    variant: UrlVariant,
) -> Result<AddOutcome> {
    if let Some(id) = find_url_id(conn, url).await? {
        return Ok(AddOutcome::existing(id));
    }

    let inserted = sqlx::query_scalar::<_, i64>(
        r"INSERT INTO url (url, identifier_id, variant)
          VALUES (?, ?, ?)
          ON CONFLICT(url) DO NOTHING
          RETURNING id",
    )
    .bind(url)
    .bind(identifier_id)
    .bind(variant.as_str())
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = inserted {
        return Ok(AddOutcome::created(id));
    }

    debug!(url = %url, "URL inserted concurrently; treating as already present");
    find_url_id(conn, url)
        .await?
        .map(AddOutcome::existing)
        .ok_or_else(|| StoreError::not_found("url", url))
}

/// Deduplicated URL store.
#[derive(Debug, Clone)]
pub struct UrlStore {
    db: Database,
}

impl UrlStore {
    /// Creates a store over the given database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts `url` for `identifier_id` unless a row with that exact string exists.
    ///
    /// Uniqueness is global: a URL already owned by another identifier is
    /// reported as present and left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails (including a
    /// foreign-key failure for an unknown identifier).
    #[instrument(skip(self), fields(variant = %variant))]
    pub async fn add_if_absent(
        &self,
        url: &str,
        identifier_id: i64,
        variant: UrlVariant,
    ) -> Result<AddOutcome> {
        let mut conn = self.db.pool().acquire().await?;
        add_if_absent_on(&mut conn, url, identifier_id, variant).await
    }

    /// Adds several URLs for one identifier in a single transaction.
    ///
    /// Either every row is committed or none is. Outcomes are returned in
    /// input order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if any insert fails; nothing is written.
    #[instrument(skip(self, urls), fields(count = urls.len()))]
    pub async fn add_all_if_absent(
        &self,
        identifier_id: i64,
        urls: &[(String, UrlVariant)],
    ) -> Result<Vec<AddOutcome>> {
        let mut tx = self.db.pool().begin().await?;
        let mut outcomes = Vec::with_capacity(urls.len());
        for (url, variant) in urls {
            outcomes.push(add_if_absent_on(&mut tx, url, identifier_id, *variant).await?);
        }
        tx.commit().await?;

        Ok(outcomes)
    }

    /// Returns whether `identifier_id` already owns a URL of `variant`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn has_variant(&self, identifier_id: i64, variant: UrlVariant) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"SELECT EXISTS(SELECT 1 FROM url WHERE identifier_id = ? AND variant = ?)",
        )
        .bind(identifier_id)
        .bind(variant.as_str())
        .fetch_one(self.db.pool())
        .await?;

        Ok(exists)
    }

    /// Looks up a URL row by exact string.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn get_by_url(&self, url: &str) -> Result<Option<UrlRecord>> {
        let record = sqlx::query_as::<_, UrlRecord>("SELECT * FROM url WHERE url = ?")
            .bind(url)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(record)
    }

    /// Lists all URLs in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<UrlRecord>> {
        let records = sqlx::query_as::<_, UrlRecord>("SELECT * FROM url ORDER BY id ASC")
            .fetch_all(self.db.pool())
            .await?;

        Ok(records)
    }

    /// Lists the URLs owned by one identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn list_for_identifier(&self, identifier_id: i64) -> Result<Vec<UrlRecord>> {
        let records = sqlx::query_as::<_, UrlRecord>(
            "SELECT * FROM url WHERE identifier_id = ? ORDER BY id ASC",
        )
        .bind(identifier_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(records)
    }

    /// Counts stored URLs.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the query fails.
    #[instrument(skip(self))]
    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM url")
            .fetch_one(self.db.pool())
            .await?;

        Ok(count)
    }

    /// Deletes every URL; their snapshots go with them via cascade.
    ///
    /// # Returns
    ///
    /// The number of URLs removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the delete fails.
    #[instrument(skip(self))]
    pub async fn purge_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM url")
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
