//! Parsing of delimited `(doi, url)` import payloads.

use thiserror::Error;
use tracing::debug;

/// Column holding the identifier.
const DOI_COLUMN: &str = "doi";

/// Optional column holding an externally supplied URL.
const URL_COLUMN: &str = "url";

/// Errors that abort a whole import call.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    /// The payload could not be parsed at all; no batch was recorded.
    #[error("malformed import payload from '{source_name}': {reason}\n  Suggestion: {suggestion}")]
    MalformedInput {
        /// Descriptor of the payload origin (e.g. file name).
        source_name: String,
        /// What was wrong with it.
        reason: String,
        /// How to fix the issue.
        suggestion: String,
    },

    /// The payload parsed but persisting it failed.
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

impl ImportError {
    /// Creates a `MalformedInput` error.
    #[must_use]
    pub fn malformed(source_name: &str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            source_name: source_name.to_string(),
            reason: reason.into(),
            suggestion: format!(
                "Provide a delimited file with a header row containing a '{DOI_COLUMN}' column and an optional '{URL_COLUMN}' column"
            ),
        }
    }

    /// Returns true for payload-level parse failures.
    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedInput { .. })
    }
}

/// One `(doi, url)` pair from an import payload, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Raw identifier text (trimmed).
    pub doi: String,
    /// Externally supplied URL, if the row had one.
    pub url: Option<String>,
}

impl Candidate {
    /// Creates a candidate pair.
    #[must_use]
    pub fn new(doi: impl Into<String>, url: Option<&str>) -> Self {
        Self {
            doi: doi.into(),
            url: url.map(str::to_string),
        }
    }
}

/// Parses a delimited payload with a header row into candidates, in input order.
///
/// The `doi` column is required and the `url` column optional (header names
/// are matched case-insensitively). Empty URL cells become `None`.
///
/// # Errors
///
/// Returns [`ImportError::MalformedInput`] when the payload has no header,
/// lacks a `doi` column, or contains rows the reader cannot parse.
#[tracing::instrument(skip(payload), fields(source = %source_name, bytes = payload.len()))]
pub fn parse_candidates(
    source_name: &str,
    payload: &str,
    delimiter: u8,
) -> Result<Vec<Candidate>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(payload.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| ImportError::malformed(source_name, e.to_string()))?
        .clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(ImportError::malformed(source_name, "payload has no header row"));
    }

    let column = |name: &str| {
        headers
            .iter()
            .position(|header| header.eq_ignore_ascii_case(name))
    };
    let Some(doi_index) = column(DOI_COLUMN) else {
        return Err(ImportError::malformed(
            source_name,
            format!("header row has no '{DOI_COLUMN}' column"),
        ));
    };
    let url_index = column(URL_COLUMN);

    let mut candidates = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::malformed(source_name, e.to_string()))?;
        let doi = record.get(doi_index).unwrap_or_default();
        let url = url_index
            .and_then(|index| record.get(index))
            .filter(|value| !value.is_empty());
        candidates.push(Candidate::new(doi, url));
    }

    debug!(candidates = candidates.len(), "Parsed import payload");
    Ok(candidates)
}
