//! PubMed / PubMed Central cross-referencing via the NCBI ID converter.
//!
//! One request per DOI. A record carrying `errmsg` and no ids means NCBI has
//! no cross-reference for the DOI; that is a normal, empty result.

use std::collections::BTreeMap;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http_client::{HttpTimeouts, build_http_client};
use crate::store::UrlVariant;

use super::ResolveError;

/// Public ID converter endpoint.
pub const DEFAULT_IDCONV_ENDPOINT: &str = "https://www.ncbi.nlm.nih.gov/pmc/utils/idconv/v1.0/";

/// Base for PubMed record pages.
pub const PUBMED_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov/pubmed";

/// Base for PubMed Central article pages.
pub const PMC_ARTICLES_BASE_URL: &str = "https://www.ncbi.nlm.nih.gov/pmc/articles";

/// Tool name reported to NCBI when none is configured.
pub const DEFAULT_NCBI_TOOL: &str = "doi-engagement";

// ==================== ID converter response ====================

#[derive(Debug, Deserialize)]
struct IdConvResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    records: Vec<IdConvRecord>,
}

#[derive(Debug, Deserialize)]
struct IdConvRecord {
    doi: Option<String>,
    pmid: Option<IdValue>,
    pmcid: Option<IdValue>,
    errmsg: Option<String>,
}

/// NCBI sends ids as strings, but numeric ids have been seen in the wild.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(u64),
}

impl IdValue {
    fn into_string(self) -> Option<String> {
        let value = match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        };
        (!value.is_empty()).then_some(value)
    }
}

// ==================== Cross references ====================

/// PubMed and PMC identifiers found for one DOI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrossReference {
    /// PubMed id, when known.
    pub pubmed_id: Option<String>,
    /// PubMed Central id (with `PMC` prefix), when known.
    pub pubmed_central_id: Option<String>,
}

impl CrossReference {
    /// True when NCBI returned neither id.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pubmed_id.is_none() && self.pubmed_central_id.is_none()
    }

    /// URLs to persist for this cross reference, PubMed first.
    #[must_use]
    pub fn urls(&self) -> Vec<(String, UrlVariant)> {
        let mut urls = Vec::with_capacity(2);
        if let Some(pmid) = &self.pubmed_id {
            urls.push((pubmed_url(pmid), UrlVariant::Pubmed));
        }
        if let Some(pmcid) = &self.pubmed_central_id {
            urls.push((pmc_url(pmcid), UrlVariant::PubmedCentral));
        }
        urls
    }
}

/// Builds the PubMed page URL for a PubMed id.
#[must_use]
pub fn pubmed_url(pmid: &str) -> String {
    format!("{PUBMED_BASE_URL}/{}", pmid.trim())
}

/// Builds the PMC article URL, normalizing the id to exactly one `PMC` prefix.
#[must_use]
pub fn pmc_url(pmcid: &str) -> String {
    format!("{PMC_ARTICLES_BASE_URL}/{}/", normalize_pmcid(pmcid))
}

fn normalize_pmcid(pmcid: &str) -> String {
    let trimmed = pmcid.trim();
    let digits = match trimmed.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("PMC") => &trimmed[3..],
        _ => trimmed,
    };
    format!("PMC{digits}")
}

/// Outcome of a bulk cross-reference call, keyed by DOI.
#[derive(Debug, Default)]
pub struct CrossReferenceReport {
    /// DOIs that were looked up successfully (possibly with no ids).
    pub resolved: BTreeMap<String, CrossReference>,
    /// DOIs whose lookup failed.
    pub failed: BTreeMap<String, ResolveError>,
}

/// Client for the NCBI ID converter service.
pub struct CrossReferenceResolver {
    client: Client,
    endpoint: Url,
    tool: String,
    email: String,
}

impl CrossReferenceResolver {
    /// Creates a resolver against the public ID converter.
    ///
    /// `tool` and `email` identify the caller to NCBI; an empty email is omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientBuild`] if HTTP client construction fails.
    pub fn new(
        timeouts: &HttpTimeouts,
        tool: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        Self::with_endpoint(timeouts, DEFAULT_IDCONV_ENDPOINT, tool, email)
    }

    /// Creates a resolver with a custom endpoint (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientBuild`] if the endpoint is not a valid URL
    /// or HTTP client construction fails.
    pub fn with_endpoint(
        timeouts: &HttpTimeouts,
        endpoint: &str,
        tool: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        let endpoint = Url::parse(endpoint).map_err(|e| ResolveError::ClientBuild {
            reason: format!("invalid ID converter endpoint '{endpoint}': {e}"),
        })?;
        Ok(Self {
            client: build_http_client(timeouts)?,
            endpoint,
            tool: tool.into(),
            email: email.into(),
        })
    }

    fn request_url(&self, doi: &str) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("ids", doi)
                .append_pair("idtype", "doi")
                .append_pair("versions", "no")
                .append_pair("format", "json")
                .append_pair("tool", &self.tool);
            if !self.email.is_empty() {
                query.append_pair("email", &self.email);
            }
        }
        url
    }

    /// Looks up PubMed / PMC ids for one DOI.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Network`] on transport failure or a non-success
    /// status, and [`ResolveError::MalformedResponse`] when the body is not a
    /// recognizable ID converter document.
    #[instrument(skip(self), fields(doi = %doi))]
    pub async fn lookup(&self, doi: &str) -> Result<CrossReference, ResolveError> {
        let response = self
            .client
            .get(self.request_url(doi))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "ID converter request failed");
                ResolveError::from_reqwest(doi, &e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = match status.as_u16() {
                429 => "NCBI rate limit exceeded. Try again later.".to_string(),
                s if s >= 500 => format!("NCBI ID converter unavailable (HTTP {s})"),
                s => format!("NCBI ID converter returned HTTP {s}"),
            };
            return Err(ResolveError::network(doi, reason));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::from_reqwest(doi, &e))?;
        parse_idconv_body(doi, &body)
    }

    /// Looks up every DOI in order, one request each.
    ///
    /// Failures are collected per DOI; one failing lookup never stops the rest.
    pub async fn resolve_cross_references(&self, dois: &[String]) -> CrossReferenceReport {
        let mut report = CrossReferenceReport::default();
        for doi in dois {
            match self.lookup(doi).await {
                Ok(reference) => {
                    report.resolved.insert(doi.clone(), reference);
                }
                Err(error) => {
                    report.failed.insert(doi.clone(), error);
                }
            }
        }
        report
    }
}

impl std::fmt::Debug for CrossReferenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossReferenceResolver")
            .field("endpoint", &self.endpoint.as_str())
            .field("tool", &self.tool)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn parse_idconv_body(doi: &str, body: &str) -> Result<CrossReference, ResolveError> {
    let parsed: IdConvResponse = serde_json::from_str(body)
        .map_err(|e| ResolveError::malformed(doi, format!("invalid JSON: {e}")))?;

    if parsed
        .status
        .as_deref()
        .is_some_and(|s| s.eq_ignore_ascii_case("error"))
    {
        let message = parsed
            .message
            .unwrap_or_else(|| "service reported an error".to_string());
        return Err(ResolveError::malformed(doi, message));
    }

    let mut records = parsed.records;
    if records.is_empty() {
        debug!("ID converter returned no records");
        return Ok(CrossReference::default());
    }
    let position = records
        .iter()
        .position(|r| r.doi.as_deref().is_some_and(|d| d.eq_ignore_ascii_case(doi)))
        .unwrap_or(0);
    let record = records.swap_remove(position);

    let reference = CrossReference {
        pubmed_id: record.pmid.and_then(IdValue::into_string),
        pubmed_central_id: record
            .pmcid
            .and_then(IdValue::into_string)
            .map(|id| normalize_pmcid(&id)),
    };
    if reference.is_empty() {
        debug!(errmsg = ?record.errmsg, "No PubMed cross reference");
    }
    Ok(reference)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pmc_url_has_exactly_one_prefix() {
        assert_eq!(
            pmc_url("PMC3531190"),
            "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC3531190/"
        );
        assert_eq!(
            pmc_url("3531190"),
            "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC3531190/"
        );
        assert_eq!(
            pmc_url("pmc3531190"),
            "https://www.ncbi.nlm.nih.gov/pmc/articles/PMC3531190/"
        );
    }

    #[test]
    fn test_pubmed_url() {
        assert_eq!(
            pubmed_url("23193287"),
            "https://www.ncbi.nlm.nih.gov/pubmed/23193287"
        );
    }

    #[test]
    fn test_parse_idconv_body_with_both_ids() {
        let body = r#"{"status":"ok","records":[{"doi":"10.1093/nar/gks1195","pmcid":"PMC3531190","pmid":"23193287"}]}"#;
        let reference = parse_idconv_body("10.1093/nar/gks1195", body).unwrap();
        assert_eq!(reference.pubmed_id.as_deref(), Some("23193287"));
        assert_eq!(reference.pubmed_central_id.as_deref(), Some("PMC3531190"));
        let urls = reference.urls();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].1, UrlVariant::Pubmed);
        assert_eq!(urls[1].1, UrlVariant::PubmedCentral);
    }

    #[test]
    fn test_parse_idconv_body_numeric_pmid() {
        let body = r#"{"status":"ok","records":[{"doi":"10.1000/xyz123","pmid":23193287}]}"#;
        let reference = parse_idconv_body("10.1000/xyz123", body).unwrap();
        assert_eq!(reference.pubmed_id.as_deref(), Some("23193287"));
        assert!(reference.pubmed_central_id.is_none());
    }

    #[test]
    fn test_parse_idconv_body_errmsg_is_empty_reference() {
        let body = r#"{"status":"ok","records":[{"doi":"10.1000/xyz123","errmsg":"invalid article id"}]}"#;
        let reference = parse_idconv_body("10.1000/xyz123", body).unwrap();
        assert!(reference.is_empty());
        assert!(reference.urls().is_empty());
    }

    #[test]
    fn test_parse_idconv_body_service_error_is_failure() {
        let body = r#"{"status":"error","message":"Invalid idtype"}"#;
        let err = parse_idconv_body("10.1000/xyz123", body).unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse { .. }));
    }

    #[test]
    fn test_parse_idconv_body_not_json_is_failure() {
        let err = parse_idconv_body("10.1000/xyz123", "<html>").unwrap_err();
        assert!(matches!(err, ResolveError::MalformedResponse { .. }));
    }

    #[test]
    fn test_request_url_carries_required_parameters() {
        let resolver = CrossReferenceResolver::with_endpoint(
            &HttpTimeouts::default(),
            "http://localhost:1/idconv/",
            "doi-engagement",
            "",
        )
        .unwrap();
        let url = resolver.request_url("10.1000/xyz123");
        let pairs: BTreeMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["ids"], "10.1000/xyz123");
        assert_eq!(pairs["idtype"], "doi");
        assert_eq!(pairs["versions"], "no");
        assert_eq!(pairs["format"], "json");
        assert_eq!(pairs["tool"], "doi-engagement");
        assert!(!pairs.contains_key("email"));
    }
}
