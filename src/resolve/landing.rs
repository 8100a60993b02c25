//! Landing-page resolution by following the DOI resolver's redirects.

use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::http_client::{HttpTimeouts, build_http_client};

use super::ResolveError;
use super::derive::{DOI_RESOLVER_BASE, encode_doi};

/// Follows `https://doi.org/{doi}` to the publisher's page.
pub struct LandingPageResolver {
    client: Client,
    resolver_base_url: String,
}

impl LandingPageResolver {
    /// Creates a resolver against the public DOI resolver.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientBuild`] if HTTP client construction fails.
    pub fn new(timeouts: &HttpTimeouts) -> Result<Self, ResolveError> {
        Self::with_base_url(timeouts, DOI_RESOLVER_BASE)
    }

    /// Creates a resolver with a custom resolver base (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::ClientBuild`] if HTTP client construction fails.
    pub fn with_base_url(
        timeouts: &HttpTimeouts,
        base_url: impl Into<String>,
    ) -> Result<Self, ResolveError> {
        let base_url = base_url.into();
        Ok(Self {
            client: build_http_client(timeouts)?,
            resolver_base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the final URL reached after following redirects for `doi`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Network`] on connection failure, timeout, a
    /// redirect loop beyond the hop limit, or a non-success final status.
    #[instrument(skip(self), fields(doi = %doi))]
    pub async fn resolve_landing_page(&self, doi: &str) -> Result<String, ResolveError> {
        let request_url = format!("{}/{}", self.resolver_base_url, encode_doi(doi));
        debug!(url = %request_url, "Following DOI resolver redirects");

        let response = self.client.get(&request_url).send().await.map_err(|e| {
            warn!(error = %e, "Landing page request failed");
            ResolveError::from_reqwest(doi, &e)
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), final_url = %response.url(), "Landing page returned failure status");
            return Err(ResolveError::network(
                doi,
                format!("final response was HTTP {}", status.as_u16()),
            ));
        }

        let landing = response.url().to_string();
        debug!(landing = %landing, "Resolved landing page");
        Ok(landing)
    }
}

impl std::fmt::Debug for LandingPageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LandingPageResolver")
            .field("resolver_base_url", &self.resolver_base_url)
            .finish_non_exhaustive()
    }
}
