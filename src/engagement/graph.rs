//! Graph API transport.
//!
//! [`GraphApi`] is the seam between fetching and HTTP: production code uses
//! [`HttpGraphApi`], tests substitute a stub.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::http_client::{HttpTimeouts, build_http_client};

use super::FetchError;
use super::response::GraphObject;

/// Public graph API host.
pub const DEFAULT_GRAPH_BASE_URL: &str = "https://graph.facebook.com";

/// Graph API version used when none is configured.
pub const DEFAULT_GRAPH_API_VERSION: &str = "v2.12";

/// Fields requested for every URL object.
pub const ENGAGEMENT_FIELDS: &str = "engagement,og_object";

/// Fetches a graph object's raw JSON body.
#[async_trait]
pub trait GraphApi: Send + Sync {
    /// Returns the response body for `object_id` restricted to `fields`.
    ///
    /// `object_id` arrives already percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when the request does not produce a
    /// successful response body.
    async fn get_object(&self, object_id: &str, fields: &str) -> Result<String, FetchError>;
}

/// [`GraphApi`] over HTTPS with an access token.
pub struct HttpGraphApi {
    client: Client,
    base_url: String,
    version: String,
    access_token: String,
}

impl HttpGraphApi {
    /// Creates a client for the public graph API.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Setup`] if the token is blank or HTTP client
    /// construction fails.
    pub fn new(
        timeouts: &HttpTimeouts,
        version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, FetchError> {
        Self::with_base_url(timeouts, DEFAULT_GRAPH_BASE_URL, version, access_token)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Setup`] if the token is blank, the base URL is
    /// invalid, or HTTP client construction fails.
    pub fn with_base_url(
        timeouts: &HttpTimeouts,
        base_url: impl Into<String>,
        version: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(FetchError::setup(
                "no graph API access token configured",
                "Pass --access-token, set GRAPH_ACCESS_TOKEN, or add graph_access_token to the config file",
            ));
        }
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            FetchError::setup(
                format!("invalid graph API base URL '{base_url}': {e}"),
                "Check graph_base_url in the config file",
            )
        })?;
        let client = build_http_client(timeouts).map_err(|e| {
            FetchError::setup(e.to_string(), "Check TLS and proxy configuration")
        })?;

        Ok(Self {
            client,
            base_url,
            version: version.into(),
            access_token,
        })
    }

    fn request_url(&self, object_id: &str, fields: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&format!("{}/{}/{}", self.base_url, self.version, object_id))
            .map_err(|e| FetchError::setup(format!("invalid object URL: {e}"), "Check graph_api_version"))?;
        url.query_pairs_mut()
            .append_pair("fields", fields)
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }
}

impl std::fmt::Debug for HttpGraphApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGraphApi")
            .field("base_url", &self.base_url)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl GraphApi for HttpGraphApi {
    #[instrument(skip(self), fields(version = %self.version))]
    async fn get_object(&self, object_id: &str, fields: &str) -> Result<String, FetchError> {
        let url = self.request_url(object_id, fields)?;
        // The query string carries the access token; never log `url` itself.
        debug!("Requesting graph object");

        let response = self.client.get(url).send().await.map_err(|e| {
            let error = FetchError::transport(&e.without_url());
            warn!(error = %error, "Graph API request failed");
            error
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(&e.without_url()))?;

        if status.is_success() {
            return Ok(body);
        }

        debug!(status = status.as_u16(), "Graph API returned failure status");
        match GraphObject::parse(&body).ok().and_then(|object| object.error) {
            Some(error) => Err(FetchError::api(error.code, error.kind, error.message)),
            None => Err(FetchError::Status {
                status: status.as_u16(),
            }),
        }
    }
}
