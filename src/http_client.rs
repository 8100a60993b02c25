//! Shared HTTP client construction policy.
//!
//! Landing-page resolution, NCBI cross-referencing and the graph API all go
//! through clients built here so timeouts, redirects and the user agent stay
//! consistent.

use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;

use crate::user_agent;

/// Default connect timeout, in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout, in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Redirect hops followed before a request fails.
pub const MAX_REDIRECTS: usize = 10;

/// Connect and read timeouts for outbound requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Seconds allowed to establish a connection.
    pub connect_secs: u64,
    /// Seconds allowed for the whole request, body included.
    pub read_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

/// Builds an HTTP client using the shared project policy.
///
/// # Errors
///
/// Returns the underlying [`reqwest::Error`] when the TLS backend or system
/// configuration prevents client construction.
pub fn build_http_client(timeouts: &HttpTimeouts) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.read_secs))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
        .build()
}
