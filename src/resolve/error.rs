//! Error types for URL derivation.
//!
//! Follows the What/Why/Fix layout used across the crate.

use thiserror::Error;

/// Errors raised while resolving an identifier to additional URLs.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    /// The request could not complete or returned a failure status.
    #[error("network resolution failed for '{doi}': {reason}\n  Suggestion: {suggestion}")]
    Network {
        /// DOI being resolved
        doi: String,
        /// Why the request failed
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The remote service answered with a body we could not interpret.
    #[error("unexpected response while resolving '{doi}': {reason}")]
    MalformedResponse {
        /// DOI being resolved
        doi: String,
        /// What was wrong with the body
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("cannot initialize HTTP client: {reason}")]
    ClientBuild {
        /// Underlying builder error
        reason: String,
    },
}

impl ResolveError {
    /// Creates a `Network` error with the default retry suggestion.
    #[must_use]
    pub fn network(doi: &str, reason: impl Into<String>) -> Self {
        Self::Network {
            doi: doi.to_string(),
            reason: reason.into(),
            suggestion: "Check your network connection and run the command again".to_string(),
        }
    }

    /// Creates a `MalformedResponse` error.
    #[must_use]
    pub fn malformed(doi: &str, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            doi: doi.to_string(),
            reason: reason.into(),
        }
    }

    /// Maps a transport error from a request for `doi`.
    #[must_use]
    pub fn from_reqwest(doi: &str, error: &reqwest::Error) -> Self {
        let reason = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else if error.is_connect() {
            "cannot connect to host".to_string()
        } else {
            error.to_string()
        };
        Self::network(doi, reason)
    }
}

impl From<reqwest::Error> for ResolveError {
    fn from(error: reqwest::Error) -> Self {
        Self::ClientBuild {
            reason: error.to_string(),
        }
    }
}
