//! Error types for engagement fetching.

use thiserror::Error;

/// Why one URL's engagement could not be captured.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Connection failure, timeout, or other transport problem.
    #[error("graph API request failed: {reason}\n  Suggestion: Check your network connection and retry")]
    Transport {
        /// Underlying transport error
        reason: String,
    },

    /// Non-success HTTP status without a readable error document.
    #[error("graph API returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The API answered with an `error` document (bad token, rate limit, ...).
    #[error("graph API error{}: {message}\n  Suggestion: {suggestion}", code.map(|c| format!(" {c}")).unwrap_or_default())]
    Api {
        /// Numeric error code, when provided
        code: Option<i64>,
        /// Error type reported by the API
        kind: Option<String>,
        /// Error message reported by the API
        message: String,
        /// How to fix the issue
        suggestion: String,
    },

    /// The body was not the expected JSON object.
    #[error("malformed graph API response: {reason}")]
    Malformed {
        /// What was wrong with the body
        reason: String,
    },

    /// The HTTP client or request could not be set up.
    #[error("cannot initialize graph API client: {reason}\n  Suggestion: {suggestion}")]
    Setup {
        /// What went wrong
        reason: String,
        /// How to fix the issue
        suggestion: String,
    },
}

impl FetchError {
    /// Maps a reqwest transport error.
    #[must_use]
    pub fn transport(error: &reqwest::Error) -> Self {
        let reason = if error.is_timeout() {
            "request timed out".to_string()
        } else if error.is_connect() {
            "cannot connect to graph API host".to_string()
        } else {
            error.to_string()
        };
        Self::Transport { reason }
    }

    /// Creates an `Api` error from the fields of an error document.
    #[must_use]
    pub fn api(code: Option<i64>, kind: Option<String>, message: Option<String>) -> Self {
        // Graph API uses code 190 for invalid or expired access tokens.
        let suggestion = if code == Some(190) {
            "Provide a valid access token via --access-token or GRAPH_ACCESS_TOKEN"
        } else {
            "Check the access token and API version, then retry"
        };
        Self::Api {
            code,
            kind,
            message: message.unwrap_or_else(|| "unspecified error".to_string()),
            suggestion: suggestion.to_string(),
        }
    }

    /// Creates a `Malformed` error.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Creates a `Setup` error.
    #[must_use]
    pub fn setup(reason: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Setup {
            reason: reason.into(),
            suggestion: suggestion.into(),
        }
    }
}
