//! Error types for registry operations.

use thiserror::Error;

/// Maximum number of characters of a response body kept in an error.
pub const BODY_EXCERPT_LEN: usize = 200;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Failed to connect to registry.
    #[error("Failed to connect to registry at {url}: {source}")]
    ConnectionFailed {
        /// Registry URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The registry asked for credentials and no bearer token could be obtained.
    #[error(
        "Authentication required for {repository}. Set GHCR_USERNAME and GHCR_TOKEN for private repos."
    )]
    AuthenticationRequired {
        /// Repository path.
        repository: String,
    },

    /// The first page of the tag listing was refused.
    #[error("Failed to list tags for {repository}: {status} {excerpt}")]
    ListingFailed {
        /// Repository path.
        repository: String,
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        excerpt: String,
    },

    /// A later page of the tag listing was refused.
    #[error("Pagination failed for {repository}: {status} {excerpt}")]
    PaginationFailed {
        /// Repository path.
        repository: String,
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        excerpt: String,
    },

    /// HTTP error from registry.
    #[error("HTTP error from registry: {status} - {message}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    JsonError {
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Invalid URL.
    #[error("Invalid URL: {url}")]
    InvalidUrl {
        /// URL string.
        url: String,
    },
}

/// Returns the first [`BODY_EXCERPT_LEN`] characters of a response body.
#[must_use]
pub fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            Self::ConnectionFailed {
                url: err
                    .url()
                    .map_or_else(|| "unknown".to_string(), ToString::to_string),
                source: err,
            }
        } else if err.is_status() {
            let status = err.status().map_or(0, |s| s.as_u16());
            Self::HttpError {
                status,
                message: err.to_string(),
            }
        } else {
            Self::HttpError {
                status: 0,
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError { source: err }
    }
}
