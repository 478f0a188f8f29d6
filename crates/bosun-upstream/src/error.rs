//! Error types for upstream documentation syncing.

use thiserror::Error;

/// Result type alias using [`UpstreamError`] as the error type.
pub type Result<T> = std::result::Result<T, UpstreamError>;

/// Errors that abort a documentation sync.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Request to the GitHub API failed before a response arrived.
    #[error("Request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not the expected JSON.
    #[error("Unexpected response from {url}: {source}")]
    Json {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Local documentation file could not be read or written.
    #[error(transparent)]
    Io(#[from] bosun_core::Error),

    /// API token cannot be sent as a header value.
    #[error("GitHub token contains characters not allowed in a header")]
    InvalidToken,

    /// HTTP client could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl UpstreamError {
    pub(crate) fn request(url: &str, source: reqwest::Error) -> Self {
        Self::Request {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn json(url: &str, source: serde_json::Error) -> Self {
        Self::Json {
            url: url.to_string(),
            source,
        }
    }
}
