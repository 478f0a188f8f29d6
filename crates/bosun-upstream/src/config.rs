//! Configuration for the GitHub API client.

use std::time::Duration;

/// GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Media type requested from the GitHub API.
pub const GITHUB_JSON: &str = "application/vnd.github+json";

/// Configuration for [`GitHubClient`](crate::GitHubClient).
#[derive(Clone)]
pub struct GitHubConfig {
    /// API base URL.
    pub api_url: String,

    /// Bearer token sent with every request, if any.
    pub token: Option<String>,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string (the GitHub API rejects requests without one).
    pub user_agent: String,
}

impl GitHubConfig {
    /// Creates a configuration for the given API base URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_upstream::GitHubConfig;
    ///
    /// let config = GitHubConfig::new("http://127.0.0.1:8080/");
    /// assert_eq!(config.api_url, "http://127.0.0.1:8080");
    /// assert!(config.token.is_none());
    /// ```
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        let api_url: String = api_url.into();
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            token: None,
            timeout: Duration::from_secs(20),
            user_agent: format!("bosun/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the API token. Empty tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: Option<impl Into<String>>) -> Self {
        self.token = token.map(Into::into).filter(|t: &String| !t.is_empty());
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let config = GitHubConfig::default();
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.timeout, Duration::from_secs(20));
    }

    #[test]
    fn test_with_token_ignores_empty() {
        let config = GitHubConfig::default().with_token(Some(""));
        assert!(config.token.is_none());

        let config = GitHubConfig::default().with_token(Some("abc"));
        assert_eq!(config.token.as_deref(), Some("abc"));

        let config = GitHubConfig::default().with_token(None::<String>);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = GitHubConfig::default().with_token(Some("ghp_secret"));
        assert!(!format!("{config:?}").contains("ghp_secret"));
    }
}
