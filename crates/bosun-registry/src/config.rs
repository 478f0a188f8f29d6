//! Configuration types for the registry client.

use std::time::Duration;

/// Registry URL used when none is configured.
pub const DEFAULT_REGISTRY_URL: &str = "https://ghcr.io";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Page size hint sent with tag listing requests.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Configuration for the registry client.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Registry URL (e.g., "<https://ghcr.io>").
    pub url: String,

    /// Credentials presented to the token endpoint.
    pub auth: RegistryAuth,

    /// Request timeout.
    pub timeout: Duration,

    /// Page size hint for tag listing (`n` query parameter).
    pub page_size: u32,

    /// User agent string.
    pub user_agent: String,
}

impl RegistryConfig {
    /// Creates a new registry configuration with the given URL.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::new("https://ghcr.io/");
    /// assert_eq!(config.url, "https://ghcr.io");
    /// ```
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        let url: String = url.into();
        Self {
            url: url.trim_end_matches('/').to_string(),
            auth: RegistryAuth::None,
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
            user_agent: format!("bosun/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Sets the authentication method.
    #[must_use]
    pub fn with_auth(mut self, auth: RegistryAuth) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the tag listing page size hint.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns the tag listing URL for a repository.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_registry::RegistryConfig;
    ///
    /// let config = RegistryConfig::default();
    /// assert_eq!(
    ///     config.tags_url("foo/bar"),
    ///     "https://ghcr.io/v2/foo/bar/tags/list"
    /// );
    /// ```
    #[must_use]
    pub fn tags_url(&self, repository: &str) -> String {
        format!("{}/v2/{repository}/tags/list", self.url)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

/// Credentials used when exchanging a registry challenge for a bearer token.
#[derive(Clone, Default)]
pub enum RegistryAuth {
    /// Anonymous token exchange.
    #[default]
    None,

    /// Basic authentication (username/password or username/token).
    Basic {
        /// Username.
        username: String,
        /// Password or token.
        password: String,
    },
}

impl RegistryAuth {
    /// Creates basic authentication.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_registry::RegistryAuth;
    ///
    /// let auth = RegistryAuth::basic("user", "pass");
    /// ```
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates basic authentication when both parts are present, else anonymous.
    #[must_use]
    pub fn from_parts(username: Option<&str>, password: Option<&str>) -> Self {
        match (username, password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Self::basic(user, pass)
            }
            _ => Self::None,
        }
    }
}

impl std::fmt::Debug for RegistryAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}
