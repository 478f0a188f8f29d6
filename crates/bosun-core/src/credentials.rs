//! Credentials read from the environment.
//!
//! The variables are read once into a [`Credentials`] value which is then
//! handed to the registry and GitHub clients, so tests can inject their own.

/// Variables holding the registry username, in precedence order.
pub const REGISTRY_USERNAME_VARS: [&str; 2] = ["GHCR_USERNAME", "GITHUB_USERNAME"];

/// Variables holding the registry token or password, in precedence order.
pub const REGISTRY_TOKEN_VARS: [&str; 3] = ["GHCR_TOKEN", "GITHUB_TOKEN", "GH_TOKEN"];

/// Variables holding the GitHub API token, in precedence order.
pub const GITHUB_TOKEN_VARS: [&str; 2] = ["GITHUB_TOKEN", "GH_TOKEN"];

/// Credentials for the container registry and the GitHub API.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Registry username.
    pub registry_username: Option<String>,

    /// Registry token or password.
    pub registry_token: Option<String>,

    /// GitHub API token.
    pub github_token: Option<String>,
}

impl Credentials {
    /// Reads credentials from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads credentials through `lookup`, honoring variable precedence.
    ///
    /// Empty values are treated as unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_core::Credentials;
    ///
    /// let creds = Credentials::from_lookup(|name| match name {
    ///     "GITHUB_USERNAME" => Some("octocat".to_string()),
    ///     "GH_TOKEN" => Some("secret".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(creds.registry_username.as_deref(), Some("octocat"));
    /// assert_eq!(creds.registry_token.as_deref(), Some("secret"));
    /// assert_eq!(creds.github_token.as_deref(), Some("secret"));
    /// ```
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let first = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(*name))
                .find(|value| !value.is_empty())
        };

        Self {
            registry_username: first(&REGISTRY_USERNAME_VARS),
            registry_token: first(&REGISTRY_TOKEN_VARS),
            github_token: first(&GITHUB_TOKEN_VARS),
        }
    }

    /// Returns the registry username and token when both are set.
    #[must_use]
    pub fn registry_basic(&self) -> Option<(&str, &str)> {
        match (&self.registry_username, &self.registry_token) {
            (Some(user), Some(token)) => Some((user.as_str(), token.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("registry_username", &self.registry_username)
            .field("registry_token", &redact(&self.registry_token))
            .field("github_token", &redact(&self.github_token))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_precedence() {
        let creds = Credentials::from_lookup(lookup(&[
            ("GHCR_USERNAME", "ghcr-user"),
            ("GITHUB_USERNAME", "gh-user"),
            ("GHCR_TOKEN", "ghcr-token"),
            ("GITHUB_TOKEN", "github-token"),
            ("GH_TOKEN", "gh-token"),
        ]));
        assert_eq!(creds.registry_username.as_deref(), Some("ghcr-user"));
        assert_eq!(creds.registry_token.as_deref(), Some("ghcr-token"));
        assert_eq!(creds.github_token.as_deref(), Some("github-token"));
    }

    #[test]
    fn test_empty_values_are_unset() {
        let creds = Credentials::from_lookup(lookup(&[
            ("GHCR_TOKEN", ""),
            ("GH_TOKEN", "gh-token"),
        ]));
        assert_eq!(creds.registry_token.as_deref(), Some("gh-token"));
        assert_eq!(creds.github_token.as_deref(), Some("gh-token"));
        assert!(creds.registry_username.is_none());
    }

    #[test]
    fn test_registry_basic_requires_both() {
        let creds = Credentials::from_lookup(lookup(&[("GHCR_TOKEN", "t")]));
        assert!(creds.registry_basic().is_none());

        let creds = Credentials::from_lookup(lookup(&[
            ("GHCR_USERNAME", "u"),
            ("GHCR_TOKEN", "t"),
        ]));
        assert_eq!(creds.registry_basic(), Some(("u", "t")));
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let creds = Credentials::from_lookup(lookup(&[
            ("GHCR_USERNAME", "u"),
            ("GHCR_TOKEN", "super-secret"),
        ]));
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
