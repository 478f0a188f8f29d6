//! GitHub repository identifiers.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static GITHUB_REPO_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://github\.com/([^/]+)/([^/]+?)(?:\.git)?/?$")
        .expect("valid repository URL pattern")
});

/// A GitHub repository in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    /// Repository owner (user or organization).
    pub owner: String,

    /// Repository name.
    pub name: String,
}

impl RepoId {
    /// Creates a repository identifier.
    #[must_use]
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Extracts `owner/name` from a GitHub repository URL.
    ///
    /// Accepts `http` and `https`, an optional `.git` suffix and an optional
    /// trailing slash. Anything else yields `None`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_upstream::RepoId;
    ///
    /// let repo = RepoId::from_url("https://github.com/foo/bar.git").unwrap();
    /// assert_eq!(repo.to_string(), "foo/bar");
    ///
    /// assert!(RepoId::from_url("https://gitlab.com/foo/bar").is_none());
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let caps = GITHUB_REPO_URL.captures(url.trim())?;
        Some(Self::new(&caps[1], &caps[2]))
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_variants() {
        for url in [
            "https://github.com/foo/bar",
            "https://github.com/foo/bar/",
            "https://github.com/foo/bar.git",
            "http://github.com/foo/bar.git/",
            "  https://github.com/foo/bar\n",
        ] {
            assert_eq!(RepoId::from_url(url), Some(RepoId::new("foo", "bar")), "{url}");
        }
    }

    #[test]
    fn test_from_url_rejects_other_urls() {
        for url in [
            "",
            "github.com/foo/bar",
            "https://github.com/foo",
            "https://github.com/foo/bar/tree/main",
            "https://gitlab.com/foo/bar",
            "git@github.com:foo/bar.git",
        ] {
            assert!(RepoId::from_url(url).is_none(), "{url}");
        }
    }

    #[test]
    fn test_name_with_dots() {
        let repo = RepoId::from_url("https://github.com/foo/bar.js").unwrap();
        assert_eq!(repo.name, "bar.js");
    }
}
