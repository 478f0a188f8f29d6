//! Container image reference parsing.
//!
//! Splits a raw image string such as `ghcr.io/owner/app:1.2.3@sha256:...`
//! into the registry host and the repository path.

use std::fmt;

/// Registry host assumed when a reference has no dotted first segment.
pub const DEFAULT_REGISTRY: &str = "ghcr.io";

/// A container image reference reduced to registry host and repository path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    /// Registry host (e.g., `ghcr.io`).
    pub registry: String,

    /// Repository path within the registry (e.g., `owner/app`).
    pub repository: String,
}

impl ImageReference {
    /// Parses a raw image reference.
    ///
    /// The digest (`@...`) is always removed. The tag is removed when the
    /// string has exactly one `:` and a `/` precedes it, so a registry port
    /// without a path is left alone. Parsing never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_core::ImageReference;
    ///
    /// let image = ImageReference::parse("ghcr.io/foo/bar:1.2.3@sha256:abc");
    /// assert_eq!(image.registry, "ghcr.io");
    /// assert_eq!(image.repository, "foo/bar");
    ///
    /// let image = ImageReference::parse("foo/bar");
    /// assert_eq!(image.registry, "ghcr.io");
    /// assert_eq!(image.repository, "foo/bar");
    /// ```
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut image = raw.trim();

        if let Some((name, _digest)) = image.split_once('@') {
            image = name;
        }

        if image.matches(':').count() == 1 {
            if let Some((name, _tag)) = image.rsplit_once(':') {
                if name.contains('/') {
                    image = name;
                }
            }
        }

        match image.split_once('/') {
            Some((first, rest)) if first.contains('.') => Self {
                registry: first.to_string(),
                repository: rest.to_string(),
            },
            None if image.contains('.') => Self {
                registry: image.to_string(),
                repository: String::new(),
            },
            _ => Self {
                registry: DEFAULT_REGISTRY.to_string(),
                repository: image.to_string(),
            },
        }
    }

    /// Returns true if this image is hosted on the given registry.
    #[must_use]
    pub fn is_registry(&self, host: &str) -> bool {
        self.registry.eq_ignore_ascii_case(host)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.registry, self.repository)
    }
}
