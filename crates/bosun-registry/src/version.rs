//! Selection of the newest semantic version among registry tags.
//!
//! A tag qualifies when it looks like `[v]MAJOR.MINOR.PATCH[-pre][+build]`
//! and is not `latest`. Qualifying tags are compared with semver precedence,
//! so `v1.10.0` beats `v1.9.0` and `2.0.0-rc.1` beats both.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;
use semver::Version;

static SEMVER_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^v?\d+\.\d+\.\d+([-+].+)?$").expect("valid semver pattern"));

/// A tag that parsed as a semantic version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    /// Parsed version (leading `v` removed).
    pub version: Version,

    /// Tag as published in the registry.
    pub tag: String,
}

impl VersionCandidate {
    /// Parses a tag, returning `None` if it does not qualify.
    ///
    /// Tags that match the pattern but are rejected by the semver parser
    /// (leading zeros, empty pre-release identifiers) are skipped.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        if tag == "latest" || !SEMVER_TAG.is_match(tag) {
            return None;
        }

        match Version::parse(VersionSelector::normalize(tag)) {
            Ok(version) => Some(Self {
                version,
                tag: tag.to_string(),
            }),
            Err(e) => {
                tracing::debug!(tag, error = %e, "skipping unparseable version tag");
                None
            }
        }
    }

    /// Orders candidates by version; among equal versions the tag without a
    /// leading `v` ranks higher.
    fn rank(&self, other: &Self) -> Ordering {
        self.version
            .cmp(&other.version)
            .then_with(|| other.has_prefix().cmp(&self.has_prefix()))
    }

    fn has_prefix(&self) -> bool {
        self.tag.starts_with('v')
    }
}

/// Picks the newest semantic version from a list of tags.
#[derive(Debug, Clone, Copy)]
pub struct VersionSelector;

impl VersionSelector {
    /// Creates a new version selector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns the tag holding the highest semantic version.
    ///
    /// Returns `None` when no tag qualifies. When several tags share a
    /// version the one without a leading `v` wins; if still tied, the
    /// first one listed wins.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_registry::VersionSelector;
    ///
    /// let selector = VersionSelector::new();
    /// let tags = ["latest", "v1.2.3", "v1.10.0", "nightly", "2.0.0-rc.1"];
    /// assert_eq!(selector.latest(&tags).as_deref(), Some("2.0.0-rc.1"));
    ///
    /// let tags = ["v1.9.0", "v1.10.0"];
    /// assert_eq!(selector.latest(&tags).as_deref(), Some("v1.10.0"));
    ///
    /// assert_eq!(selector.latest(&["latest", "main"]), None);
    /// ```
    #[must_use]
    pub fn latest(&self, tags: &[impl AsRef<str>]) -> Option<String> {
        Self::candidates(tags)
            .into_iter()
            .fold(None::<VersionCandidate>, |best, candidate| match best {
                Some(best) if candidate.rank(&best) != Ordering::Greater => Some(best),
                _ => Some(candidate),
            })
            .map(|candidate| candidate.tag)
    }

    /// Returns every qualifying tag in listing order.
    #[must_use]
    pub fn candidates(tags: &[impl AsRef<str>]) -> Vec<VersionCandidate> {
        tags.iter()
            .filter_map(|t| VersionCandidate::parse(t.as_ref()))
            .collect()
    }

    /// Strips a single leading `v` from a tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_registry::VersionSelector;
    ///
    /// assert_eq!(VersionSelector::normalize("v1.2.3"), "1.2.3");
    /// assert_eq!(VersionSelector::normalize("1.2.3"), "1.2.3");
    /// ```
    #[must_use]
    pub fn normalize(tag: &str) -> &str {
        tag.strip_prefix('v').unwrap_or(tag)
    }
}

impl Default for VersionSelector {
    fn default() -> Self {
        Self::new()
    }
}
