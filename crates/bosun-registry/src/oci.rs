//! OCI Distribution API wire types.
//!
//! Only the pieces needed to list tags: the tag list body, the token
//! endpoint body and the `Link` pagination header.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static NEXT_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<([^>]+)>;\s*rel="next""#).expect("valid link pattern"));

/// Tag list response from `GET /v2/<name>/tags/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagList {
    /// Repository name.
    #[serde(default)]
    pub name: Option<String>,

    /// Tags on this page. Registries send `null` for empty repositories.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
}

/// Body returned by a registry token endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    /// Bearer token (Docker token format).
    #[serde(default)]
    pub token: Option<String>,

    /// Bearer token (OAuth2 spelling).
    #[serde(default)]
    pub access_token: Option<String>,
}

impl TokenResponse {
    /// Returns `token`, falling back to `access_token`. Empty strings are ignored.
    #[must_use]
    pub fn into_token(self) -> Option<String> {
        self.token
            .filter(|t| !t.is_empty())
            .or_else(|| self.access_token.filter(|t| !t.is_empty()))
    }
}

/// Extracts the target of the `rel="next"` entry of a `Link` header.
///
/// # Examples
///
/// ```
/// use bosun_registry::next_link;
///
/// let header = r#"</v2/foo/bar/tags/list?last=v1.2.3&n=1000>; rel="next""#;
/// assert_eq!(next_link(header), Some("/v2/foo/bar/tags/list?last=v1.2.3&n=1000"));
/// assert_eq!(next_link(""), None);
/// ```
#[must_use]
pub fn next_link(header: &str) -> Option<&str> {
    NEXT_LINK
        .captures(header)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
