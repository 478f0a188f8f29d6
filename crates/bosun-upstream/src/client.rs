//! GitHub REST API client.
//!
//! Covers the three endpoints used to mirror documentation: repository
//! metadata (default branch), file contents and releases by tag.

use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{GitHubConfig, GITHUB_JSON};
use crate::error::{Result, UpstreamError};
use crate::repo::RepoId;

/// Repository metadata (`GET /repos/{owner}/{repo}`).
#[derive(Debug, Clone, Deserialize)]
struct RepoMetadata {
    #[serde(default)]
    default_branch: Option<String>,
}

/// File entry (`GET /repos/{owner}/{repo}/contents/{path}`).
#[derive(Debug, Clone, Deserialize)]
struct ContentEntry {
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// Release (`GET /repos/{owner}/{repo}/releases/tags/{tag}`).
#[derive(Debug, Clone, Deserialize)]
struct ReleaseEntry {
    #[serde(default)]
    tag_name: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// A file found in a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Path of the file within the repository.
    pub path: String,

    /// Decoded file text.
    pub text: String,
}

/// Release notes of a published release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseNotes {
    /// Tag the release was published under.
    pub tag: String,

    /// Release body, trimmed.
    pub body: String,
}

/// Client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    config: GitHubConfig,
    http: reqwest::Client,
}

impl GitHubClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be created.
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_JSON));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| UpstreamError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self { config, http })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Returns the repository's default branch.
    ///
    /// `Ok(None)` when the repository cannot be read (missing, private,
    /// rate limited) or the field is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the API cannot be reached.
    pub async fn default_branch(&self, repo: &RepoId) -> Result<Option<String>> {
        let url = format!("{}/repos/{repo}", self.config.api_url);
        let metadata: Option<RepoMetadata> = self.get_json(&url, &[]).await?;
        Ok(metadata
            .and_then(|m| m.default_branch)
            .filter(|b| !b.is_empty()))
    }

    /// Fetches a file at `reference` (branch, tag or commit).
    ///
    /// Uses the entry's download URL when present and falls back to inline
    /// base64 content. `Ok(None)` when the file does not exist or cannot be
    /// decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the API cannot be reached.
    pub async fn fetch_file(
        &self,
        repo: &RepoId,
        path: &str,
        reference: &str,
    ) -> Result<Option<String>> {
        let url = format!("{}/repos/{repo}/contents/{path}", self.config.api_url);
        let Some(entry) = self
            .get_json::<ContentEntry>(&url, &[("ref", reference)])
            .await?
        else {
            return Ok(None);
        };

        if let Some(download_url) = entry.download_url.filter(|u| !u.is_empty()) {
            let response = self
                .http
                .get(&download_url)
                .send()
                .await
                .map_err(|e| UpstreamError::request(&download_url, e))?;
            if response.status() != StatusCode::OK {
                return Ok(None);
            }
            let text = response
                .text()
                .await
                .map_err(|e| UpstreamError::request(&download_url, e))?;
            return Ok(Some(text));
        }

        match (entry.content, entry.encoding.as_deref()) {
            (Some(content), Some("base64")) if !content.is_empty() => Ok(decode_base64(&content)),
            _ => Ok(None),
        }
    }

    /// Returns the first candidate path that exists at `reference`.
    ///
    /// A candidate whose request fails is treated as missing.
    pub async fn fetch_first_existing(
        &self,
        repo: &RepoId,
        paths: &[&str],
        reference: &str,
    ) -> Option<RemoteFile> {
        for path in paths {
            match self.fetch_file(repo, path, reference).await {
                Ok(Some(text)) => {
                    return Some(RemoteFile {
                        path: (*path).to_string(),
                        text,
                    })
                }
                Ok(None) => {}
                Err(e) => tracing::debug!(%repo, path, error = %e, "treating failed fetch as missing"),
            }
        }
        None
    }

    /// Returns the release notes for `version`, trying tag `v<version>` then
    /// `<version>`.
    ///
    /// Releases with an empty body are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the API cannot be reached.
    pub async fn release_notes(&self, repo: &RepoId, version: &str) -> Result<Option<ReleaseNotes>> {
        for tag in [format!("v{version}"), version.to_string()] {
            let url = format!("{}/repos/{repo}/releases/tags/{tag}", self.config.api_url);
            let Some(release) = self.get_json::<ReleaseEntry>(&url, &[]).await? else {
                continue;
            };

            let body = release.body.unwrap_or_default().trim().to_string();
            if body.is_empty() {
                continue;
            }

            let tag = release
                .tag_name
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or(tag);
            return Ok(Some(ReleaseNotes { tag, body }));
        }
        Ok(None)
    }

    /// Issues a GET and decodes the JSON body; `Ok(None)` on any status but 200.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| UpstreamError::request(url, e))?;

        if response.status() != StatusCode::OK {
            tracing::debug!(url, status = %response.status(), "GitHub API request not successful");
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::request(url, e))?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| UpstreamError::json(url, e))
    }
}

/// Decodes GitHub's line-wrapped base64, replacing invalid UTF-8.
fn decode_base64(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    match base64::engine::general_purpose::STANDARD.decode(compact) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(e) => {
            tracing::debug!(error = %e, "invalid base64 content");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GitHubClient::new(GitHubConfig::default().with_token(Some("abc")));
        assert!(client.is_ok());
    }

    #[test]
    fn test_decode_base64_wrapped() {
        // "# Hello\n" split across lines the way the contents API returns it.
        assert_eq!(decode_base64("IyBIZWxs\nbwo=\n").as_deref(), Some("# Hello\n"));
    }

    #[test]
    fn test_decode_base64_invalid() {
        assert!(decode_base64("not base64!").is_none());
    }

    #[test]
    fn test_decode_base64_lossy_utf8() {
        // 0xff is not valid UTF-8.
        assert_eq!(decode_base64("/w==").as_deref(), Some("\u{fffd}"));
    }
}
