//! OCI Distribution API client for tag listing.
//!
//! The first request is sent anonymously. A `401` answer is resolved once
//! through [`AuthClient`] and the resulting bearer token is reused for every
//! following page of the listing.

use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LINK, WWW_AUTHENTICATE};
use reqwest::{Response, StatusCode};
use url::Url;

use crate::auth::AuthClient;
use crate::config::RegistryConfig;
use crate::error::{excerpt, RegistryError};
use crate::oci::{next_link, TagList};
use crate::version::VersionSelector;

/// Source of repository tags.
#[async_trait]
pub trait TagSource: Send + Sync {
    /// Lists every tag of a repository, de-duplicated in first-seen order.
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError>;
}

/// Client for listing tags on an OCI-compatible registry.
#[derive(Debug)]
pub struct RegistryClient {
    config: RegistryConfig,
    base: Url,
    http: reqwest::Client,
    auth: AuthClient,
    version_selector: VersionSelector,
}

impl RegistryClient {
    /// Creates a new registry client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry URL is invalid or the HTTP client
    /// cannot be created.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bosun_registry::{RegistryClient, RegistryConfig};
    ///
    /// let client = RegistryClient::new(RegistryConfig::default())?;
    /// # Ok::<(), bosun_registry::RegistryError>(())
    /// ```
    pub fn new(config: RegistryConfig) -> Result<Self, RegistryError> {
        let base = Url::parse(&config.url).map_err(|_| RegistryError::InvalidUrl {
            url: config.url.clone(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| RegistryError::ConnectionFailed {
                url: config.url.clone(),
                source: e,
            })?;

        let auth = AuthClient::new(http.clone(), config.auth.clone());

        Ok(Self {
            config,
            base,
            http,
            auth,
            version_selector: VersionSelector::new(),
        })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Lists all tags of a repository.
    ///
    /// Follows `Link: <...>; rel="next"` pagination and removes duplicate
    /// tags, keeping the order in which they were first seen. A repository
    /// without tags yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AuthenticationRequired`] if the registry
    /// demands credentials and no token can be obtained, and
    /// [`RegistryError::ListingFailed`] / [`RegistryError::PaginationFailed`]
    /// for any other unsuccessful response.
    pub async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let url = self.config.tags_url(repository);
        let page_size = self.config.page_size.to_string();
        let query = [("n", page_size.as_str())];

        let mut headers = HeaderMap::new();
        let mut response = self.http.get(&url).query(&query).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();

            let token = self.auth.bearer_token(&challenge).await?.ok_or_else(|| {
                RegistryError::AuthenticationRequired {
                    repository: repository.to_string(),
                }
            })?;

            let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                RegistryError::AuthenticationRequired {
                    repository: repository.to_string(),
                }
            })?;
            headers.insert(AUTHORIZATION, value);

            tracing::debug!(repository, "retrying tag listing with bearer token");
            response = self
                .http
                .get(&url)
                .query(&query)
                .headers(headers.clone())
                .send()
                .await?;
        }

        if response.status() != StatusCode::OK {
            return Err(RegistryError::ListingFailed {
                repository: repository.to_string(),
                status: response.status().as_u16(),
                excerpt: excerpt(&response.text().await.unwrap_or_default()),
            });
        }

        let mut tags = Vec::new();
        let mut pages = 0usize;
        loop {
            pages += 1;
            let next = Self::next_page(&response);
            let body = response.text().await?;
            let page: TagList = serde_json::from_str(&body)?;
            tracing::debug!(repository, page = pages, count = page.tags.len(), "fetched tag page");
            tags.extend(page.tags);

            let Some(next) = next else {
                break;
            };
            let next_url = self.base.join(&next).map_err(|_| RegistryError::InvalidUrl {
                url: next.clone(),
            })?;

            response = self
                .http
                .get(next_url)
                .headers(headers.clone())
                .send()
                .await?;

            if response.status() != StatusCode::OK {
                return Err(RegistryError::PaginationFailed {
                    repository: repository.to_string(),
                    status: response.status().as_u16(),
                    excerpt: excerpt(&response.text().await.unwrap_or_default()),
                });
            }
        }

        let tags = dedup_in_order(tags);
        tracing::debug!(repository, pages, tags = tags.len(), "listed tags");
        Ok(tags)
    }

    /// Returns the tag holding the newest semantic version of a repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the tags cannot be listed.
    pub async fn latest_tag(&self, repository: &str) -> Result<Option<String>, RegistryError> {
        let tags = self.list_tags(repository).await?;
        Ok(self.version_selector.latest(&tags))
    }

    fn next_page(response: &Response) -> Option<String> {
        response
            .headers()
            .get_all(LINK)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(next_link)
            .map(ToString::to_string)
    }
}

#[async_trait]
impl TagSource for RegistryClient {
    async fn list_tags(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        Self::list_tags(self, repository).await
    }
}

/// Removes duplicates, keeping the first occurrence of each tag.
fn dedup_in_order(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tags.len());
    tags.into_iter().filter(|t| seen.insert(t.clone())).collect()
}
