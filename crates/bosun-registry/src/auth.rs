//! Registry token exchange.
//!
//! When a registry answers `401` it names a token endpoint in its
//! `WWW-Authenticate` header:
//!
//! ```text
//! Bearer realm="https://ghcr.io/token",service="ghcr.io",scope="repository:foo/bar:pull"
//! ```
//!
//! [`AuthClient`] trades that challenge for a bearer token, presenting basic
//! credentials when they are configured.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;

use crate::config::RegistryAuth;
use crate::error::RegistryError;
use crate::oci::TokenResponse;

static CHALLENGE_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+)="([^"]+)""#).expect("valid challenge pattern"));

/// Parameters of a `WWW-Authenticate` bearer challenge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Challenge {
    /// Token endpoint URL.
    pub realm: Option<String>,

    /// Service the token is requested for.
    pub service: Option<String>,

    /// Requested access scope.
    pub scope: Option<String>,
}

impl Challenge {
    /// Parses the `key="value"` pairs of a challenge header.
    ///
    /// Order does not matter and unknown keys are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use bosun_registry::Challenge;
    ///
    /// let challenge = Challenge::parse(
    ///     r#"Bearer scope="repository:foo/bar:pull",realm="https://ghcr.io/token""#,
    /// );
    /// assert_eq!(challenge.realm.as_deref(), Some("https://ghcr.io/token"));
    /// assert_eq!(challenge.scope.as_deref(), Some("repository:foo/bar:pull"));
    /// assert!(challenge.service.is_none());
    /// ```
    #[must_use]
    pub fn parse(header: &str) -> Self {
        let mut challenge = Self::default();

        for caps in CHALLENGE_PARAM.captures_iter(header) {
            let value = caps[2].to_string();
            match &caps[1] {
                "realm" => challenge.realm = Some(value),
                "service" => challenge.service = Some(value),
                "scope" => challenge.scope = Some(value),
                _ => {}
            }
        }

        challenge
    }

    /// Returns the query parameters for the token request.
    fn query(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::with_capacity(2);
        if let Some(service) = &self.service {
            params.push(("service", service.as_str()));
        }
        if let Some(scope) = &self.scope {
            params.push(("scope", scope.as_str()));
        }
        params
    }
}

/// Client that exchanges registry challenges for bearer tokens.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    auth: RegistryAuth,
}

impl AuthClient {
    /// Creates an auth client sharing the given HTTP client.
    #[must_use]
    pub const fn new(http: reqwest::Client, auth: RegistryAuth) -> Self {
        Self { http, auth }
    }

    /// Obtains a bearer token for a challenge header.
    ///
    /// Returns `Ok(None)` when the challenge has no realm or the token
    /// endpoint does not answer `200`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token endpoint cannot be reached or its body
    /// is not JSON.
    pub async fn bearer_token(&self, header: &str) -> Result<Option<String>, RegistryError> {
        let challenge = Challenge::parse(header);
        let Some(realm) = challenge.realm.as_deref() else {
            tracing::debug!(header, "challenge has no realm");
            return Ok(None);
        };

        let mut request = self.http.get(realm).query(&challenge.query());
        if let RegistryAuth::Basic { username, password } = &self.auth {
            request = request.basic_auth(username, Some(password));
        }

        let response = request.send().await?;
        if response.status() != StatusCode::OK {
            tracing::debug!(realm, status = %response.status(), "token request refused");
            return Ok(None);
        }

        let body = response.text().await?;
        let token: TokenResponse = serde_json::from_str(&body)?;
        Ok(token.into_token())
    }
}
