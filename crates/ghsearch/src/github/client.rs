//! GitHub REST client for the three read-only endpoints.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use url::Url;

use super::error::NetworkError;
use super::types::{Repository, UserDetail, UserSearchResponse, UserSummary};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpTransport, TransportError};

/// Default GitHub REST API host.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Default `User-Agent` header. GitHub rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("ghsearch/", env!("CARGO_PKG_VERSION"));

const ACCEPT: &str = "application/vnd.github+json";

/// GitHub API client.
///
/// Every call is fire-once: no retry, no caching, no timeout beyond the
/// transport's own default.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    user_agent: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl GitHubClient {
    /// Create a client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GitHubClient::new(DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT)?;
    /// let users = client.search_users("octo").await?;
    /// ```
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::with_defaults()?;
        Ok(Self::new_with_transport(
            base_url,
            user_agent,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        base_url: &str,
        user_agent: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search users by free-text query. Returns the first page of `items`.
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserSummary>, NetworkError> {
        let url = self.search_url(query)?;
        let response: UserSearchResponse = self.get(url).await?;
        tracing::debug!(
            query,
            total_count = response.total_count,
            returned = response.items.len(),
            "Search completed"
        );
        Ok(response.items)
    }

    /// Fetch a single user's profile.
    pub async fn get_user_detail(&self, username: &str) -> Result<UserDetail, NetworkError> {
        let url = self.user_url(username, "")?;
        self.get(url).await
    }

    /// Fetch a user's public repositories, most recently updated first.
    pub async fn get_user_repositories(
        &self,
        username: &str,
    ) -> Result<Vec<Repository>, NetworkError> {
        let url = self.user_url(username, "/repos?sort=updated")?;
        self.get(url).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, NetworkError> {
        Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            tracing::warn!(base_url = %self.base_url, path, error = %e, "Failed to build URL");
            NetworkError::InvalidUrl
        })
    }

    /// Build the search URL. Only the query parameter is percent-encoded.
    fn search_url(&self, query: &str) -> Result<Url, NetworkError> {
        let mut url = self.endpoint("/search/users")?;
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    /// Build a `/users/{username}{suffix}` URL.
    ///
    /// The username is interpolated as-is, so anything that cannot stand as a
    /// single path segment is rejected before any I/O happens.
    fn user_url(&self, username: &str, suffix: &str) -> Result<Url, NetworkError> {
        if !is_path_segment(username) {
            tracing::warn!(username, "Username cannot be used as a path segment");
            return Err(NetworkError::InvalidUrl);
        }
        self.endpoint(&format!("/users/{username}{suffix}"))
    }

    /// Issue a GET and classify the outcome.
    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, NetworkError> {
        let request = HttpRequest {
            url: url.to_string(),
            headers: vec![
                ("Accept".to_string(), ACCEPT.to_string()),
                ("User-Agent".to_string(), self.user_agent.clone()),
            ],
        };

        tracing::debug!(url = %request.url, "GET");

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Request failed");
            NetworkError::InvalidResponse
        })?;

        if !response.is_success() {
            let error = NetworkError::from_status(response.status);
            if error.is_rate_limited() {
                tracing::warn!(
                    url = %url,
                    ratelimit_remaining = ?response.header("x-ratelimit-remaining"),
                    ratelimit_reset = ?response.header("x-ratelimit-reset"),
                    "GitHub rate limit hit"
                );
            } else {
                tracing::debug!(url = %url, status = response.status, "Non-success status");
            }
            return Err(error);
        }

        if response.body.is_empty() {
            tracing::warn!(url = %url, status = response.status, "Empty response body");
            return Err(NetworkError::NoData);
        }

        serde_json::from_slice(&response.body).map_err(|e| {
            tracing::warn!(url = %url, error = %e, "Failed to decode response");
            NetworkError::DecodingError
        })
    }
}

fn is_path_segment(s: &str) -> bool {
    !s.is_empty()
        && s != "."
        && s != ".."
        && !s
            .chars()
            .any(|c| matches!(c, '/' | '?' | '#' | '\\') || c.is_whitespace() || c.is_control())
}
