//! GitHub API data types.
//!
//! Field names follow the snake_case wire format. Optional fields decode a
//! missing key to `None` and serialize `None` by omitting the key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user row from `/search/users`.
///
/// Equality and hashing cover every field; favorites use [`UserSummary::id`]
/// as identity instead (see [`crate::search::Favorites`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// Envelope returned by the search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSearchResponse {
    pub total_count: u64,
    pub items: Vec<UserSummary>,
}

/// A user profile from `/users/{username}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetail {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
}

impl UserDetail {
    /// Name to show in headings: the display name when set, else the login.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.login)
    }
}

/// A repository from `/users/{username}/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub stargazers_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub updated_at: String,
}

impl Repository {
    /// Parse `updated_at` as an RFC 3339 timestamp.
    ///
    /// Returns `None` if GitHub sent something unexpected; the raw string is
    /// still available on the struct.
    pub fn updated_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.updated_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
