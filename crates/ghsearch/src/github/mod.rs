//! GitHub REST API client.
//!
//! # Module Structure
//!
//! - [`error`] - The closed set of request failures and their user-facing messages
//! - [`types`] - Wire types for users, profiles and repositories
//! - [`client`] - URL construction, request issuing and outcome classification

mod client;
mod error;
mod types;

pub use client::{DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT, GitHubClient};
pub use error::NetworkError;
pub use types::{Repository, UserDetail, UserSearchResponse, UserSummary};
