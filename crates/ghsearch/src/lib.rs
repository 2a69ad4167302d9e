//! ghsearch - Search GitHub users, keep favorites, and browse profiles.
//!
//! This library wraps three read-only GitHub REST endpoints and the state
//! logic built on top of them:
//!
//! - [`github`] - The API client and its closed [`NetworkError`] set
//! - [`search`] - A debounced search pipeline with a favorites filter
//! - [`profile`] - A loader for a user's detail and repositories
//!
//! # Example
//!
//! ```ignore
//! use ghsearch::{GitHubClient, SearchPipeline, DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT};
//!
//! let client = GitHubClient::new(DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT)?;
//! let pipeline = SearchPipeline::spawn(client);
//!
//! pipeline.set_query("octo");
//! let mut rx = pipeline.subscribe();
//! let snapshot = rx.wait_for(|s| s.has_searched() && !s.is_loading()).await?.clone();
//! ```

pub mod github;
pub mod http;
pub mod profile;
pub mod search;

pub use github::{
    DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT, GitHubClient, NetworkError, Repository, UserDetail,
    UserSearchResponse, UserSummary,
};
pub use http::{HttpTransport, TransportError};
pub use profile::{LoadState, ProfileLoader, ProfileSnapshot, REPOSITORIES_ERROR_MESSAGE};
pub use search::{DisplayState, Favorites, SearchOptions, SearchPipeline, SearchSnapshot};
