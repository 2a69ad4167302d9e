//! GitHub API error types.

use thiserror::Error;

/// Errors that can occur when talking to the GitHub REST API.
///
/// This is a closed set: transport failures and malformed responses are not
/// distinguished below the response layer. The `Display` text of each variant
/// is the message shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Invalid URL")]
    InvalidUrl,

    #[error("Invalid response from server")]
    InvalidResponse,

    #[error("HTTP error: {0}")]
    HttpError(u16),

    #[error("Error decoding data")]
    DecodingError,

    #[error("No data received")]
    NoData,

    #[error("GitHub API rate limit exceeded. Please try again later.")]
    RateLimitExceeded,
}

impl NetworkError {
    /// Classify a non-2xx status code.
    pub fn from_status(status: u16) -> Self {
        if status == 403 {
            Self::RateLimitExceeded
        } else {
            Self::HttpError(status)
        }
    }

    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded)
    }
}
