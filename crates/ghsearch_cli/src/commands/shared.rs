use ghsearch::{GitHubClient, SearchOptions, TransportError};

use crate::config::Config;

/// Build a GitHub client from the `[api]` configuration.
pub(crate) fn build_client(config: &Config) -> Result<GitHubClient, TransportError> {
    tracing::debug!(base_url = %config.api.base_url, "Creating GitHub client");
    GitHubClient::new(&config.api.base_url, &config.api.user_agent)
}

pub(crate) fn search_options(config: &Config) -> SearchOptions {
    SearchOptions {
        debounce: config.debounce(),
    }
}
