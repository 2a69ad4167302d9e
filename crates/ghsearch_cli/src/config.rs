//! Configuration file support for ghsearch.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. Environment variables (prefixed with `GHSEARCH_`, e.g., `GHSEARCH_API__BASE_URL`)
//! 2. Local config file (./ghsearch.toml)
//! 3. XDG config file (~/.config/ghsearch/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [api]
//! base_url = "https://api.github.com"  # or a GitHub Enterprise API root
//! user_agent = "ghsearch/0.1.0"
//!
//! [search]
//! debounce_ms = 500
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use ghsearch::search::DEFAULT_DEBOUNCE;
use ghsearch::{DEFAULT_API_BASE_URL, DEFAULT_USER_AGENT};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// GitHub API configuration.
    pub api: ApiConfig,
    /// Search pipeline tunables.
    pub search: SearchConfig,
}

/// GitHub API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root. Trailing slashes are ignored.
    pub base_url: String,
    /// Value sent in the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Search pipeline tunables.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiet period, in milliseconds, before a typed query is fetched.
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/ghsearch/config.toml)
    /// 3. Local config file (./ghsearch.toml)
    /// 4. Environment variables with GHSEARCH_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let local_config = PathBuf::from("ghsearch.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./ghsearch.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // Keys contain underscores, so nesting uses a double underscore:
        // GHSEARCH_API__BASE_URL -> api.base_url
        builder = builder.add_source(
            Environment::with_prefix("GHSEARCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    /// Debounce quiet period as a duration.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "ghsearch").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
