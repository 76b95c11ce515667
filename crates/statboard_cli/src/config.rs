//! Configuration file support for the statboard CLI.
//!
//! Configuration is loaded with the following precedence (highest to
//! lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `STATBOARD_`, e.g.
//!    `STATBOARD_DATABASE_URL`)
//! 3. Config file (~/.config/statboard/config.toml or ./statboard.toml)
//! 4. Built-in defaults
//!
//! The database URL defaults to the XDG state directory
//! (`sqlite://~/.local/state/statboard/statboard.db` on Linux) if not
//! explicitly configured.
//!
//! Example config file:
//! ```toml
//! [database]
//! url = "postgres://localhost/statboard"
//!
//! [github]
//! token = "ghp_..."  # or use STATBOARD_GITHUB_TOKEN env var
//!
//! [cache]
//! redis_url = "redis://localhost:6379"
//! local_ttl_secs = 120
//! remote_ttl_secs = 600
//!
//! [sync]
//! github_rps = 5
//! leetcode_rps = 2
//! ```

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;

use statboard::CacheConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// GitHub configuration.
    pub github: GitHubConfig,
    /// LeetCode configuration.
    pub leetcode: LeetCodeConfig,
    /// Cache configuration.
    pub cache: CacheSettings,
    /// Sync pacing configuration.
    pub sync: SyncSettings,
}

/// Database configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL; sqlite:// and postgres:// are supported.
    pub url: Option<String>,
}

/// GitHub configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token.
    /// Can also be set via STATBOARD_GITHUB_TOKEN environment variable.
    pub token: Option<String>,
}

/// LeetCode configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeetCodeConfig {
    /// Override the GraphQL endpoint; defaults to the public one.
    pub endpoint: Option<String>,
}

/// Cache configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Redis connection URL; unset disables the distributed tier.
    pub redis_url: Option<String>,
    /// Process-local tier TTL in seconds.
    pub local_ttl_secs: u64,
    /// Distributed tier TTL in seconds.
    pub remote_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            redis_url: None,
            local_ttl_secs: defaults.local_ttl.as_secs(),
            remote_ttl_secs: defaults.remote_ttl.as_secs(),
        }
    }
}

/// Sync pacing configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// GitHub request pacing in requests per second.
    pub github_rps: u32,
    /// LeetCode request pacing in requests per second.
    pub leetcode_rps: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            github_rps: statboard::rate_limits::GITHUB_DEFAULT_RPS,
            leetcode_rps: statboard::rate_limits::LEETCODE_DEFAULT_RPS,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/statboard/config.toml)
    /// 3. Local config file (./statboard.toml)
    /// 4. Environment variables with STATBOARD_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(proj_dirs) = ProjectDirs::from("", "", "statboard") {
            let xdg_config = proj_dirs.config_dir().join("config.toml");
            if xdg_config.exists() {
                tracing::debug!("Loading config from {:?}", xdg_config);
                builder = builder.add_source(
                    File::from(xdg_config)
                        .format(FileFormat::Toml)
                        .required(false),
                );
            }
        }

        let local_config = PathBuf::from("statboard.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./statboard.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // e.g. STATBOARD_DATABASE_URL -> database.url
        builder = builder.add_source(
            Environment::with_prefix("STATBOARD")
                .separator("_")
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

    /// Get the database URL, falling back to the default state directory
    /// path. `mode=rwc` creates the file on first use.
    pub fn database_url(&self) -> Option<String> {
        self.database.url.clone().or_else(|| {
            Self::default_state_dir().map(|state_dir| {
                let db_path = state_dir.join("statboard.db");
                format!("sqlite://{}?mode=rwc", db_path.display())
            })
        })
    }

    /// The cache layer configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            redis_url: self.cache.redis_url.clone(),
            local_ttl: Duration::from_secs(self.cache.local_ttl_secs),
            remote_ttl: Duration::from_secs(self.cache.remote_ttl_secs),
        }
    }

    /// Get the default state directory path.
    ///
    /// On Linux this is `$XDG_STATE_HOME/statboard` or
    /// `~/.local/state/statboard`; macOS/Windows fall back to the data
    /// directory.
    pub fn default_state_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "statboard").map(|dirs| {
            dirs.state_dir()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| dirs.data_dir().to_path_buf())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.database.url.is_none());
        assert!(config.github.token.is_none());
        assert!(config.cache.redis_url.is_none());
        assert_eq!(config.sync.github_rps, statboard::rate_limits::GITHUB_DEFAULT_RPS);
    }

    #[test]
    fn test_cache_config_conversion() {
        let mut config = Config::default();
        config.cache.redis_url = Some("redis://localhost".to_string());
        config.cache.local_ttl_secs = 30;

        let cache_config = config.cache_config();
        assert_eq!(cache_config.redis_url.as_deref(), Some("redis://localhost"));
        assert_eq!(cache_config.local_ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_database_url_default_is_sqlite() {
        let config = Config::default();
        if let Some(url) = config.database_url() {
            assert!(url.starts_with("sqlite://"));
            assert!(url.ends_with("mode=rwc"));
        }
    }
}
