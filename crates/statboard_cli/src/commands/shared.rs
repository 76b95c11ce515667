//! Shared command plumbing: database connection and provider wiring.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use statboard::provider::{ApiRateLimiter, ProviderClient};
use statboard::{TieredCache, connect_and_migrate};

use crate::config::Config;

pub(crate) type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Connect to the configured database, running migrations.
pub(crate) async fn connect_db(config: &Config) -> Result<DatabaseConnection, Box<dyn std::error::Error>> {
    let url = config
        .database_url()
        .ok_or("no database URL configured and no state directory available")?;

    if url.starts_with("sqlite://")
        && let Some(state_dir) = Config::default_state_dir()
    {
        // First run: the state directory may not exist yet
        std::fs::create_dir_all(&state_dir).ok();
    }

    Ok(connect_and_migrate(&url).await?)
}

/// Connect the tiered cache from configuration.
pub(crate) async fn connect_cache(config: &Config) -> Arc<TieredCache> {
    Arc::new(TieredCache::connect(&config.cache_config()).await)
}

/// Build the configured provider clients.
///
/// GitHub needs a token; without one the client is skipped with a
/// warning so LeetCode-only setups still work.
pub(crate) fn build_clients(config: &Config) -> Result<Vec<Arc<dyn ProviderClient>>, Box<dyn std::error::Error>> {
    let mut clients: Vec<Arc<dyn ProviderClient>> = Vec::new();

    match &config.github.token {
        Some(token) => {
            let limiter = ApiRateLimiter::new(config.sync.github_rps);
            let client = statboard::github::GitHubClient::new(token, Some(limiter))?;
            clients.push(Arc::new(client));
        }
        None => {
            tracing::warn!("no GitHub token configured; GitHub syncs will be skipped");
        }
    }

    let limiter = ApiRateLimiter::new(config.sync.leetcode_rps);
    let leetcode = match &config.leetcode.endpoint {
        Some(endpoint) => {
            statboard::leetcode::LeetCodeClient::with_endpoint(endpoint, Some(limiter))?
        }
        None => statboard::leetcode::LeetCodeClient::new(Some(limiter))?,
    };
    clients.push(Arc::new(leetcode));

    Ok(clients)
}
