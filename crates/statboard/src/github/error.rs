//! GitHub API error types.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that can occur when interacting with the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    #[error("Rate limit exceeded. Resets at {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("GitHub user not found: {0}")]
    UserNotFound(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Check if an octocrab error indicates a rate limit (403/429, or a JSON
/// parse error from the empty body GitHub returns when throttling).
pub fn is_rate_limit_error(e: &octocrab::Error) -> bool {
    match e {
        octocrab::Error::GitHub { source, .. } => {
            let status = source.status_code.as_u16();
            status == 403 || status == 429
        }
        octocrab::Error::Json { .. } => true,
        _ => false,
    }
}

/// Check if an octocrab error is a 404.
pub fn is_not_found_error(e: &octocrab::Error) -> bool {
    matches!(
        e,
        octocrab::Error::GitHub { source, .. } if source.status_code.as_u16() == 404
    )
}

/// Map an octocrab error for a request about `username` into a GitHubError.
pub fn map_api_error(username: &str, e: octocrab::Error) -> GitHubError {
    if is_not_found_error(&e) {
        GitHubError::UserNotFound(username.to_string())
    } else if is_rate_limit_error(&e) {
        // GitHub's core limit resets on the hour; without the header we
        // disclose a one-minute hint rather than nothing.
        GitHubError::RateLimited {
            reset_at: Utc::now() + chrono::Duration::seconds(60),
        }
    } else {
        GitHubError::Api(e)
    }
}

impl From<GitHubError> for ProviderError {
    fn from(err: GitHubError) -> Self {
        match err {
            GitHubError::RateLimited { reset_at } => {
                let retry_after_seconds = (reset_at - Utc::now()).num_seconds().max(1) as u64;
                ProviderError::RateLimited {
                    retry_after_seconds,
                }
            }
            GitHubError::UserNotFound(username) => ProviderError::not_found(username),
            GitHubError::GraphQl(message) => ProviderError::upstream(message),
            GitHubError::Api(e) => ProviderError::upstream(e.to_string()),
            GitHubError::Internal(message) => ProviderError::internal(message),
        }
    }
}
