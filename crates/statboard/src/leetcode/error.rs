//! LeetCode API error types.

use thiserror::Error;

use crate::provider::ProviderError;

/// Errors that can occur when interacting with the LeetCode GraphQL API.
#[derive(Debug, Error)]
pub enum LeetCodeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("LeetCode user not found: {0}")]
    UserNotFound(String),

    #[error("Rate limited. Retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Malformed response: {0}")]
    Parse(String),
}

impl From<LeetCodeError> for ProviderError {
    fn from(err: LeetCodeError) -> Self {
        match err {
            LeetCodeError::UserNotFound(username) => ProviderError::not_found(username),
            LeetCodeError::RateLimited {
                retry_after_seconds,
            } => ProviderError::RateLimited {
                retry_after_seconds,
            },
            LeetCodeError::Http(e) => {
                if e.is_timeout() || e.is_connect() {
                    ProviderError::network(e.to_string())
                } else {
                    ProviderError::upstream(e.to_string())
                }
            }
            LeetCodeError::GraphQl(message) => ProviderError::upstream(message),
            LeetCodeError::Parse(message) => ProviderError::upstream(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_not_found_maps_to_provider_not_found() {
        let err: ProviderError = LeetCodeError::UserNotFound("ghost".to_string()).into();
        assert!(matches!(err, ProviderError::NotFound { username } if username == "ghost"));
    }

    #[test]
    fn test_rate_limited_preserves_delay() {
        let err: ProviderError = LeetCodeError::RateLimited {
            retry_after_seconds: 45,
        }
        .into();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_seconds: 45
            }
        ));
    }

    #[test]
    fn test_graphql_and_parse_errors_are_soft() {
        let graphql: ProviderError = LeetCodeError::GraphQl("boom".to_string()).into();
        assert!(graphql.is_retryable());

        let parse: ProviderError = LeetCodeError::Parse("bad json".to_string()).into();
        assert!(parse.is_retryable());
    }
}
