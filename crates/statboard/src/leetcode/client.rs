//! LeetCode GraphQL client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;

use crate::entity::provider::Provider;
use crate::provider::{
    ApiRateLimiter, Profile, ProviderClient, ProviderError, RawContributions,
    Result as ProviderResult,
};
use crate::retry::with_transient_retry;

use super::convert::{to_profile, to_raw_stats};
use super::error::LeetCodeError;
use super::types::{DEFAULT_ENDPOINT, GraphQlEnvelope, MATCHED_USER_QUERY, MatchedUser};

/// Per-request HTTP timeout. The endpoint is unauthenticated and slow
/// under load; callers wrap fetches in their own end-to-end timeout too.
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Fallback retry hint when a 429 carries no Retry-After header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// LeetCode client implementing the [`ProviderClient`] trait.
///
/// Everything comes from a single GraphQL call: solved counts by
/// difficulty, profile ranking/reputation, the submission calendar and
/// the per-language histogram. There is no authentication.
#[derive(Clone)]
pub struct LeetCodeClient {
    http: reqwest::Client,
    endpoint: String,
    rate_limiter: Option<ApiRateLimiter>,
}

impl LeetCodeClient {
    /// Create a new client against the public endpoint.
    pub fn new(rate_limiter: Option<ApiRateLimiter>) -> Result<Self, LeetCodeError> {
        Self::with_endpoint(DEFAULT_ENDPOINT, rate_limiter)
    }

    /// Create a client against a custom endpoint (used by tests and
    /// self-hosted mirrors).
    pub fn with_endpoint(
        endpoint: &str,
        rate_limiter: Option<ApiRateLimiter>,
    ) -> Result<Self, LeetCodeError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent("statboard")
            .build()?;

        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            rate_limiter,
        })
    }

    /// The configured endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Wait for the rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    /// Run the matched-user query for a username.
    async fn fetch_matched_user(&self, username: &str) -> Result<MatchedUser, LeetCodeError> {
        self.wait_for_rate_limit().await;

        let body = serde_json::json!({
            "query": MATCHED_USER_QUERY,
            "variables": { "username": username },
        });

        let response = self.http.post(&self.endpoint).json(&body).send().await?;
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_seconds = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                Err(LeetCodeError::RateLimited {
                    retry_after_seconds,
                })
            }
            StatusCode::NOT_FOUND => Err(LeetCodeError::UserNotFound(username.to_string())),
            status if status.is_server_error() => Err(LeetCodeError::GraphQl(format!(
                "server error: {}",
                status
            ))),
            _ => {
                let envelope: GraphQlEnvelope = response
                    .json()
                    .await
                    .map_err(|e| LeetCodeError::Parse(e.to_string()))?;

                if let Some(user) = envelope.data.and_then(|data| data.matched_user) {
                    return Ok(user);
                }

                // A null matchedUser with errors mentioning the user is a
                // hard not-found; anything else is an upstream failure.
                if envelope.errors.is_empty()
                    || envelope
                        .errors
                        .iter()
                        .any(|e| e.message.to_lowercase().contains("not exist"))
                {
                    Err(LeetCodeError::UserNotFound(username.to_string()))
                } else {
                    let messages: Vec<&str> =
                        envelope.errors.iter().map(|e| e.message.as_str()).collect();
                    Err(LeetCodeError::GraphQl(messages.join("; ")))
                }
            }
        }
    }
}

#[async_trait]
impl ProviderClient for LeetCodeClient {
    fn provider(&self) -> Provider {
        Provider::LeetCode
    }

    async fn fetch_profile(&self, username: &str) -> ProviderResult<Profile> {
        let user = with_transient_retry(&format!("leetcode/{}", username), || async {
            self.fetch_matched_user(username)
                .await
                .map_err(ProviderError::from)
        })
        .await?;

        Ok(to_profile(&user))
    }

    async fn fetch_contributions(&self, username: &str) -> ProviderResult<RawContributions> {
        let user = with_transient_retry(&format!("leetcode/{}", username), || async {
            self.fetch_matched_user(username)
                .await
                .map_err(ProviderError::from)
        })
        .await?;

        let today = Utc::now().date_naive();
        Ok(RawContributions::LeetCode(to_raw_stats(&user, today)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leetcode_client_is_a_provider_client() {
        fn assert_provider_client<T: ProviderClient>() {}
        assert_provider_client::<LeetCodeClient>();
    }

    #[test]
    fn test_default_endpoint() {
        let client = LeetCodeClient::new(None).unwrap();
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_custom_endpoint() {
        let client = LeetCodeClient::with_endpoint("http://localhost:9999/graphql", None).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9999/graphql");
    }
}
