//! GitHub API client: REST profile plus GraphQL contribution collection.

use std::sync::Arc;

use async_trait::async_trait;
use octocrab::Octocrab;

use crate::entity::provider::Provider;
use crate::provider::{
    ApiRateLimiter, Profile, ProviderClient, ProviderError, RawContributions,
    Result as ProviderResult,
};
use crate::retry::with_transient_retry;

use super::convert::{approximate_from_events, to_profile, to_raw_stats};
use super::error::{GitHubError, map_api_error};
use super::types::{CONTRIBUTIONS_QUERY, GraphQlEnvelope, GraphQlUser, RestEvent};

/// Create an authenticated Octocrab instance from a GitHub token.
pub fn create_client(token: &str) -> Result<Octocrab, GitHubError> {
    Octocrab::builder()
        .personal_token(token.to_string())
        .build()
        .map_err(GitHubError::Api)
}

/// GitHub client implementing the [`ProviderClient`] trait.
///
/// Combines a REST call for the profile with a GraphQL call for the
/// contribution calendar and collection totals. When GraphQL fails the
/// client degrades to REST-derived approximations rather than failing
/// the whole fetch.
#[derive(Clone)]
pub struct GitHubClient {
    inner: Arc<Octocrab>,
    /// Optional proactive rate limiter shared across call sites.
    rate_limiter: Option<ApiRateLimiter>,
}

impl GitHubClient {
    /// Create a new GitHub client from an authentication token.
    pub fn new(token: &str, rate_limiter: Option<ApiRateLimiter>) -> Result<Self, GitHubError> {
        let client = create_client(token)?;
        Ok(Self {
            inner: Arc::new(client),
            rate_limiter,
        })
    }

    /// Create a GitHub client from an existing Octocrab instance.
    pub fn from_octocrab(client: Octocrab, rate_limiter: Option<ApiRateLimiter>) -> Self {
        Self {
            inner: Arc::new(client),
            rate_limiter,
        }
    }

    /// Wait for the rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    /// Fetch the REST profile payload for a user.
    async fn rest_profile(&self, username: &str) -> Result<serde_json::Value, GitHubError> {
        self.wait_for_rate_limit().await;

        self.inner
            .get(format!("/users/{}", username), None::<&()>)
            .await
            .map_err(|e| map_api_error(username, e))
    }

    /// Fetch one page of the user's public events for the approximation
    /// fallback.
    async fn rest_events(&self, username: &str) -> Result<Vec<RestEvent>, GitHubError> {
        self.wait_for_rate_limit().await;

        self.inner
            .get(
                format!("/users/{}/events/public?per_page=100", username),
                None::<&()>,
            )
            .await
            .map_err(|e| map_api_error(username, e))
    }

    /// Run the contributions GraphQL query for a user.
    async fn graphql_contributions(&self, username: &str) -> Result<GraphQlUser, GitHubError> {
        self.wait_for_rate_limit().await;

        let payload = serde_json::json!({
            "query": CONTRIBUTIONS_QUERY,
            "variables": { "login": username },
        });

        let envelope: GraphQlEnvelope = self
            .inner
            .graphql(&payload)
            .await
            .map_err(|e| map_api_error(username, e))?;

        if let Some(error) = envelope
            .errors
            .iter()
            .find(|e| e.error_type.as_deref() == Some("NOT_FOUND"))
        {
            tracing::debug!("GraphQL NOT_FOUND for {}: {}", username, error.message);
            return Err(GitHubError::UserNotFound(username.to_string()));
        }

        if !envelope.errors.is_empty() {
            let messages: Vec<&str> = envelope.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(GitHubError::GraphQl(messages.join("; ")));
        }

        envelope
            .data
            .and_then(|data| data.user)
            .ok_or_else(|| GitHubError::UserNotFound(username.to_string()))
    }
}

#[async_trait]
impl ProviderClient for GitHubClient {
    fn provider(&self) -> Provider {
        Provider::GitHub
    }

    async fn fetch_profile(&self, username: &str) -> ProviderResult<Profile> {
        let raw = with_transient_retry(&format!("github/{}", username), || async {
            self.rest_profile(username)
                .await
                .map_err(ProviderError::from)
        })
        .await?;

        Ok(to_profile(username, &raw))
    }

    async fn fetch_contributions(&self, username: &str) -> ProviderResult<RawContributions> {
        // The REST profile is the authority on whether the user exists;
        // a 404 here is a hard failure.
        let profile_raw = with_transient_retry(&format!("github/{}", username), || async {
            self.rest_profile(username)
                .await
                .map_err(ProviderError::from)
        })
        .await?;
        let profile = to_profile(username, &profile_raw);

        match self.graphql_contributions(username).await {
            Ok(user) => Ok(RawContributions::GitHub(to_raw_stats(&user))),
            Err(GitHubError::RateLimited { reset_at }) => {
                Err(GitHubError::RateLimited { reset_at }.into())
            }
            Err(e) => {
                // GraphQL outages must not fail the sync; approximate
                // from the events feed instead.
                tracing::warn!(
                    "GraphQL contributions failed for {}, using REST approximation: {}",
                    username,
                    e
                );
                let events = match self.rest_events(username).await {
                    Ok(events) => events,
                    Err(events_err) => {
                        tracing::debug!("events fallback failed for {}: {}", username, events_err);
                        Vec::new()
                    }
                };
                Ok(RawContributions::GitHub(approximate_from_events(
                    &profile, &events,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_client_is_a_provider_client() {
        fn assert_provider_client<T: ProviderClient>() {}
        assert_provider_client::<GitHubClient>();
    }

    #[tokio::test]
    async fn test_create_client_with_token() {
        let client = create_client("ghp_dummy_token_for_construction");
        assert!(client.is_ok());
    }
}
