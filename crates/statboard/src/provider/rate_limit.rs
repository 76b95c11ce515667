use std::num::NonZeroU32;
use std::sync::Arc;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};

use crate::entity::provider::Provider;

use super::errors::Result;
use super::types::{Profile, ProviderClient, RawContributions};

/// Type alias for the governor rate limiter.
type GovernorRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Default request pacing per provider (requests per second).
pub mod rate_limits {
    /// GitHub: 5000 requests/hour authenticated; 5/sec leaves headroom
    /// for the GraphQL secondary limits.
    pub const GITHUB_DEFAULT_RPS: u32 = 5;
    /// LeetCode: unauthenticated GraphQL endpoint, throttle hard.
    pub const LEETCODE_DEFAULT_RPS: u32 = 2;
}

/// Get the default pacing for a provider.
pub fn default_rps_for_provider(provider: Provider) -> u32 {
    match provider {
        Provider::GitHub => rate_limits::GITHUB_DEFAULT_RPS,
        Provider::LeetCode => rate_limits::LEETCODE_DEFAULT_RPS,
    }
}

/// A standalone API rate limiter using the governor crate.
///
/// Paces outgoing requests proactively so the provider's limit is never
/// hit in the first place. Cloning shares the underlying limiter.
#[derive(Clone)]
pub struct ApiRateLimiter {
    inner: Arc<GovernorRateLimiter>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter with the specified requests per second.
    ///
    /// A zero argument is treated as 1 request per second.
    pub fn new(requests_per_second: u32) -> Self {
        let rps = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(1).unwrap());
        Self {
            inner: Arc::new(RateLimiter::direct(Quota::per_second(rps))),
        }
    }

    /// Wait until a request is allowed by the rate limiter.
    pub async fn wait(&self) {
        self.inner.until_ready().await;
    }
}

/// A rate-limited wrapper around any [`ProviderClient`].
///
/// All trait methods wait for the limiter before delegating to the inner
/// client, so callers get pacing without every call site remembering to
/// ask for it.
pub struct RateLimitedClient<C> {
    inner: C,
    rate_limiter: ApiRateLimiter,
}

impl<C> RateLimitedClient<C> {
    /// Wrap a client with the given requests-per-second pacing.
    pub fn new(inner: C, requests_per_second: u32) -> Self {
        Self {
            inner,
            rate_limiter: ApiRateLimiter::new(requests_per_second),
        }
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: Clone> Clone for RateLimitedClient<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            rate_limiter: self.rate_limiter.clone(),
        }
    }
}

#[async_trait]
impl<C: ProviderClient> ProviderClient for RateLimitedClient<C> {
    fn provider(&self) -> Provider {
        self.inner.provider()
    }

    async fn fetch_profile(&self, username: &str) -> Result<Profile> {
        self.rate_limiter.wait().await;
        self.inner.fetch_profile(username).await
    }

    async fn fetch_contributions(&self, username: &str) -> Result<RawContributions> {
        self.rate_limiter.wait().await;
        self.inner.fetch_contributions(username).await
    }
}
