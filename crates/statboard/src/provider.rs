//! Shared provider infrastructure: the client trait, the error taxonomy,
//! and proactive rate limiting.
//!
//! Provider-specific clients live in their own modules ([`crate::github`],
//! [`crate::leetcode`]); everything here is provider-agnostic.

mod errors;
mod rate_limit;
mod types;

pub use errors::{ProviderError, Result, short_error_message};
pub use rate_limit::{
    ApiRateLimiter, RateLimitedClient, default_rps_for_provider, rate_limits,
};
pub use types::{
    DailyCount, GitHubRawStats, LeetCodeRawStats, Profile, ProviderClient, RawContributions,
};
