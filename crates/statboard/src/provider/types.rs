use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::provider::Provider;

use super::errors::Result;

/// A provider-reported user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Login/username on the provider.
    pub username: String,
    /// Display name, if set.
    pub display_name: Option<String>,
    /// Avatar URL, if exposed.
    pub avatar_url: Option<String>,
    /// Follower count.
    pub followers: i64,
    /// Public repository count (GitHub) or zero.
    pub public_repos: i64,
}

/// One day of contribution activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    /// Calendar date.
    pub date: NaiveDate,
    /// Contributions/submissions on that date.
    pub count: i64,
}

/// Raw GitHub contribution payload, as assembled by the GitHub client.
///
/// Counters are unvalidated provider output: the normalizer clamps
/// negatives and fills gaps, clients just report what the API said.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubRawStats {
    /// Commit contributions this year.
    pub commits: i64,
    /// Pull requests opened.
    pub pull_requests: i64,
    /// Issues opened.
    pub issues: i64,
    /// Public repositories owned.
    pub repositories: i64,
    /// Follower count.
    pub followers: i64,
    /// Total contributions from the contribution calendar.
    pub contributions: i64,
    /// Language name -> percentage map; may contain malformed keys.
    pub language_histogram: serde_json::Value,
    /// Dense daily contribution series.
    pub calendar: Vec<DailyCount>,
    /// Whether the GraphQL path failed and these counters came from the
    /// REST approximation fallback.
    pub approximated: bool,
}

/// Raw LeetCode contribution payload, as assembled by the LeetCode client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeetCodeRawStats {
    /// Accepted problems, easy difficulty.
    pub solved_easy: i64,
    /// Accepted problems, medium difficulty.
    pub solved_medium: i64,
    /// Accepted problems, hard difficulty.
    pub solved_hard: i64,
    /// Total accepted submissions.
    pub total_solved: i64,
    /// Global ranking, if exposed.
    pub ranking: Option<i64>,
    /// Reputation, if exposed.
    pub reputation: Option<i64>,
    /// Language name -> solved-problem count map.
    pub language_histogram: serde_json::Value,
    /// Dense daily submission series, expanded from the provider's sparse
    /// calendar before it leaves the client.
    pub calendar: Vec<DailyCount>,
}

/// Tagged union of raw provider payloads.
///
/// This is the boundary type between provider clients and the stat
/// normalizer; raw payload shapes never travel further than this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RawContributions {
    /// GitHub REST + GraphQL payload.
    GitHub(GitHubRawStats),
    /// LeetCode GraphQL payload.
    LeetCode(LeetCodeRawStats),
}

impl RawContributions {
    /// The provider this payload came from.
    pub fn provider(&self) -> Provider {
        match self {
            RawContributions::GitHub(_) => Provider::GitHub,
            RawContributions::LeetCode(_) => Provider::LeetCode,
        }
    }
}

/// Trait for contribution-data provider clients.
///
/// # Implementation Notes
///
/// Implementors should:
/// - Distinguish hard failures (`NotFound`) from soft ones
///   (`RateLimited`/`Upstream`) so callers can decide whether to retry
/// - Pace requests through the shared rate limiter when one is configured
/// - Bound every HTTP call with a timeout; callers add their own
///   end-to-end timeout on top
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// The provider this client talks to.
    fn provider(&self) -> Provider;

    /// Fetch a user's profile.
    ///
    /// Used for username validation at registration time; contribution
    /// syncs go through [`fetch_contributions`](Self::fetch_contributions).
    async fn fetch_profile(&self, username: &str) -> Result<Profile>;

    /// Fetch a user's full contribution payload.
    async fn fetch_contributions(&self, username: &str) -> Result<RawContributions>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_contributions_provider_tag() {
        let github = RawContributions::GitHub(GitHubRawStats::default());
        assert_eq!(github.provider(), Provider::GitHub);

        let leetcode = RawContributions::LeetCode(LeetCodeRawStats::default());
        assert_eq!(leetcode.provider(), Provider::LeetCode);
    }
}
