//! Cache key builders.
//!
//! Keys are stable across process restarts: the distributed tier relies
//! on every process computing identical names for the same scope.

use uuid::Uuid;

use crate::ranking::{Dimension, Period};

/// Namespace prefix for cache entries in the distributed store.
pub const CACHE_PREFIX: &str = "statboard:cache:";

/// Namespace prefix for build-lock keys in the distributed store.
pub const LOCK_PREFIX: &str = "statboard:lock:";

/// The shared global activity feed.
pub const GLOBAL_FEED_KEY: &str = "global";

/// Key for one member's activity feed.
pub fn user_key(member_id: Uuid) -> String {
    format!("user:{}", member_id)
}

/// Key for one leaderboard page.
pub fn leaderboard_key(dimension: Dimension, period: Period) -> String {
    format!("leaderboard:{}:{}", dimension, period)
}

/// Every leaderboard key, for bulk invalidation after a material delta.
pub fn all_leaderboard_keys() -> Vec<String> {
    let mut keys = Vec::with_capacity(Dimension::ALL.len() * Period::ALL.len());
    for dimension in Dimension::ALL {
        for period in Period::ALL {
            keys.push(leaderboard_key(dimension, period));
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key() {
        let id = Uuid::nil();
        assert_eq!(
            user_key(id),
            "user:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_leaderboard_key() {
        assert_eq!(
            leaderboard_key(Dimension::Combined, Period::Weekly),
            "leaderboard:combined:weekly"
        );
        assert_eq!(
            leaderboard_key(Dimension::PullRequests, Period::AllTime),
            "leaderboard:pull_requests:all_time"
        );
    }

    #[test]
    fn test_all_leaderboard_keys_are_unique() {
        let keys = all_leaderboard_keys();
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
        assert_eq!(keys.len(), Dimension::ALL.len() * Period::ALL.len());
    }
}
