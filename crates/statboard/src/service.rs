//! Cache-backed read services for activity feeds and leaderboards.
//!
//! Both services follow the same shape: serve from the tiered cache when
//! possible, otherwise rebuild under a single-flight build lock. Losers
//! of the lock race poll briefly for the winner's result and fall back
//! to an uncached rebuild, so a broken cache slows reads down but never
//! breaks them.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::cache::{TieredCache, keys};
use crate::entity::contribution_snapshot::Model as SnapshotModel;
use crate::entity::provider::Provider;
use crate::feed::{self, ActivityEntry};
use crate::ranking::{self, Dimension, Period, ProviderCounters, RankedEntry, SubjectStats};
use crate::store;

/// How long a build lock is held before it expires on its own.
const BUILD_LOCK_TTL: Duration = Duration::from_secs(30);

/// How many times a lock loser polls the cache for the winner's result.
const LOCK_WAIT_POLLS: u32 = 3;

/// Delay between lock-loser polls.
const LOCK_WAIT_INTERVAL: Duration = Duration::from_millis(150);

/// Errors from the read services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Database failure.
    #[error(transparent)]
    Store(#[from] store::StoreError),
}

/// Which feed to serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedScope {
    /// One member's own activity.
    Member(Uuid),
    /// The shared portal-wide feed.
    Global,
}

impl FeedScope {
    fn cache_key(&self) -> String {
        match self {
            FeedScope::Member(id) => keys::user_key(*id),
            FeedScope::Global => keys::GLOBAL_FEED_KEY.to_string(),
        }
    }
}

/// Extract ranking counters from a snapshot row.
fn counters_from_snapshot(snapshot: &SnapshotModel) -> ProviderCounters {
    ProviderCounters {
        commits: snapshot.commits,
        pull_requests: snapshot.pull_requests,
        issues: snapshot.issues,
        repositories: snapshot.repositories,
        contributions: snapshot.contributions,
        solved_easy: snapshot.solved_easy,
        solved_medium: snapshot.solved_medium,
        solved_hard: snapshot.solved_hard,
        daily: snapshot.daily_series(),
    }
}

/// Serve-or-rebuild with single-flight protection.
///
/// `build` runs at most once per lock window across processes; callers
/// that lose the race poll for the cached result before rebuilding
/// without caching.
async fn serve_cached<T, F, Fut>(
    cache: &TieredCache,
    key: &str,
    build: F,
) -> Result<Vec<T>, ServiceError>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<T>, ServiceError>>,
{
    if let Some(value) = cache.get(key).await
        && let Ok(parsed) = serde_json::from_value::<Vec<T>>(value)
    {
        return Ok(parsed);
    }

    if cache.try_acquire_build_lock(key, BUILD_LOCK_TTL).await {
        let built = build().await;
        if let Ok(entries) = &built
            && let Ok(payload) = serde_json::to_value(entries)
        {
            cache.set(key, &payload).await;
        }
        cache.release_build_lock(key).await;
        return built;
    }

    // Lost the build race: give the winner a moment, then serve its work
    for _ in 0..LOCK_WAIT_POLLS {
        tokio::time::sleep(LOCK_WAIT_INTERVAL).await;
        if let Some(value) = cache.get(key).await
            && let Ok(parsed) = serde_json::from_value::<Vec<T>>(value)
        {
            return Ok(parsed);
        }
    }

    // Winner is slow or gone; rebuild without caching
    build().await
}

/// Cache-backed activity feed reads.
pub struct ActivityService {
    db: DatabaseConnection,
    cache: Arc<TieredCache>,
}

impl ActivityService {
    /// Create a service over the shared store and cache.
    pub fn new(db: DatabaseConnection, cache: Arc<TieredCache>) -> Self {
        Self { db, cache }
    }

    /// Return the cached or freshly built activity feed for a scope.
    pub async fn activities(
        &self,
        scope: FeedScope,
        limit: usize,
    ) -> Result<Vec<ActivityEntry>, ServiceError> {
        let key = scope.cache_key();
        let mut entries = serve_cached(&self.cache, &key, || self.build(scope)).await?;
        entries.truncate(limit);
        Ok(entries)
    }

    async fn build(&self, scope: FeedScope) -> Result<Vec<ActivityEntry>, ServiceError> {
        match scope {
            FeedScope::Member(member_id) => {
                let Some(member) = store::members::find_by_id(&self.db, member_id).await? else {
                    return Ok(Vec::new());
                };
                Ok(feed::build_global(vec![
                    self.member_entries(&member).await?,
                ]))
            }
            FeedScope::Global => {
                let members = store::members::list_syncable(&self.db).await?;
                let mut per_member = Vec::with_capacity(members.len());
                for member in &members {
                    per_member.push(self.member_entries(member).await?);
                }
                Ok(feed::build_global(per_member))
            }
        }
    }

    async fn member_entries(
        &self,
        member: &crate::entity::member::Model,
    ) -> Result<Vec<ActivityEntry>, ServiceError> {
        let mut entries = Vec::new();
        for provider in Provider::ALL {
            let (current, previous) =
                store::snapshots::find_latest_pair(&self.db, member.id, provider).await?;
            if let Some(current) = current {
                entries.extend(feed::entries_from_snapshots(
                    member,
                    &current,
                    previous.as_ref(),
                ));
            }
        }
        Ok(entries)
    }
}

/// Cache-backed leaderboard reads.
pub struct LeaderboardService {
    db: DatabaseConnection,
    cache: Arc<TieredCache>,
}

impl LeaderboardService {
    /// Create a service over the shared store and cache.
    pub fn new(db: DatabaseConnection, cache: Arc<TieredCache>) -> Self {
        Self { db, cache }
    }

    /// Return the cached or freshly built leaderboard for a dimension and
    /// period.
    pub async fn leaderboard(
        &self,
        dimension: Dimension,
        period: Period,
    ) -> Result<Vec<RankedEntry>, ServiceError> {
        let key = keys::leaderboard_key(dimension, period);
        serve_cached(&self.cache, &key, || self.build(dimension, period)).await
    }

    /// Assemble the full stat set from current snapshots.
    pub async fn subject_stats(&self) -> Result<Vec<SubjectStats>, ServiceError> {
        let members = store::members::list_all(&self.db).await?;
        let mut github = store::snapshots::find_current_for_all(&self.db, Provider::GitHub).await?;
        let mut leetcode =
            store::snapshots::find_current_for_all(&self.db, Provider::LeetCode).await?;

        Ok(members
            .into_iter()
            .map(|member| {
                let github_counters = take_counters(&mut github, member.id);
                let leetcode_counters = take_counters(&mut leetcode, member.id);
                SubjectStats {
                    member_id: member.id,
                    handle: member.handle,
                    github: github_counters,
                    leetcode: leetcode_counters,
                    experience: member.experience,
                    streak: member.streak,
                }
            })
            .collect())
    }

    async fn build(
        &self,
        dimension: Dimension,
        period: Period,
    ) -> Result<Vec<RankedEntry>, ServiceError> {
        let subjects = self.subject_stats().await?;
        let today = Utc::now().date_naive();
        Ok(ranking::rank(&subjects, dimension, period, today))
    }
}

fn take_counters(
    snapshots: &mut HashMap<Uuid, SnapshotModel>,
    member_id: Uuid,
) -> Option<ProviderCounters> {
    snapshots
        .remove(&member_id)
        .map(|snapshot| counters_from_snapshot(&snapshot))
}
