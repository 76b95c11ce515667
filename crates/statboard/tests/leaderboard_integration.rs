//! Integration tests for the leaderboard and activity services against a
//! real (in-memory) database and the process-local cache tier.

#![cfg(all(feature = "migrate", feature = "github", feature = "leetcode"))]

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use statboard::cache::{CacheConfig, TieredCache};
use statboard::entity::provider::Provider;
use statboard::normalize::normalize;
use statboard::provider::{GitHubRawStats, LeetCodeRawStats, RawContributions};
use statboard::ranking::{Dimension, Period};
use statboard::service::{ActivityService, FeedScope, LeaderboardService};
use statboard::store;

use common::{insert_member, setup_db};

async fn seed_github_snapshot(
    db: &DatabaseConnection,
    member_id: Uuid,
    commits: i64,
    pull_requests: i64,
    issues: i64,
    repositories: i64,
    captured_at: chrono::DateTime<Utc>,
) {
    let raw = RawContributions::GitHub(GitHubRawStats {
        commits,
        pull_requests,
        issues,
        repositories,
        contributions: commits + pull_requests + issues,
        ..GitHubRawStats::default()
    });
    store::snapshots::insert(db, normalize(&raw).into_active_model(member_id, captured_at))
        .await
        .expect("snapshot should insert");
}

async fn seed_leetcode_snapshot(
    db: &DatabaseConnection,
    member_id: Uuid,
    easy: i64,
    medium: i64,
    hard: i64,
    captured_at: chrono::DateTime<Utc>,
) {
    let raw = RawContributions::LeetCode(LeetCodeRawStats {
        solved_easy: easy,
        solved_medium: medium,
        solved_hard: hard,
        total_solved: easy + medium + hard,
        ..LeetCodeRawStats::default()
    });
    store::snapshots::insert(db, normalize(&raw).into_active_model(member_id, captured_at))
        .await
        .expect("snapshot should insert");
}

fn services(db: &DatabaseConnection) -> (LeaderboardService, ActivityService, Arc<TieredCache>) {
    let cache = Arc::new(TieredCache::local_only(&CacheConfig::default()));
    (
        LeaderboardService::new(db.clone(), Arc::clone(&cache)),
        ActivityService::new(db.clone(), Arc::clone(&cache)),
        cache,
    )
}

#[tokio::test]
async fn leaderboard_applies_exact_point_formulas() {
    let db = setup_db().await;
    let now = Utc::now();

    let alice = insert_member(&db, "alice", Some("alice-gh"), Some("alice-lc")).await;
    seed_github_snapshot(&db, alice.id, 10, 2, 1, 1, now).await;
    seed_leetcode_snapshot(&db, alice.id, 5, 2, 1, now).await;

    let (leaderboards, _activities, _cache) = services(&db);

    let github = leaderboards
        .leaderboard(Dimension::GitHub, Period::AllTime)
        .await
        .unwrap();
    assert_eq!(github[0].value, 25);

    let leetcode = leaderboards
        .leaderboard(Dimension::LeetCode, Period::AllTime)
        .await
        .unwrap();
    assert_eq!(leetcode[0].value, 24);

    let combined = leaderboards
        .leaderboard(Dimension::Combined, Period::AllTime)
        .await
        .unwrap();
    assert_eq!(combined[0].value, 49);
    assert_eq!(combined[0].points, 49);
}

#[tokio::test]
async fn leaderboard_ranks_descending_and_retains_statless_members() {
    let db = setup_db().await;
    let now = Utc::now();

    let alice = insert_member(&db, "alice", Some("alice-gh"), None).await;
    let bob = insert_member(&db, "bob", Some("bob-gh"), None).await;
    let carol = insert_member(&db, "carol", None, None).await;

    seed_github_snapshot(&db, alice.id, 5, 0, 0, 0, now).await;
    seed_github_snapshot(&db, bob.id, 20, 0, 0, 0, now).await;

    let (leaderboards, _activities, _cache) = services(&db);
    let ranked = leaderboards
        .leaderboard(Dimension::Commits, Period::AllTime)
        .await
        .unwrap();

    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[0].member_id, bob.id);
    assert_eq!(ranked[0].rank, Some(1));
    assert_eq!(ranked[1].member_id, alice.id);
    assert_eq!(ranked[1].rank, Some(2));
    // No stats: retained for profile views, never ranked
    assert_eq!(ranked[2].member_id, carol.id);
    assert_eq!(ranked[2].rank, None);
}

#[tokio::test]
async fn leaderboard_is_deterministic_across_calls() {
    let db = setup_db().await;
    let now = Utc::now();

    for n in 0..5 {
        let member = insert_member(&db, &format!("member-{n}"), Some("gh"), None).await;
        seed_github_snapshot(&db, member.id, 10, 0, 0, 0, now).await;
    }

    let (leaderboards, _activities, cache) = services(&db);
    let first = leaderboards
        .leaderboard(Dimension::Commits, Period::AllTime)
        .await
        .unwrap();

    // Second call is served from cache; a third after clearing rebuilds
    let second = leaderboards
        .leaderboard(Dimension::Commits, Period::AllTime)
        .await
        .unwrap();
    cache.clear_all().await;
    let third = leaderboards
        .leaderboard(Dimension::Commits, Period::AllTime)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[tokio::test]
async fn leaderboard_serves_cached_value_until_invalidated() {
    let db = setup_db().await;
    let now = Utc::now();

    let alice = insert_member(&db, "alice", Some("alice-gh"), None).await;
    seed_github_snapshot(&db, alice.id, 5, 0, 0, 0, now).await;

    let (leaderboards, _activities, cache) = services(&db);
    let before = leaderboards
        .leaderboard(Dimension::Commits, Period::AllTime)
        .await
        .unwrap();
    assert_eq!(before[0].value, 5);

    // New snapshot lands, but the cache still serves the old page
    seed_github_snapshot(&db, alice.id, 50, 0, 0, 0, now + Duration::minutes(1)).await;
    let cached = leaderboards
        .leaderboard(Dimension::Commits, Period::AllTime)
        .await
        .unwrap();
    assert_eq!(cached[0].value, 5);

    // Invalidation exposes the fresh data
    cache.clear_all().await;
    let rebuilt = leaderboards
        .leaderboard(Dimension::Commits, Period::AllTime)
        .await
        .unwrap();
    assert_eq!(rebuilt[0].value, 50);
}

#[tokio::test]
async fn leaderboard_uses_current_snapshot_only() {
    let db = setup_db().await;
    let now = Utc::now();

    let alice = insert_member(&db, "alice", Some("alice-gh"), None).await;
    seed_github_snapshot(&db, alice.id, 5, 0, 0, 0, now - Duration::hours(2)).await;
    seed_github_snapshot(&db, alice.id, 9, 0, 0, 0, now).await;

    let (leaderboards, _activities, _cache) = services(&db);
    let ranked = leaderboards
        .leaderboard(Dimension::Commits, Period::AllTime)
        .await
        .unwrap();

    assert_eq!(ranked[0].value, 9);
}

#[tokio::test]
async fn activities_reports_snapshot_deltas() {
    let db = setup_db().await;
    let now = Utc::now();

    let alice = insert_member(&db, "alice", Some("alice-gh"), None).await;
    seed_github_snapshot(&db, alice.id, 10, 1, 0, 0, now - Duration::hours(1)).await;
    seed_github_snapshot(&db, alice.id, 14, 1, 0, 0, now).await;

    let (_leaderboards, activities, _cache) = services(&db);
    let feed = activities
        .activities(FeedScope::Member(alice.id), 50)
        .await
        .unwrap();

    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].amount, 4);
    assert_eq!(feed[0].provider, Provider::GitHub);
}

#[tokio::test]
async fn global_activities_cover_all_members_and_respect_limit() {
    let db = setup_db().await;
    let now = Utc::now();

    let alice = insert_member(&db, "alice", Some("alice-gh"), None).await;
    let bob = insert_member(&db, "bob", None, Some("bob-lc")).await;
    seed_github_snapshot(&db, alice.id, 3, 1, 0, 0, now - Duration::minutes(5)).await;
    seed_leetcode_snapshot(&db, bob.id, 2, 1, 0, now).await;

    let (_leaderboards, activities, _cache) = services(&db);
    let feed = activities.activities(FeedScope::Global, 10).await.unwrap();

    assert!(feed.iter().any(|e| e.member_id == alice.id));
    assert!(feed.iter().any(|e| e.member_id == bob.id));
    // Newest first
    assert_eq!(feed[0].member_id, bob.id);

    let limited = activities.activities(FeedScope::Global, 1).await.unwrap();
    assert_eq!(limited.len(), 1);
}
