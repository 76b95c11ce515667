//! Statboard - the club portal's stat sync and leaderboard engine.
//!
//! This library pulls contribution statistics from external providers
//! (GitHub, LeetCode), normalizes them into snapshots, keeps a two-tier
//! cache of computed activity feeds and leaderboards, ranks members
//! deterministically, and tracks progress for time-boxed bootcamp
//! competitions.
//!
//! # Features
//!
//! - `github` / `leetcode` - the provider clients
//! - `migrate` - database migration support; enables
//!   [`connect_and_migrate`]
//! - `redis-cache` - the distributed cache tier; without it the cache
//!   degrades to process-local only
//!
//! # Example
//!
//! ```ignore
//! use statboard::{connect_and_migrate, CacheConfig, TieredCache, SyncOrchestrator, SyncTrigger};
//!
//! let db = connect_and_migrate("sqlite://statboard.db?mode=rwc").await?;
//! let cache = Arc::new(TieredCache::connect(&CacheConfig::default()).await);
//! let orchestrator = SyncOrchestrator::new(db, cache, clients);
//!
//! // Force-sync one member, respecting the 10-minute throttle
//! let result = orchestrator.sync_member(member_id, SyncTrigger::Forced).await?;
//! ```

pub mod cache;
pub mod db;
pub mod entity;
pub mod feed;
pub mod normalize;
pub mod provider;
pub mod ranking;
pub mod service;
pub mod store;
pub mod sync;

pub mod bootcamp;

#[cfg(any(feature = "github", feature = "leetcode"))]
pub mod retry;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "leetcode")]
pub mod leetcode;

#[cfg(feature = "migrate")]
pub mod migration;

pub use cache::{CacheConfig, TieredCache};
pub use db::connect;
#[cfg(feature = "migrate")]
pub use db::connect_and_migrate;
pub use entity::prelude::*;
pub use provider::{
    ApiRateLimiter, Profile, ProviderClient, ProviderError, RateLimitedClient, RawContributions,
    rate_limits,
};
pub use ranking::{Dimension, Period, RankedEntry};
pub use service::{ActivityService, FeedScope, LeaderboardService, ServiceError};
pub use store::StoreError;
pub use sync::{BatchSyncReport, SyncError, SyncOrchestrator, SyncTrigger};
