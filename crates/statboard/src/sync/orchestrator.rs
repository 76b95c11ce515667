//! The sync orchestrator: claims, fetches, normalizes, persists and
//! invalidates.
//!
//! Per (member, provider) pair the flow is a small state machine:
//! eligible-and-stale pairs are claimed atomically (losers of the race
//! serve the just-written snapshot), the provider fetch runs under a
//! timeout, and a failure of any kind marks the state FAILED while the
//! previous snapshot stays untouched. Cache maintenance after a
//! successful sync is a secondary effect: it is logged when it
//! misbehaves and never fails the primary operation.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::DatabaseConnection;

use crate::cache::{TieredCache, keys};
use crate::entity::contribution_snapshot::Model as SnapshotModel;
use crate::entity::member::Model as MemberModel;
use crate::entity::provider::Provider;
use crate::feed;
use crate::normalize::normalize;
use crate::provider::ProviderClient;
use crate::store;

use super::gate::{self, GateDecision};
use super::types::{
    BatchSyncReport, MemberSyncResult, PROVIDER_FETCH_TIMEOUT, ProviderSyncStatus, SkipReason,
    SyncError, SyncTrigger, USER_SYNC_MIN_INTERVAL_MINUTES,
};

/// The sync orchestrator.
///
/// One instance per process; cheap to share behind an `Arc`. Provider
/// clients are trait objects so tests can script them.
pub struct SyncOrchestrator {
    db: DatabaseConnection,
    cache: Arc<TieredCache>,
    clients: Vec<Arc<dyn ProviderClient>>,
    fetch_timeout: std::time::Duration,
}

impl SyncOrchestrator {
    /// Create an orchestrator over the given store, cache and clients.
    pub fn new(
        db: DatabaseConnection,
        cache: Arc<TieredCache>,
        clients: Vec<Arc<dyn ProviderClient>>,
    ) -> Self {
        Self {
            db,
            cache,
            clients,
            fetch_timeout: PROVIDER_FETCH_TIMEOUT,
        }
    }

    /// Override the per-fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// The database handle, for co-located services.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// The cache handle.
    pub fn cache(&self) -> &Arc<TieredCache> {
        &self.cache
    }

    fn client_for(&self, provider: Provider) -> Option<&Arc<dyn ProviderClient>> {
        self.clients.iter().find(|c| c.provider() == provider)
    }

    /// Sync one member across their registered providers.
    ///
    /// A forced sync that lands entirely inside the throttle window fails
    /// fast with [`SyncError::RateLimited`] before any provider call. The
    /// result carries per-provider outcomes plus the current snapshots,
    /// which for skipped or failed providers are the retained previous
    /// ones.
    pub async fn sync_member(
        &self,
        member_id: uuid::Uuid,
        trigger: SyncTrigger,
    ) -> Result<MemberSyncResult, SyncError> {
        let member = store::members::find_by_id(&self.db, member_id)
            .await?
            .ok_or(SyncError::UnknownMember(member_id))?;

        let targets: Vec<(Provider, String)> = Provider::ALL
            .into_iter()
            .filter_map(|provider| {
                member
                    .username_for(provider)
                    .map(|username| (provider, username.to_string()))
            })
            .collect();

        if targets.is_empty() {
            return Err(SyncError::MissingUsername(member_id));
        }

        let now = Utc::now();

        // A forced sync with every target throttled fails fast: surface
        // the shortest remaining delay, touch nothing.
        if trigger == SyncTrigger::Forced {
            let mut delays = Vec::new();
            for (provider, _) in &targets {
                let state = store::sync_states::find(&self.db, member.id, *provider).await?;
                match gate::evaluate(state.as_ref(), trigger, now) {
                    GateDecision::Throttled {
                        retry_after_seconds,
                    } => delays.push(retry_after_seconds),
                    _ => {
                        delays.clear();
                        break;
                    }
                }
            }
            if let Some(&retry_after_seconds) = delays.iter().min() {
                return Err(SyncError::RateLimited {
                    retry_after_seconds,
                });
            }
        }

        let mut result = MemberSyncResult {
            member_id,
            ..MemberSyncResult::default()
        };

        for (provider, username) in targets {
            let status = self
                .sync_provider(&member, provider, &username, trigger, now)
                .await;
            result.statuses.push((provider, status));
        }

        result.github = store::snapshots::find_current(&self.db, member.id, Provider::GitHub).await?;
        result.leetcode =
            store::snapshots::find_current(&self.db, member.id, Provider::LeetCode).await?;

        Ok(result)
    }

    /// Sync every member with a registered provider username.
    ///
    /// Individual failures never abort the batch; they are collected into
    /// the report's error list.
    pub async fn sync_all(&self) -> Result<BatchSyncReport, SyncError> {
        let members = store::members::list_syncable(&self.db).await?;
        let mut report = BatchSyncReport::default();

        for member in members {
            match self.sync_member(member.id, SyncTrigger::Background).await {
                Ok(result) => {
                    let first_failure = result.statuses.iter().find_map(|(_, s)| match s {
                        ProviderSyncStatus::Failed(message) => Some(message.clone()),
                        _ => None,
                    });
                    if result.any_synced() {
                        report.synced += 1;
                    } else if let Some(message) = first_failure {
                        report.errors.push((member.id, message));
                    } else {
                        report.skipped += 1;
                    }
                }
                Err(e) => {
                    report.errors.push((member.id, e.to_string()));
                }
            }
        }

        tracing::info!(
            "batch sync finished: {} synced, {} skipped, {} errors",
            report.synced,
            report.skipped,
            report.errors.len()
        );
        Ok(report)
    }

    /// Run the state machine for one (member, provider) pair.
    async fn sync_provider(
        &self,
        member: &MemberModel,
        provider: Provider,
        username: &str,
        trigger: SyncTrigger,
        now: DateTime<Utc>,
    ) -> ProviderSyncStatus {
        let Some(client) = self.client_for(provider) else {
            return ProviderSyncStatus::Skipped(SkipReason::NoClient);
        };

        let state = match store::sync_states::find(&self.db, member.id, provider).await {
            Ok(state) => state,
            Err(e) => return ProviderSyncStatus::Failed(e.to_string()),
        };

        match gate::evaluate(state.as_ref(), trigger, now) {
            GateDecision::Due => {}
            GateDecision::Fresh => return ProviderSyncStatus::Skipped(SkipReason::Fresh),
            GateDecision::Throttled { .. } => {
                return ProviderSyncStatus::Skipped(SkipReason::InFlight);
            }
        }

        let hold_until = now + Duration::minutes(USER_SYNC_MIN_INTERVAL_MINUTES);
        match store::sync_states::try_claim(&self.db, member.id, provider, now, hold_until).await {
            Ok(true) => {}
            Ok(false) => return ProviderSyncStatus::Skipped(SkipReason::InFlight),
            Err(e) => return ProviderSyncStatus::Failed(e.to_string()),
        }

        // From here on the claim is ours; every exit path records a result
        // so the pair can never stick in a half-synced state.
        let fetched =
            tokio::time::timeout(self.fetch_timeout, client.fetch_contributions(username)).await;

        let raw = match fetched {
            Err(_) => {
                tracing::warn!("{} fetch for {} timed out", provider, username);
                self.mark_failed(member.id, provider, hold_until).await;
                return ProviderSyncStatus::Failed(format!("{} fetch timed out", provider));
            }
            Ok(Err(e)) => {
                tracing::warn!("{} fetch for {} failed: {}", provider, username, e);
                self.mark_failed(member.id, provider, hold_until).await;
                return ProviderSyncStatus::Failed(e.to_string());
            }
            Ok(Ok(raw)) => raw,
        };

        let normalized = normalize(&raw);

        let previous = match store::snapshots::find_current(&self.db, member.id, provider).await {
            Ok(previous) => previous,
            Err(e) => {
                self.mark_failed(member.id, provider, hold_until).await;
                return ProviderSyncStatus::Failed(e.to_string());
            }
        };

        let snapshot = match store::snapshots::insert(
            &self.db,
            normalized.into_active_model(member.id, now),
        )
        .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.mark_failed(member.id, provider, hold_until).await;
                return ProviderSyncStatus::Failed(e.to_string());
            }
        };

        if let Err(e) = store::sync_states::mark_result(
            &self.db,
            member.id,
            provider,
            now,
            true,
            hold_until,
        )
        .await
        {
            // The snapshot is in; a stale state row only means an earlier
            // next retry, so report success.
            tracing::warn!("sync state update failed for {}/{}: {}", member.id, provider, e);
        }

        self.apply_cache_effects(member, &snapshot, previous.as_ref())
            .await;

        ProviderSyncStatus::Synced
    }

    /// Mark a claimed pair FAILED, keeping the claim hold so retries
    /// respect the throttle.
    async fn mark_failed(&self, member_id: uuid::Uuid, provider: Provider, hold_until: DateTime<Utc>) {
        if let Err(e) = store::sync_states::mark_result(
            &self.db,
            member_id,
            provider,
            Utc::now(),
            false,
            hold_until,
        )
        .await
        {
            tracing::warn!(
                "failed to record sync failure for {}/{}: {}",
                member_id,
                provider,
                e
            );
        }
    }

    /// Post-sync cache maintenance. Failure non-fatal by design: the
    /// snapshot is already durable, caches rebuild on demand.
    async fn apply_cache_effects(
        &self,
        member: &MemberModel,
        snapshot: &SnapshotModel,
        previous: Option<&SnapshotModel>,
    ) {
        self.cache.clear(&keys::user_key(member.id)).await;

        let entries = feed::entries_from_snapshots(member, snapshot, previous);

        // Splice into the global feed rather than invalidating it: other
        // members' entries survive untouched.
        if let Some(value) = self.cache.get(keys::GLOBAL_FEED_KEY).await {
            match serde_json::from_value::<Vec<feed::ActivityEntry>>(value) {
                Ok(global) => {
                    let merged = feed::merge_into_global(global, member.id, entries.clone());
                    match serde_json::to_value(&merged) {
                        Ok(payload) => self.cache.set(keys::GLOBAL_FEED_KEY, &payload).await,
                        Err(e) => tracing::debug!("global feed serialize failed: {}", e),
                    }
                }
                Err(e) => {
                    tracing::debug!("global feed cache unreadable, dropping it: {}", e);
                    self.cache.clear(keys::GLOBAL_FEED_KEY).await;
                }
            }
        }

        // Leaderboards only churn on a material delta; a no-op sync
        // produced no entries and leaves them cached.
        if !entries.is_empty() {
            for key in keys::all_leaderboard_keys() {
                self.cache.clear(&key).await;
            }
        }
    }
}
