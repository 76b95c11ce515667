//! Shared sync types and constants.

use uuid::Uuid;

use crate::entity::contribution_snapshot::Model as SnapshotModel;
use crate::entity::provider::Provider;
use crate::store::StoreError;

/// Staleness window for background, dashboard-driven syncs.
pub const BACKGROUND_STALE_HOURS: i64 = 24;

/// Staleness window for visit-triggered refreshes.
pub const VISIT_STALE_MINUTES: i64 = 30;

/// Minimum interval between user-forced syncs for one (member, provider)
/// pair. Doubles as the claim hold: while it runs, no other worker can
/// start a fetch for the pair.
pub const USER_SYNC_MIN_INTERVAL_MINUTES: i64 = 10;

/// End-to-end timeout on one provider fetch. A hung upstream call must
/// never wedge a sync worker.
pub const PROVIDER_FETCH_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(20);

/// What prompted a sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Periodic dashboard-driven sync; 24 h staleness window.
    Background,
    /// A member visited their page; 30 min staleness window.
    Visit,
    /// The member pressed the refresh button; only the 10 min throttle
    /// applies.
    Forced,
}

/// Why a provider sync was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Stats are within the staleness window.
    Fresh,
    /// Another worker holds the claim, or the pair is throttled.
    InFlight,
    /// No client configured for the provider in this process.
    NoClient,
}

/// Outcome of syncing one provider for one member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderSyncStatus {
    /// A fresh snapshot was captured.
    Synced,
    /// Nothing was fetched.
    Skipped(SkipReason),
    /// The fetch or persist failed; the previous snapshot is untouched.
    Failed(String),
}

impl ProviderSyncStatus {
    /// Whether this status represents a captured snapshot.
    pub fn is_synced(&self) -> bool {
        matches!(self, ProviderSyncStatus::Synced)
    }

    /// Whether this status represents a failure.
    pub fn is_failed(&self) -> bool {
        matches!(self, ProviderSyncStatus::Failed(_))
    }
}

/// Result of syncing one member across their registered providers.
#[derive(Debug, Default)]
pub struct MemberSyncResult {
    /// The member synced.
    pub member_id: Uuid,
    /// Per-provider outcomes.
    pub statuses: Vec<(Provider, ProviderSyncStatus)>,
    /// Current GitHub snapshot after the sync, if any exists.
    pub github: Option<SnapshotModel>,
    /// Current LeetCode snapshot after the sync, if any exists.
    pub leetcode: Option<SnapshotModel>,
}

impl MemberSyncResult {
    /// Whether any provider captured a fresh snapshot.
    pub fn any_synced(&self) -> bool {
        self.statuses.iter().any(|(_, status)| status.is_synced())
    }

    /// The current snapshot for a provider, if any.
    pub fn current(&self, provider: Provider) -> Option<&SnapshotModel> {
        match provider {
            Provider::GitHub => self.github.as_ref(),
            Provider::LeetCode => self.leetcode.as_ref(),
        }
    }
}

/// Aggregate result of a batch sync.
///
/// Batch syncs continue past individual failures; the error list names
/// each member that failed and why.
#[derive(Debug, Default)]
pub struct BatchSyncReport {
    /// Members with at least one fresh snapshot.
    pub synced: usize,
    /// Members skipped entirely (all providers fresh or in flight).
    pub skipped: usize,
    /// Per-member failures, non-fatal to the batch.
    pub errors: Vec<(Uuid, String)>,
}

impl BatchSyncReport {
    /// Whether any member failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Total members the batch touched.
    pub fn total(&self) -> usize {
        self.synced + self.skipped + self.errors.len()
    }
}

/// Errors surfaced by member-level sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The subject id does not resolve to a member.
    #[error("Unknown member: {0}")]
    UnknownMember(Uuid),

    /// The member has no registered provider usernames.
    #[error("No provider username registered for member {0}")]
    MissingUsername(Uuid),

    /// The user-triggered sync throttle rejected the request.
    #[error("Sync rate limit hit. Retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    /// Database failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}
