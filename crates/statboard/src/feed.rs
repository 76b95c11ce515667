//! Activity feed entries and the global-feed merge update.
//!
//! Entries are derived from the delta between a member's two most recent
//! snapshots. The global feed is a bounded, timestamp-sorted list shared
//! by every member; refreshing one member splices their fresh entries in
//! without touching anyone else's.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::contribution_snapshot::Model as SnapshotModel;
use crate::entity::member::Model as MemberModel;
use crate::entity::provider::Provider;

/// Bound on the global feed length.
pub const GLOBAL_FEED_CAP: usize = 100;

/// What a feed entry reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// New commits since the previous snapshot.
    Commits,
    /// New pull requests.
    PullRequests,
    /// New issues.
    Issues,
    /// Newly solved problems.
    ProblemsSolved,
}

/// One entry of an activity feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Member the activity belongs to.
    pub member_id: Uuid,
    /// Member handle, denormalized for display.
    pub handle: String,
    /// Provider the activity came from.
    pub provider: Provider,
    /// What happened.
    pub kind: ActivityKind,
    /// How much of it happened since the previous snapshot.
    pub amount: i32,
    /// When the activity was observed (the snapshot capture time).
    pub occurred_at: DateTime<Utc>,
}

/// Positive delta between two counter readings.
fn gained(current: i32, previous: i32) -> i32 {
    (current - previous).max(0)
}

/// Derive feed entries from a member's latest snapshot and its
/// predecessor.
///
/// With no predecessor the full counters are reported: a member's first
/// sync surfaces their existing activity once. Zero deltas produce no
/// entries, so no-op syncs leave the feed untouched.
pub fn entries_from_snapshots(
    member: &MemberModel,
    current: &SnapshotModel,
    previous: Option<&SnapshotModel>,
) -> Vec<ActivityEntry> {
    let occurred_at = current.captured_at.with_timezone(&Utc);
    let entry = |kind: ActivityKind, amount: i32| ActivityEntry {
        member_id: member.id,
        handle: member.handle.clone(),
        provider: current.provider,
        kind,
        amount,
        occurred_at,
    };

    let mut entries = Vec::new();
    match current.provider {
        Provider::GitHub => {
            let (commits, prs, issues) = match previous {
                Some(prev) => (
                    gained(current.commits, prev.commits),
                    gained(current.pull_requests, prev.pull_requests),
                    gained(current.issues, prev.issues),
                ),
                None => (current.commits, current.pull_requests, current.issues),
            };
            if commits > 0 {
                entries.push(entry(ActivityKind::Commits, commits));
            }
            if prs > 0 {
                entries.push(entry(ActivityKind::PullRequests, prs));
            }
            if issues > 0 {
                entries.push(entry(ActivityKind::Issues, issues));
            }
        }
        Provider::LeetCode => {
            let total = current.solved_easy + current.solved_medium + current.solved_hard;
            let solved = match previous {
                Some(prev) => gained(
                    total,
                    prev.solved_easy + prev.solved_medium + prev.solved_hard,
                ),
                None => total,
            };
            if solved > 0 {
                entries.push(entry(ActivityKind::ProblemsSolved, solved));
            }
        }
    }

    entries
}

/// Sort a feed newest-first with a deterministic total order.
fn sort_feed(feed: &mut [ActivityEntry]) {
    feed.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then(a.member_id.cmp(&b.member_id))
            .then(a.kind.cmp(&b.kind))
    });
}

/// Splice one member's fresh entries into the global feed.
///
/// Only that member's old entries are replaced; everyone else's survive
/// untouched. The result is re-sorted newest-first and capped.
pub fn merge_into_global(
    feed: Vec<ActivityEntry>,
    member_id: Uuid,
    fresh: Vec<ActivityEntry>,
) -> Vec<ActivityEntry> {
    let mut merged: Vec<ActivityEntry> = feed
        .into_iter()
        .filter(|entry| entry.member_id != member_id)
        .collect();
    merged.extend(fresh);

    sort_feed(&mut merged);
    merged.truncate(GLOBAL_FEED_CAP);
    merged
}

/// Build a global feed from per-member entry lists.
pub fn build_global(per_member: Vec<Vec<ActivityEntry>>) -> Vec<ActivityEntry> {
    let mut feed: Vec<ActivityEntry> = per_member.into_iter().flatten().collect();
    sort_feed(&mut feed);
    feed.truncate(GLOBAL_FEED_CAP);
    feed
}
