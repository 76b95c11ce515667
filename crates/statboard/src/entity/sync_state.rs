//! SyncState entity - per (member, provider) synchronization bookkeeping.
//!
//! One row per pair, enforced by a unique index. Rows are mutated only by
//! the sync orchestrator: the claim path advances `next_eligible_at`
//! atomically so two concurrent workers never both fetch upstream.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::provider::Provider;

/// SyncState model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sync_states")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Member this state belongs to.
    pub member_id: Uuid,
    /// Provider this state tracks.
    pub provider: Provider,

    /// When the last sync attempt finished.
    pub last_synced_at: DateTimeWithTimeZone,
    /// Whether the last sync attempt succeeded.
    #[sea_orm(default_value = true)]
    pub last_sync_ok: bool,
    /// Earliest instant the next sync for this pair may begin.
    pub next_eligible_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A sync state belongs to a member.
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Age of the last sync relative to `now`.
    pub fn age(&self, now: chrono::DateTime<chrono::Utc>) -> chrono::Duration {
        now - self.last_synced_at.with_timezone(&chrono::Utc)
    }

    /// Seconds until this pair becomes eligible again; zero if already eligible.
    pub fn seconds_until_eligible(&self, now: chrono::DateTime<chrono::Utc>) -> u64 {
        let remaining = self.next_eligible_at.with_timezone(&chrono::Utc) - now;
        remaining.num_seconds().max(0) as u64
    }
}
