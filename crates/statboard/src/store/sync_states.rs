//! Sync state queries, including the atomic claim that linearizes
//! concurrent syncs for the same (member, provider) pair.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::entity::provider::Provider;
use crate::entity::sync_state::{ActiveModel, Column, Entity as SyncState, Model};

use super::errors::Result;

/// Find the sync state for a (member, provider) pair.
pub async fn find(
    db: &DatabaseConnection,
    member_id: Uuid,
    provider: Provider,
) -> Result<Option<Model>> {
    Ok(SyncState::find()
        .filter(Column::MemberId.eq(member_id))
        .filter(Column::Provider.eq(provider))
        .one(db)
        .await?)
}

/// Atomically claim the right to sync a (member, provider) pair.
///
/// The claim advances `next_eligible_at` to `hold_until` only if the
/// pair is currently eligible. Exactly one of any number of concurrent
/// callers observes `rows_affected == 1`; the rest lose the race and
/// should serve the just-written snapshot instead of fetching upstream.
///
/// A missing row (first sync ever) is claimed by inserting it; the
/// unique (member, provider) index turns the racing insert into a lost
/// claim rather than a duplicate row.
pub async fn try_claim(
    db: &DatabaseConnection,
    member_id: Uuid,
    provider: Provider,
    now: DateTime<Utc>,
    hold_until: DateTime<Utc>,
) -> Result<bool> {
    let updated = SyncState::update_many()
        .col_expr(
            Column::NextEligibleAt,
            Expr::value(hold_until.fixed_offset()),
        )
        .filter(Column::MemberId.eq(member_id))
        .filter(Column::Provider.eq(provider))
        .filter(Column::NextEligibleAt.lte(now.fixed_offset()))
        .exec(db)
        .await?;

    if updated.rows_affected > 0 {
        return Ok(true);
    }

    if find(db, member_id, provider).await?.is_some() {
        // Row exists but was not eligible: another worker holds the claim
        // or the pair is inside its throttle window.
        return Ok(false);
    }

    let fresh = ActiveModel {
        id: Set(Uuid::new_v4()),
        member_id: Set(member_id),
        provider: Set(provider),
        last_synced_at: Set(now.fixed_offset()),
        last_sync_ok: Set(false),
        next_eligible_at: Set(hold_until.fixed_offset()),
    };

    match SyncState::insert(fresh).exec(db).await {
        Ok(_) => Ok(true),
        Err(e) => {
            // Unique index collision: a concurrent worker inserted first
            tracing::debug!(
                "sync state insert lost the race for {}/{}: {}",
                member_id,
                provider,
                e
            );
            Ok(false)
        }
    }
}

/// Record the outcome of a sync attempt.
///
/// Upserts so a crash between claim and completion cannot leave the pair
/// without a state row. `next_eligible_at` is preserved as claimed; a
/// failed attempt does not reopen the throttle window early.
pub async fn mark_result(
    db: &DatabaseConnection,
    member_id: Uuid,
    provider: Provider,
    finished_at: DateTime<Utc>,
    ok: bool,
    next_eligible_at: DateTime<Utc>,
) -> Result<()> {
    let model = ActiveModel {
        id: Set(Uuid::new_v4()),
        member_id: Set(member_id),
        provider: Set(provider),
        last_synced_at: Set(finished_at.fixed_offset()),
        last_sync_ok: Set(ok),
        next_eligible_at: Set(next_eligible_at.fixed_offset()),
    };

    SyncState::insert(model)
        .on_conflict(
            OnConflict::columns([Column::MemberId, Column::Provider])
                .update_columns([
                    Column::LastSyncedAt,
                    Column::LastSyncOk,
                    Column::NextEligibleAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;

    Ok(())
}
