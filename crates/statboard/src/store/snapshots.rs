//! Contribution snapshot queries.
//!
//! Snapshots are insert-only; "current" always means the newest row by
//! `captured_at` for a (member, provider) pair.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use crate::entity::contribution_snapshot::{
    ActiveModel, Column, Entity as ContributionSnapshot, Model,
};
use crate::entity::provider::Provider;

use super::errors::Result;

/// Insert a new snapshot row.
pub async fn insert(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    Ok(model.insert(db).await?)
}

/// Find the current snapshot for a (member, provider) pair.
pub async fn find_current(
    db: &DatabaseConnection,
    member_id: Uuid,
    provider: Provider,
) -> Result<Option<Model>> {
    Ok(ContributionSnapshot::find()
        .filter(Column::MemberId.eq(member_id))
        .filter(Column::Provider.eq(provider))
        .order_by_desc(Column::CapturedAt)
        .one(db)
        .await?)
}

/// Find the two most recent snapshots for a (member, provider) pair.
///
/// Returns `(current, previous)`; the activity feed derives deltas from
/// the pair.
pub async fn find_latest_pair(
    db: &DatabaseConnection,
    member_id: Uuid,
    provider: Provider,
) -> Result<(Option<Model>, Option<Model>)> {
    let mut rows = ContributionSnapshot::find()
        .filter(Column::MemberId.eq(member_id))
        .filter(Column::Provider.eq(provider))
        .order_by_desc(Column::CapturedAt)
        .limit(2)
        .all(db)
        .await?;

    let previous = if rows.len() > 1 { rows.pop() } else { None };
    let current = rows.pop();
    Ok((current, previous))
}

/// Find the current snapshot for every member, for one provider.
///
/// Returns a member id -> snapshot map. Rows come back newest-first per
/// member; the first row seen per member wins.
pub async fn find_current_for_all(
    db: &DatabaseConnection,
    provider: Provider,
) -> Result<HashMap<Uuid, Model>> {
    let rows = ContributionSnapshot::find()
        .filter(Column::Provider.eq(provider))
        .order_by_asc(Column::MemberId)
        .order_by_desc(Column::CapturedAt)
        .all(db)
        .await?;

    let mut current: HashMap<Uuid, Model> = HashMap::new();
    for row in rows {
        current.entry(row.member_id).or_insert(row);
    }
    Ok(current)
}

/// Delete historical snapshots captured before the cutoff.
///
/// The current snapshot of each pair is never deleted, however old it
/// is: history pruning must not erase a member's only stats.
pub async fn delete_stale(db: &DatabaseConnection, cutoff: DateTime<Utc>) -> Result<u64> {
    let mut deleted = 0u64;

    for provider in Provider::ALL {
        let current = find_current_for_all(db, provider).await?;
        let keep_ids: Vec<Uuid> = current.values().map(|m| m.id).collect();

        let result = ContributionSnapshot::delete_many()
            .filter(Column::Provider.eq(provider))
            .filter(Column::CapturedAt.lt(cutoff.fixed_offset()))
            .filter(Column::Id.is_not_in(keep_ids))
            .exec(db)
            .await?;
        deleted += result.rows_affected;
    }

    Ok(deleted)
}
