//! Member queries.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::entity::member::{ActiveModel, Column, Entity as Member, Model};

use super::errors::Result;

/// Find a member by id.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>> {
    Ok(Member::find_by_id(id).one(db).await?)
}

/// Find a member by portal handle.
pub async fn find_by_handle(db: &DatabaseConnection, handle: &str) -> Result<Option<Model>> {
    Ok(Member::find()
        .filter(Column::Handle.eq(handle))
        .one(db)
        .await?)
}

/// List all members, ordered by handle.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<Model>> {
    Ok(Member::find().order_by_asc(Column::Handle).all(db).await?)
}

/// List members with at least one registered provider username.
///
/// These are the members a batch sync iterates; members with no linked
/// accounts have nothing to fetch.
pub async fn list_syncable(db: &DatabaseConnection) -> Result<Vec<Model>> {
    Ok(Member::find()
        .filter(
            Condition::any()
                .add(Column::GithubUsername.is_not_null())
                .add(Column::LeetcodeUsername.is_not_null()),
        )
        .order_by_asc(Column::Handle)
        .all(db)
        .await?)
}

/// Insert a new member row.
pub async fn insert(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    Ok(model.insert(db).await?)
}

/// Update an existing member row.
pub async fn update(db: &DatabaseConnection, model: ActiveModel) -> Result<Model> {
    Ok(model.update(db).await?)
}
