//! Bootcamp and participant queries.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entity::bootcamp::{
    ActiveModel as BootcampActiveModel, BootcampStatus, Column as BootcampColumn,
    Entity as Bootcamp, Model as BootcampModel,
};
use crate::entity::bootcamp_participant::{
    ActiveModel as ParticipantActiveModel, Column as ParticipantColumn,
    Entity as BootcampParticipant, Model as ParticipantModel,
};

use super::errors::Result;

/// Insert a new bootcamp.
pub async fn insert(db: &DatabaseConnection, model: BootcampActiveModel) -> Result<BootcampModel> {
    Ok(model.insert(db).await?)
}

/// Find a bootcamp by id.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<BootcampModel>> {
    Ok(Bootcamp::find_by_id(id).one(db).await?)
}

/// List all bootcamps, newest first.
pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<BootcampModel>> {
    Ok(Bootcamp::find()
        .order_by_desc(BootcampColumn::StartsAt)
        .all(db)
        .await?)
}

/// List bootcamps in a given status.
pub async fn list_by_status(
    db: &DatabaseConnection,
    status: BootcampStatus,
) -> Result<Vec<BootcampModel>> {
    Ok(Bootcamp::find()
        .filter(BootcampColumn::Status.eq(status))
        .order_by_asc(BootcampColumn::StartsAt)
        .all(db)
        .await?)
}

/// List bootcamps that have not reached a terminal status.
pub async fn list_open(db: &DatabaseConnection) -> Result<Vec<BootcampModel>> {
    Ok(Bootcamp::find()
        .filter(BootcampColumn::Status.is_in([BootcampStatus::Upcoming, BootcampStatus::Active]))
        .order_by_asc(BootcampColumn::StartsAt)
        .all(db)
        .await?)
}

/// Set a bootcamp's status.
pub async fn set_status(
    db: &DatabaseConnection,
    bootcamp: BootcampModel,
    status: BootcampStatus,
) -> Result<BootcampModel> {
    let mut active: BootcampActiveModel = bootcamp.into();
    active.status = Set(status);
    Ok(active.update(db).await?)
}

/// Insert a new participant row.
pub async fn insert_participant(
    db: &DatabaseConnection,
    model: ParticipantActiveModel,
) -> Result<ParticipantModel> {
    Ok(model.insert(db).await?)
}

/// Find one member's participation in a bootcamp.
pub async fn find_participant(
    db: &DatabaseConnection,
    bootcamp_id: Uuid,
    member_id: Uuid,
) -> Result<Option<ParticipantModel>> {
    Ok(BootcampParticipant::find()
        .filter(ParticipantColumn::BootcampId.eq(bootcamp_id))
        .filter(ParticipantColumn::MemberId.eq(member_id))
        .one(db)
        .await?)
}

/// List a bootcamp's participants in registration order.
///
/// Registration order is the final-ranking tie-breaker, so every
/// consumer sees the same deterministic sequence.
pub async fn list_participants(
    db: &DatabaseConnection,
    bootcamp_id: Uuid,
) -> Result<Vec<ParticipantModel>> {
    Ok(BootcampParticipant::find()
        .filter(ParticipantColumn::BootcampId.eq(bootcamp_id))
        .order_by_asc(ParticipantColumn::RegisteredAt)
        .all(db)
        .await?)
}

/// Update an existing participant row.
pub async fn update_participant(
    db: &DatabaseConnection,
    model: ParticipantActiveModel,
) -> Result<ParticipantModel> {
    Ok(model.update(db).await?)
}
