//! Common re-exports for convenient entity usage.

pub use super::bootcamp::{
    ActiveModel as BootcampActiveModel, BootcampStatus, Column as BootcampColumn,
    Entity as Bootcamp, Model as BootcampModel,
};
pub use super::bootcamp_participant::{
    ActiveModel as BootcampParticipantActiveModel, Column as BootcampParticipantColumn,
    Entity as BootcampParticipant, Model as BootcampParticipantModel, StatBlock,
};
pub use super::contribution_snapshot::{
    ActiveModel as ContributionSnapshotActiveModel, Column as ContributionSnapshotColumn,
    Entity as ContributionSnapshot, HistogramKind, Model as ContributionSnapshotModel,
};
pub use super::member::{
    ActiveModel as MemberActiveModel, Column as MemberColumn, Entity as Member,
    Model as MemberModel,
};
pub use super::provider::Provider;
pub use super::sync_state::{
    ActiveModel as SyncStateActiveModel, Column as SyncStateColumn, Entity as SyncState,
    Model as SyncStateModel,
};
