//! Member entity - the portal user whose contribution stats are tracked.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::provider::Provider;

/// Member model - one row per tracked community member.
///
/// The authenticated subject identifier supplied by the surrounding portal
/// is the primary key; this crate never creates or authenticates members,
/// it only reads their registered provider usernames and auxiliary scores.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Subject identifier from the identity provider.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Display handle within the portal.
    pub handle: String,

    /// Registered GitHub login, if any.
    pub github_username: Option<String>,
    /// Registered LeetCode username, if any.
    pub leetcode_username: Option<String>,

    /// Portal-awarded experience points (event attendance, projects).
    #[sea_orm(default_value = 0)]
    pub experience: i32,
    /// Current daily activity streak.
    #[sea_orm(default_value = 0)]
    pub streak: i32,

    /// When the member joined the portal.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A member has many contribution snapshots.
    #[sea_orm(has_many = "super::contribution_snapshot::Entity")]
    ContributionSnapshot,
    /// A member has many bootcamp participations.
    #[sea_orm(has_many = "super::bootcamp_participant::Entity")]
    BootcampParticipant,
}

impl Related<super::contribution_snapshot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContributionSnapshot.def()
    }
}

impl Related<super::bootcamp_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BootcampParticipant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The registered username for the given provider, if any.
    pub fn username_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::GitHub => self.github_username.as_deref(),
            Provider::LeetCode => self.leetcode_username.as_deref(),
        }
    }

    /// Whether the member has at least one registered provider username.
    pub fn has_any_provider(&self) -> bool {
        self.github_username.is_some() || self.leetcode_username.is_some()
    }
}
