//! BootcampParticipant entity - one member's enrollment in a bootcamp.
//!
//! The baseline stat block is captured at registration and never changes.
//! Periodic re-sync rewrites `current_stats` and the clamped delta in
//! `progress_stats`; the completion transition writes `final_rank` once,
//! after which the row is read-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::provider::Provider;
use crate::ranking;

/// The counters a bootcamp scores, serialized into the participant's
/// baseline/current/progress JSON columns.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    /// Commit contributions.
    #[serde(default)]
    pub commits: i32,
    /// Pull requests opened.
    #[serde(default)]
    pub pull_requests: i32,
    /// Issues opened.
    #[serde(default)]
    pub issues: i32,
    /// Public repositories owned.
    #[serde(default)]
    pub repositories: i32,
    /// Total calendar contributions.
    #[serde(default)]
    pub contributions: i32,
    /// Problems solved, easy.
    #[serde(default)]
    pub solved_easy: i32,
    /// Problems solved, medium.
    #[serde(default)]
    pub solved_medium: i32,
    /// Problems solved, hard.
    #[serde(default)]
    pub solved_hard: i32,
}

impl StatBlock {
    /// Progress made since `baseline`, clamped field-by-field at zero.
    ///
    /// Provider counters can regress between reads (API eventual
    /// consistency); a regressed counter contributes zero progress rather
    /// than a negative delta.
    pub fn delta_since(&self, baseline: &StatBlock) -> StatBlock {
        fn clamped(current: i32, baseline: i32) -> i32 {
            (current - baseline).max(0)
        }

        StatBlock {
            commits: clamped(self.commits, baseline.commits),
            pull_requests: clamped(self.pull_requests, baseline.pull_requests),
            issues: clamped(self.issues, baseline.issues),
            repositories: clamped(self.repositories, baseline.repositories),
            contributions: clamped(self.contributions, baseline.contributions),
            solved_easy: clamped(self.solved_easy, baseline.solved_easy),
            solved_medium: clamped(self.solved_medium, baseline.solved_medium),
            solved_hard: clamped(self.solved_hard, baseline.solved_hard),
        }
    }

    /// Composite points for this block under the given provider's formula.
    pub fn points(&self, provider: Provider) -> i64 {
        match provider {
            Provider::GitHub => ranking::github_points(
                self.commits,
                self.pull_requests,
                self.issues,
                self.repositories,
            ),
            Provider::LeetCode => {
                ranking::leetcode_points(self.solved_easy, self.solved_medium, self.solved_hard)
            }
        }
    }

    /// Serialize into the JSON column representation.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Parse from a JSON column, defaulting missing fields to zero.
    pub fn from_json(value: &serde_json::Value) -> StatBlock {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }
}

/// BootcampParticipant model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bootcamp_participants")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Bootcamp this enrollment belongs to.
    pub bootcamp_id: Uuid,
    /// Enrolled member.
    pub member_id: Uuid,

    /// Stat block captured at registration; the zero-point for progress.
    #[sea_orm(column_type = "Json")]
    pub baseline_stats: serde_json::Value,
    /// Most recently fetched stat block.
    #[sea_orm(column_type = "Json")]
    pub current_stats: serde_json::Value,
    /// `current - baseline`, clamped at zero per field.
    #[sea_orm(column_type = "Json")]
    pub progress_stats: serde_json::Value,

    /// Composite points computed from `progress_stats`.
    #[sea_orm(default_value = 0)]
    pub final_points: i64,
    /// 1-based rank assigned at completion; `None` while the bootcamp runs.
    pub final_rank: Option<i32>,

    /// Registration time; also the tie-breaker for final ranking.
    pub registered_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A participant row belongs to a bootcamp.
    #[sea_orm(
        belongs_to = "super::bootcamp::Entity",
        from = "Column::BootcampId",
        to = "super::bootcamp::Column::Id"
    )]
    Bootcamp,
    /// A participant row belongs to a member.
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::MemberId",
        to = "super::member::Column::Id"
    )]
    Member,
}

impl Related<super::bootcamp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bootcamp.def()
    }
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Member.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The baseline stat block.
    pub fn baseline(&self) -> StatBlock {
        StatBlock::from_json(&self.baseline_stats)
    }

    /// The most recent stat block.
    pub fn current(&self) -> StatBlock {
        StatBlock::from_json(&self.current_stats)
    }

    /// The clamped progress stat block.
    pub fn progress(&self) -> StatBlock {
        StatBlock::from_json(&self.progress_stats)
    }
}
