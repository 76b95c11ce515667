//! Bootcamp entity - a time-boxed contribution competition.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::provider::Provider;

/// Lifecycle status of a bootcamp.
///
/// Transitions are time-driven (`UPCOMING -> ACTIVE -> COMPLETED`) with
/// `CANCELLED` reachable from any non-completed state by administrative
/// action. Status is the sole gate on progress tracking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum BootcampStatus {
    /// Before the start date; registration open, no tracking.
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    /// Between start and end; participants are re-synced.
    #[sea_orm(string_value = "active")]
    Active,
    /// Past the end date; final ranks assigned, immutable.
    #[sea_orm(string_value = "completed")]
    Completed,
    /// Cancelled before completion.
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl BootcampStatus {
    /// Whether the bootcamp has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BootcampStatus::Completed | BootcampStatus::Cancelled)
    }
}

impl std::fmt::Display for BootcampStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BootcampStatus::Upcoming => "upcoming",
            BootcampStatus::Active => "active",
            BootcampStatus::Completed => "completed",
            BootcampStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Bootcamp model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bootcamps")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Human-readable title.
    pub title: String,
    /// Which provider's stats this bootcamp scores.
    pub provider: Provider,
    /// Current lifecycle status.
    pub status: BootcampStatus,

    /// When the competition window opens.
    pub starts_at: DateTimeWithTimeZone,
    /// When the competition window closes.
    pub ends_at: DateTimeWithTimeZone,
    /// When the bootcamp row was created.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A bootcamp has many participants.
    #[sea_orm(has_many = "super::bootcamp_participant::Entity")]
    BootcampParticipant,
}

impl Related<super::bootcamp_participant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BootcampParticipant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The status the bootcamp should be in at `now`, ignoring cancellation.
    ///
    /// Cancelled bootcamps never advance; callers must check `is_terminal`
    /// before applying the returned value.
    pub fn expected_status(&self, now: chrono::DateTime<chrono::Utc>) -> BootcampStatus {
        if now >= self.ends_at.with_timezone(&chrono::Utc) {
            BootcampStatus::Completed
        } else if now >= self.starts_at.with_timezone(&chrono::Utc) {
            BootcampStatus::Active
        } else {
            BootcampStatus::Upcoming
        }
    }

    /// Whether registration is still open (before completion/cancellation).
    pub fn accepts_registrations(&self) -> bool {
        matches!(
            self.status,
            BootcampStatus::Upcoming | BootcampStatus::Active
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn make_bootcamp(status: BootcampStatus, starts_in: Duration, ends_in: Duration) -> Model {
        let now = Utc::now();
        Model {
            id: Uuid::new_v4(),
            title: "Winter of Code".to_string(),
            provider: Provider::GitHub,
            status,
            starts_at: (now + starts_in).fixed_offset(),
            ends_at: (now + ends_in).fixed_offset(),
            created_at: now.fixed_offset(),
        }
    }

    #[test]
    fn test_expected_status_follows_the_clock() {
        let now = Utc::now();

        let upcoming = make_bootcamp(
            BootcampStatus::Upcoming,
            Duration::days(1),
            Duration::days(8),
        );
        assert_eq!(upcoming.expected_status(now), BootcampStatus::Upcoming);

        let active = make_bootcamp(
            BootcampStatus::Upcoming,
            Duration::days(-1),
            Duration::days(6),
        );
        assert_eq!(active.expected_status(now), BootcampStatus::Active);

        let over = make_bootcamp(
            BootcampStatus::Active,
            Duration::days(-8),
            Duration::days(-1),
        );
        assert_eq!(over.expected_status(now), BootcampStatus::Completed);
    }

    #[test]
    fn test_terminal_states() {
        assert!(BootcampStatus::Completed.is_terminal());
        assert!(BootcampStatus::Cancelled.is_terminal());
        assert!(!BootcampStatus::Active.is_terminal());
        assert!(!BootcampStatus::Upcoming.is_terminal());
    }

    #[test]
    fn test_accepts_registrations() {
        let upcoming = make_bootcamp(
            BootcampStatus::Upcoming,
            Duration::days(1),
            Duration::days(8),
        );
        assert!(upcoming.accepts_registrations());

        let cancelled = make_bootcamp(
            BootcampStatus::Cancelled,
            Duration::days(1),
            Duration::days(8),
        );
        assert!(!cancelled.accepts_registrations());
    }
}
