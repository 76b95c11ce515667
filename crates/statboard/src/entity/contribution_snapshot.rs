//! ContributionSnapshot entity - a point-in-time capture of one member's
//! stats from one provider.
//!
//! Snapshots are insert-only: a sync never rewrites an existing row. The
//! "current" snapshot for a (member, provider) pair is the newest row by
//! `captured_at`; older rows remain as history for bootcamp baselines and
//! are pruned administratively.

use std::collections::BTreeMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::entity::provider::Provider;

/// How a snapshot's language histogram values are to be read.
///
/// GitHub histograms are percentages derived from repository language
/// sizes; LeetCode histograms are raw solved-problem counts. The values
/// of a `percent` histogram need not sum to exactly 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum HistogramKind {
    /// Values are percentages of the member's code by language.
    #[sea_orm(string_value = "percent")]
    Percent,
    /// Values are raw counts (problems solved per language).
    #[sea_orm(string_value = "count")]
    Count,
}

/// ContributionSnapshot model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contribution_snapshots")]
pub struct Model {
    /// Internal UUID primary key.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Member this snapshot belongs to.
    pub member_id: Uuid,
    /// Provider the stats were fetched from.
    pub provider: Provider,
    /// When the snapshot was captured. Rows are immutable after insert.
    pub captured_at: DateTimeWithTimeZone,

    // ─── GitHub counters ─────────────────────────────────────────────────────
    /// Commit contributions (GitHub) in the tracked window.
    #[sea_orm(default_value = 0)]
    pub commits: i32,
    /// Pull requests opened.
    #[sea_orm(default_value = 0)]
    pub pull_requests: i32,
    /// Issues opened.
    #[sea_orm(default_value = 0)]
    pub issues: i32,
    /// Public repositories owned.
    #[sea_orm(default_value = 0)]
    pub repositories: i32,
    /// Follower count.
    #[sea_orm(default_value = 0)]
    pub followers: i32,
    /// Total contributions from the provider's contribution calendar.
    #[sea_orm(default_value = 0)]
    pub contributions: i32,

    // ─── Language histogram ──────────────────────────────────────────────────
    /// Language name -> value map (see [`HistogramKind`]).
    #[sea_orm(column_type = "Json")]
    pub language_histogram: serde_json::Value,
    /// Whether histogram values are percentages or raw counts.
    pub histogram_kind: HistogramKind,

    /// Dense daily contribution series, `"YYYY-MM-DD" -> count`.
    /// Sparse provider calendars are expanded before reaching this row.
    #[sea_orm(column_type = "Json")]
    pub daily_contributions: serde_json::Value,

    // ─── LeetCode counters ───────────────────────────────────────────────────
    /// Problems solved, easy difficulty.
    #[sea_orm(default_value = 0)]
    pub solved_easy: i32,
    /// Problems solved, medium difficulty.
    #[sea_orm(default_value = 0)]
    pub solved_medium: i32,
    /// Problems solved, hard difficulty.
    #[sea_orm(default_value = 0)]
    pub solved_hard: i32,

    /// Provider-reported global ranking, if exposed.
    pub ranking: Option<i64>,
    /// Provider-reported reputation, if exposed.
    pub reputation: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A snapshot belongs to a member.
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
    /// Parse the language histogram into an ordered name -> value map.
    ///
    /// Non-object payloads and non-numeric values yield an empty/partial map
    /// rather than an error; the normalizer guarantees well-formed data for
    /// rows written by this crate.
    pub fn histogram_map(&self) -> BTreeMap<String, i64> {
        match &self.language_histogram {
            serde_json::Value::Object(map) => map
                .iter()
                .filter_map(|(name, value)| value.as_i64().map(|v| (name.clone(), v)))
                .collect(),
            _ => BTreeMap::new(),
        }
    }

    /// Parse the dense daily series into an ordered date -> count map.
    pub fn daily_series(&self) -> BTreeMap<chrono::NaiveDate, i32> {
        match &self.daily_contributions {
            serde_json::Value::Object(map) => map
                .iter()
                .filter_map(|(day, value)| {
                    let date = day.parse::<chrono::NaiveDate>().ok()?;
                    let count = value.as_i64()?;
                    Some((date, count.max(0) as i32))
                })
                .collect(),
            _ => BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn make_snapshot(histogram: serde_json::Value, daily: serde_json::Value) -> Model {
        Model {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            provider: Provider::GitHub,
            captured_at: Utc::now().fixed_offset(),
            commits: 10,
            pull_requests: 2,
            issues: 1,
            repositories: 1,
            followers: 3,
            contributions: 40,
            language_histogram: histogram,
            histogram_kind: HistogramKind::Percent,
            daily_contributions: daily,
            solved_easy: 0,
            solved_medium: 0,
            solved_hard: 0,
            ranking: None,
            reputation: None,
        }
    }

    #[test]
    fn test_histogram_map_skips_non_numeric_values() {
        let snapshot = make_snapshot(
            serde_json::json!({"Rust": 60, "TypeScript": 30, "Broken": "n/a"}),
            serde_json::json!({}),
        );
        let map = snapshot.histogram_map();
        assert_eq!(map.get("Rust"), Some(&60));
        assert_eq!(map.get("TypeScript"), Some(&30));
        assert!(!map.contains_key("Broken"));
    }

    #[test]
    fn test_histogram_map_tolerates_non_object() {
        let snapshot = make_snapshot(serde_json::json!([1, 2, 3]), serde_json::json!({}));
        assert!(snapshot.histogram_map().is_empty());
    }

    #[test]
    fn test_daily_series_parses_and_clamps() {
        let snapshot = make_snapshot(
            serde_json::json!({}),
            serde_json::json!({"2026-03-01": 4, "2026-03-02": -1, "not-a-date": 7}),
        );
        let series = snapshot.daily_series();
        assert_eq!(series.len(), 2);
        assert_eq!(
            series.get(&"2026-03-01".parse::<chrono::NaiveDate>().unwrap()),
            Some(&4)
        );
        // Negative provider values never survive parsing
        assert_eq!(
            series.get(&"2026-03-02".parse::<chrono::NaiveDate>().unwrap()),
            Some(&0)
        );
    }
}
