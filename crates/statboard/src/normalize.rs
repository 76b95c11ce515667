//! Stat normalizer: converts raw provider payloads into the canonical
//! snapshot shape.
//!
//! `normalize` is a pure function. It tolerates partial or missing fields
//! (defaulting to zero), coerces negative or non-numeric values to zero
//! rather than propagating invalid state, and filters malformed language
//! histogram keys observed in the wild.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::Set;
use uuid::Uuid;

use crate::entity::bootcamp_participant::StatBlock;
use crate::entity::contribution_snapshot::{
    ActiveModel as ContributionSnapshotActiveModel, HistogramKind,
};
use crate::entity::provider::Provider;
use crate::provider::{DailyCount, RawContributions};
use crate::ranking::ProviderCounters;

/// Longest accepted language name. Longer keys are upstream garbage.
const MAX_LANGUAGE_NAME_LEN: usize = 49;

/// The canonical, validated stat shape produced by [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedStats {
    /// Provider the stats came from.
    pub provider: Provider,
    /// Commit contributions.
    pub commits: i32,
    /// Pull requests opened.
    pub pull_requests: i32,
    /// Issues opened.
    pub issues: i32,
    /// Public repositories owned.
    pub repositories: i32,
    /// Follower count.
    pub followers: i32,
    /// Total calendar contributions.
    pub contributions: i32,
    /// Filtered language histogram.
    pub language_histogram: BTreeMap<String, i64>,
    /// How the histogram values are to be read.
    pub histogram_kind: HistogramKind,
    /// Dense daily contribution series.
    pub daily_contributions: BTreeMap<NaiveDate, i32>,
    /// Problems solved, easy.
    pub solved_easy: i32,
    /// Problems solved, medium.
    pub solved_medium: i32,
    /// Problems solved, hard.
    pub solved_hard: i32,
    /// Provider-reported ranking, if any.
    pub ranking: Option<i64>,
    /// Provider-reported reputation, if any.
    pub reputation: Option<i64>,
}

impl NormalizedStats {
    /// The counters a bootcamp scores, extracted from this snapshot.
    pub fn stat_block(&self) -> StatBlock {
        StatBlock {
            commits: self.commits,
            pull_requests: self.pull_requests,
            issues: self.issues,
            repositories: self.repositories,
            contributions: self.contributions,
            solved_easy: self.solved_easy,
            solved_medium: self.solved_medium,
            solved_hard: self.solved_hard,
        }
    }

    /// The counters the ranking engine consumes.
    pub fn counters(&self) -> ProviderCounters {
        ProviderCounters {
            commits: self.commits,
            pull_requests: self.pull_requests,
            issues: self.issues,
            repositories: self.repositories,
            contributions: self.contributions,
            solved_easy: self.solved_easy,
            solved_medium: self.solved_medium,
            solved_hard: self.solved_hard,
            daily: self.daily_contributions.clone(),
        }
    }

    /// Build the insertable snapshot row for a member.
    pub fn into_active_model(
        self,
        member_id: Uuid,
        captured_at: chrono::DateTime<chrono::Utc>,
    ) -> ContributionSnapshotActiveModel {
        let histogram = serde_json::Value::Object(
            self.language_histogram
                .iter()
                .map(|(name, value)| (name.clone(), serde_json::json!(value)))
                .collect(),
        );
        let daily = serde_json::Value::Object(
            self.daily_contributions
                .iter()
                .map(|(date, count)| (date.to_string(), serde_json::json!(count)))
                .collect(),
        );

        ContributionSnapshotActiveModel {
            id: Set(Uuid::new_v4()),
            member_id: Set(member_id),
            provider: Set(self.provider),
            captured_at: Set(captured_at.fixed_offset()),
            commits: Set(self.commits),
            pull_requests: Set(self.pull_requests),
            issues: Set(self.issues),
            repositories: Set(self.repositories),
            followers: Set(self.followers),
            contributions: Set(self.contributions),
            language_histogram: Set(histogram),
            histogram_kind: Set(self.histogram_kind),
            daily_contributions: Set(daily),
            solved_easy: Set(self.solved_easy),
            solved_medium: Set(self.solved_medium),
            solved_hard: Set(self.solved_hard),
            ranking: Set(self.ranking),
            reputation: Set(self.reputation),
        }
    }
}

/// Clamp a raw provider counter into a valid snapshot count.
fn clamp_count(raw: i64) -> i32 {
    raw.clamp(0, i64::from(i32::MAX)) as i32
}

/// Filter a raw language histogram into a clean name -> value map.
///
/// Upstream payloads have been observed to contain percent-sign keys
/// ("50%"), empty names, and absurdly long strings; those entries are
/// dropped. Non-numeric values are dropped, negative values clamp to 0.
fn filter_histogram(raw: &serde_json::Value) -> BTreeMap<String, i64> {
    let serde_json::Value::Object(map) = raw else {
        return BTreeMap::new();
    };

    map.iter()
        .filter(|(name, _)| {
            !name.is_empty() && name.len() <= MAX_LANGUAGE_NAME_LEN && !name.contains('%')
        })
        .filter_map(|(name, value)| {
            let number = value
                .as_i64()
                .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))?;
            Some((name.clone(), number.max(0)))
        })
        .collect()
}

/// Collapse a daily series into an ordered map, clamping negatives.
///
/// Duplicate dates keep the last reported value.
fn clean_daily_series(calendar: &[DailyCount]) -> BTreeMap<NaiveDate, i32> {
    calendar
        .iter()
        .map(|day| (day.date, clamp_count(day.count)))
        .collect()
}

/// Normalize a raw provider payload into the canonical snapshot shape.
pub fn normalize(raw: &RawContributions) -> NormalizedStats {
    match raw {
        RawContributions::GitHub(stats) => NormalizedStats {
            provider: Provider::GitHub,
            commits: clamp_count(stats.commits),
            pull_requests: clamp_count(stats.pull_requests),
            issues: clamp_count(stats.issues),
            repositories: clamp_count(stats.repositories),
            followers: clamp_count(stats.followers),
            contributions: clamp_count(stats.contributions),
            language_histogram: filter_histogram(&stats.language_histogram),
            histogram_kind: HistogramKind::Percent,
            daily_contributions: clean_daily_series(&stats.calendar),
            solved_easy: 0,
            solved_medium: 0,
            solved_hard: 0,
            ranking: None,
            reputation: None,
        },
        RawContributions::LeetCode(stats) => NormalizedStats {
            provider: Provider::LeetCode,
            commits: 0,
            pull_requests: 0,
            issues: 0,
            repositories: 0,
            followers: 0,
            contributions: clamp_count(stats.total_solved),
            language_histogram: filter_histogram(&stats.language_histogram),
            histogram_kind: HistogramKind::Count,
            daily_contributions: clean_daily_series(&stats.calendar),
            solved_easy: clamp_count(stats.solved_easy),
            solved_medium: clamp_count(stats.solved_medium),
            solved_hard: clamp_count(stats.solved_hard),
            ranking: stats.ranking.filter(|r| *r >= 0),
            reputation: stats.reputation,
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::provider::{GitHubRawStats, LeetCodeRawStats};

    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_github_counters_clamp_negatives() {
        let raw = RawContributions::GitHub(GitHubRawStats {
            commits: -5,
            pull_requests: 3,
            issues: -1,
            repositories: 2,
            followers: 7,
            contributions: 40,
            ..GitHubRawStats::default()
        });

        let stats = normalize(&raw);
        assert_eq!(stats.commits, 0);
        assert_eq!(stats.pull_requests, 3);
        assert_eq!(stats.issues, 0);
        assert_eq!(stats.repositories, 2);
        assert_eq!(stats.followers, 7);
        assert_eq!(stats.contributions, 40);
        assert_eq!(stats.histogram_kind, HistogramKind::Percent);
    }

    #[test]
    fn test_leetcode_counters_default_to_zero() {
        let raw = RawContributions::LeetCode(LeetCodeRawStats {
            solved_easy: 5,
            solved_medium: 2,
            solved_hard: 1,
            total_solved: 8,
            ranking: Some(120_000),
            reputation: Some(15),
            ..LeetCodeRawStats::default()
        });

        let stats = normalize(&raw);
        assert_eq!(stats.solved_easy, 5);
        assert_eq!(stats.solved_medium, 2);
        assert_eq!(stats.solved_hard, 1);
        assert_eq!(stats.commits, 0);
        assert_eq!(stats.contributions, 8);
        assert_eq!(stats.ranking, Some(120_000));
        assert_eq!(stats.histogram_kind, HistogramKind::Count);
    }

    #[test]
    fn test_histogram_filter_drops_malformed_names() {
        let raw = RawContributions::GitHub(GitHubRawStats {
            language_histogram: serde_json::json!({
                "TypeScript": 30,
                "50%": 12,
                "": 5,
                "x".repeat(60): 9,
                "Rust": 60.4,
            }),
            ..GitHubRawStats::default()
        });

        let stats = normalize(&raw);
        assert_eq!(stats.language_histogram.get("TypeScript"), Some(&30));
        assert_eq!(stats.language_histogram.get("Rust"), Some(&60));
        assert_eq!(stats.language_histogram.len(), 2);
    }

    #[test]
    fn test_histogram_filter_accepts_forty_nine_char_names() {
        let name_49 = "y".repeat(49);
        let name_50 = "z".repeat(50);
        let raw = RawContributions::GitHub(GitHubRawStats {
            language_histogram: serde_json::json!({
                name_49.clone(): 1,
                name_50: 1,
            }),
            ..GitHubRawStats::default()
        });

        let stats = normalize(&raw);
        assert!(stats.language_histogram.contains_key(&name_49));
        assert_eq!(stats.language_histogram.len(), 1);
    }

    #[test]
    fn test_histogram_filter_coerces_bad_values() {
        let raw = RawContributions::LeetCode(LeetCodeRawStats {
            language_histogram: serde_json::json!({
                "Python": -3,
                "Java": "many",
                "C++": 11,
            }),
            ..LeetCodeRawStats::default()
        });

        let stats = normalize(&raw);
        assert_eq!(stats.language_histogram.get("Python"), Some(&0));
        assert_eq!(stats.language_histogram.get("C++"), Some(&11));
        assert!(!stats.language_histogram.contains_key("Java"));
    }

    #[test]
    fn test_daily_series_is_ordered_and_clamped() {
        let raw = RawContributions::GitHub(GitHubRawStats {
            calendar: vec![
                DailyCount {
                    date: date("2026-03-02"),
                    count: 4,
                },
                DailyCount {
                    date: date("2026-03-01"),
                    count: -2,
                },
            ],
            ..GitHubRawStats::default()
        });

        let stats = normalize(&raw);
        assert_eq!(stats.daily_contributions.get(&date("2026-03-01")), Some(&0));
        assert_eq!(stats.daily_contributions.get(&date("2026-03-02")), Some(&4));
        let dates: Vec<_> = stats.daily_contributions.keys().collect();
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_stat_block_extraction() {
        let raw = RawContributions::GitHub(GitHubRawStats {
            commits: 10,
            pull_requests: 2,
            issues: 1,
            repositories: 1,
            ..GitHubRawStats::default()
        });

        let block = normalize(&raw).stat_block();
        assert_eq!(block.points(Provider::GitHub), 25);
    }

    #[test]
    fn test_into_active_model_serializes_maps() {
        let raw = RawContributions::GitHub(GitHubRawStats {
            commits: 3,
            language_histogram: serde_json::json!({"Rust": 100}),
            calendar: vec![DailyCount {
                date: date("2026-03-01"),
                count: 3,
            }],
            ..GitHubRawStats::default()
        });

        let member_id = Uuid::new_v4();
        let model = normalize(&raw).into_active_model(member_id, chrono::Utc::now());

        let sea_orm::ActiveValue::Set(histogram) = &model.language_histogram else {
            panic!("histogram not set");
        };
        assert_eq!(histogram["Rust"], 100);

        let sea_orm::ActiveValue::Set(daily) = &model.daily_contributions else {
            panic!("daily not set");
        };
        assert_eq!(daily["2026-03-01"], 3);
    }
}
