//! Conversion from LeetCode API shapes to the provider-agnostic raw payload.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};

use crate::provider::{DailyCount, LeetCodeRawStats, Profile};

use super::error::LeetCodeError;
use super::types::MatchedUser;

/// Expand the sparse submission calendar into a dense daily series.
///
/// The provider sends a JSON *string* containing a `unixSeconds -> count`
/// map with only active days present. The dense series runs from the
/// earliest active day through `today`, with zeros filled in, so
/// downstream window sums never have to reason about gaps.
pub fn expand_submission_calendar(
    raw: &str,
    today: NaiveDate,
) -> Result<Vec<DailyCount>, LeetCodeError> {
    let sparse: BTreeMap<String, i64> = serde_json::from_str(raw)
        .map_err(|e| LeetCodeError::Parse(format!("submissionCalendar: {}", e)))?;

    let mut by_day: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for (timestamp, count) in sparse {
        let Ok(seconds) = timestamp.parse::<i64>() else {
            continue;
        };
        let Some(datetime) = DateTime::from_timestamp(seconds, 0) else {
            continue;
        };
        *by_day.entry(datetime.date_naive()).or_default() += count.max(0);
    }

    let Some((&first, _)) = by_day.first_key_value() else {
        return Ok(Vec::new());
    };
    let last = today.max(*by_day.last_key_value().map(|(d, _)| d).unwrap_or(&first));

    let mut dense = Vec::new();
    let mut day = first;
    while day <= last {
        dense.push(DailyCount {
            date: day,
            count: by_day.get(&day).copied().unwrap_or(0),
        });
        day += chrono::Duration::days(1);
    }

    Ok(dense)
}

/// Pull a difficulty bucket out of the accepted-submission stats.
fn solved_count(user: &MatchedUser, difficulty: &str) -> i64 {
    user.submit_stats
        .as_ref()
        .and_then(|stats| {
            stats
                .ac_submission_num
                .iter()
                .find(|bucket| bucket.difficulty.eq_ignore_ascii_case(difficulty))
        })
        .map_or(0, |bucket| bucket.count)
}

/// Build a [`Profile`] from the matched-user node.
pub fn to_profile(user: &MatchedUser) -> Profile {
    Profile {
        username: user.username.clone(),
        display_name: user.profile.as_ref().and_then(|p| p.real_name.clone()),
        avatar_url: user.profile.as_ref().and_then(|p| p.user_avatar.clone()),
        followers: 0,
        public_repos: 0,
    }
}

/// Convert a matched-user node into the raw LeetCode payload.
pub fn to_raw_stats(user: &MatchedUser, today: NaiveDate) -> LeetCodeRawStats {
    let calendar = match user.submission_calendar.as_deref() {
        Some(raw) => expand_submission_calendar(raw, today).unwrap_or_else(|e| {
            tracing::debug!("submission calendar unusable for {}: {}", user.username, e);
            Vec::new()
        }),
        None => Vec::new(),
    };

    let language_histogram = serde_json::Value::Object(
        user.language_problem_count
            .iter()
            .map(|entry| {
                (
                    entry.language_name.clone(),
                    serde_json::json!(entry.problems_solved),
                )
            })
            .collect(),
    );

    LeetCodeRawStats {
        solved_easy: solved_count(user, "Easy"),
        solved_medium: solved_count(user, "Medium"),
        solved_hard: solved_count(user, "Hard"),
        total_solved: solved_count(user, "All"),
        ranking: user.profile.as_ref().and_then(|p| p.ranking),
        reputation: user.profile.as_ref().and_then(|p| p.reputation),
        language_histogram,
        calendar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_expand_fills_gaps_with_zeros() {
        // 2026-01-01 and 2026-01-04, expanded through 2026-01-05
        let raw = r#"{"1767225600": 3, "1767484800": 1}"#;
        let dense = expand_submission_calendar(raw, date("2026-01-05")).unwrap();

        assert_eq!(dense.len(), 5);
        assert_eq!(dense[0].date, date("2026-01-01"));
        assert_eq!(dense[0].count, 3);
        assert_eq!(dense[1].count, 0);
        assert_eq!(dense[2].count, 0);
        assert_eq!(dense[3].count, 1);
        assert_eq!(dense[4].count, 0);
    }

    #[test]
    fn test_expand_empty_calendar() {
        let dense = expand_submission_calendar("{}", date("2026-01-05")).unwrap();
        assert!(dense.is_empty());
    }

    #[test]
    fn test_expand_rejects_non_json() {
        let err = expand_submission_calendar("not json", date("2026-01-05"));
        assert!(matches!(err, Err(LeetCodeError::Parse(_))));
    }

    #[test]
    fn test_expand_skips_garbage_keys() {
        let raw = r#"{"1767225600": 2, "garbage": 9}"#;
        let dense = expand_submission_calendar(raw, date("2026-01-01")).unwrap();
        assert_eq!(dense.len(), 1);
        assert_eq!(dense[0].count, 2);
    }

    fn matched_user() -> MatchedUser {
        serde_json::from_value(serde_json::json!({
            "username": "octo-lc",
            "profile": {"realName": "Octo", "userAvatar": null, "ranking": 54321, "reputation": 10},
            "submitStats": {"acSubmissionNum": [
                {"difficulty": "All", "count": 8},
                {"difficulty": "Easy", "count": 5},
                {"difficulty": "Medium", "count": 2},
                {"difficulty": "Hard", "count": 1}
            ]},
            "submissionCalendar": "{\"1767225600\": 3}",
            "languageProblemCount": [
                {"languageName": "Python3", "problemsSolved": 6},
                {"languageName": "Rust", "problemsSolved": 2}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_to_raw_stats_extracts_difficulty_buckets() {
        let raw = to_raw_stats(&matched_user(), date("2026-01-02"));
        assert_eq!(raw.solved_easy, 5);
        assert_eq!(raw.solved_medium, 2);
        assert_eq!(raw.solved_hard, 1);
        assert_eq!(raw.total_solved, 8);
        assert_eq!(raw.ranking, Some(54321));
        assert_eq!(raw.language_histogram["Python3"], 6);
        assert!(!raw.calendar.is_empty());
    }

    #[test]
    fn test_to_raw_stats_tolerates_missing_blocks() {
        let user: MatchedUser = serde_json::from_value(serde_json::json!({
            "username": "sparse-user"
        }))
        .unwrap();

        let raw = to_raw_stats(&user, date("2026-01-02"));
        assert_eq!(raw.solved_easy, 0);
        assert_eq!(raw.total_solved, 0);
        assert!(raw.ranking.is_none());
        assert!(raw.calendar.is_empty());
    }

    #[test]
    fn test_to_profile() {
        let profile = to_profile(&matched_user());
        assert_eq!(profile.username, "octo-lc");
        assert_eq!(profile.display_name.as_deref(), Some("Octo"));
    }
}
