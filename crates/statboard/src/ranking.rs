//! Deterministic point scoring and rank computation over member stat sets.
//!
//! All scoring formulas live here and nowhere else. Ranking is a pure
//! function of its inputs: identical input sets produce identical output,
//! and ties are always broken by member id, never by insertion order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Composite GitHub points: commits ×1, pull requests ×5, issues ×2,
/// repositories ×3.
pub fn github_points(commits: i32, pull_requests: i32, issues: i32, repositories: i32) -> i64 {
    i64::from(commits) + i64::from(pull_requests) * 5 + i64::from(issues) * 2
        + i64::from(repositories) * 3
}

/// Composite LeetCode points: easy ×2, medium ×4, hard ×6.
pub fn leetcode_points(easy: i32, medium: i32, hard: i32) -> i64 {
    i64::from(easy) * 2 + i64::from(medium) * 4 + i64::from(hard) * 6
}

/// A scoring dimension for leaderboards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Commit count.
    Commits,
    /// Pull request count.
    PullRequests,
    /// Issue count.
    Issues,
    /// Total calendar contributions across providers.
    Contributions,
    /// Portal-awarded experience (stored scalar, no formula).
    Experience,
    /// Daily activity streak (stored scalar, no formula).
    Streak,
    /// GitHub composite points.
    GitHub,
    /// LeetCode difficulty-weighted points.
    LeetCode,
    /// GitHub + LeetCode composite points.
    Combined,
}

impl Dimension {
    /// All dimensions, in a stable order. Used to enumerate leaderboard
    /// cache keys for invalidation.
    pub const ALL: [Dimension; 9] = [
        Dimension::Commits,
        Dimension::PullRequests,
        Dimension::Issues,
        Dimension::Contributions,
        Dimension::Experience,
        Dimension::Streak,
        Dimension::GitHub,
        Dimension::LeetCode,
        Dimension::Combined,
    ];
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Dimension::Commits => "commits",
            Dimension::PullRequests => "pull_requests",
            Dimension::Issues => "issues",
            Dimension::Contributions => "contributions",
            Dimension::Experience => "experience",
            Dimension::Streak => "streak",
            Dimension::GitHub => "github",
            Dimension::LeetCode => "leetcode",
            Dimension::Combined => "combined",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "commits" => Ok(Dimension::Commits),
            "pull_requests" | "prs" => Ok(Dimension::PullRequests),
            "issues" => Ok(Dimension::Issues),
            "contributions" => Ok(Dimension::Contributions),
            "experience" | "xp" => Ok(Dimension::Experience),
            "streak" => Ok(Dimension::Streak),
            "github" => Ok(Dimension::GitHub),
            "leetcode" => Ok(Dimension::LeetCode),
            "combined" => Ok(Dimension::Combined),
            _ => Err(format!("Unknown dimension: {}", s)),
        }
    }
}

/// A scoring time window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Today only.
    Daily,
    /// The last 7 days.
    Weekly,
    /// The last 30 days.
    Monthly,
    /// No window; snapshot totals.
    AllTime,
}

impl Period {
    /// All periods, in a stable order.
    pub const ALL: [Period; 4] = [
        Period::Daily,
        Period::Weekly,
        Period::Monthly,
        Period::AllTime,
    ];

    /// Window length in days; `None` for all-time.
    pub fn window_days(&self) -> Option<i64> {
        match self {
            Period::Daily => Some(1),
            Period::Weekly => Some(7),
            Period::Monthly => Some(30),
            Period::AllTime => None,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::AllTime => "all_time",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(Period::Daily),
            "weekly" | "week" => Ok(Period::Weekly),
            "monthly" | "month" => Ok(Period::Monthly),
            "all_time" | "alltime" | "all" => Ok(Period::AllTime),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}

/// Per-provider counters for one member, as fed into ranking.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderCounters {
    /// Commit contributions.
    pub commits: i32,
    /// Pull requests opened.
    pub pull_requests: i32,
    /// Issues opened.
    pub issues: i32,
    /// Public repositories owned.
    pub repositories: i32,
    /// Total calendar contributions.
    pub contributions: i32,
    /// Problems solved, easy.
    pub solved_easy: i32,
    /// Problems solved, medium.
    pub solved_medium: i32,
    /// Problems solved, hard.
    pub solved_hard: i32,
    /// Dense daily contribution series for windowed periods.
    pub daily: BTreeMap<NaiveDate, i32>,
}

impl ProviderCounters {
    /// GitHub composite points for these counters.
    pub fn github_composite(&self) -> i64 {
        github_points(
            self.commits,
            self.pull_requests,
            self.issues,
            self.repositories,
        )
    }

    /// LeetCode composite points for these counters.
    pub fn leetcode_composite(&self) -> i64 {
        leetcode_points(self.solved_easy, self.solved_medium, self.solved_hard)
    }

    /// Sum of the daily series over the last `days` days ending at `today`.
    fn window_sum(&self, days: i64, today: NaiveDate) -> i64 {
        let first = today - chrono::Duration::days(days - 1);
        self.daily
            .range(first..=today)
            .map(|(_, count)| i64::from(*count))
            .sum()
    }
}

/// The full stat set for one member, as fed into [`rank`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SubjectStats {
    /// Member id; the deterministic tie-breaker.
    pub member_id: Uuid,
    /// Display handle, carried through to the ranked entry.
    pub handle: String,
    /// GitHub counters; `None` when no snapshot exists.
    pub github: Option<ProviderCounters>,
    /// LeetCode counters; `None` when no snapshot exists.
    pub leetcode: Option<ProviderCounters>,
    /// Portal-awarded experience.
    pub experience: i32,
    /// Daily activity streak.
    pub streak: i32,
}

impl SubjectStats {
    /// Whether the member has a stat relation for at least one provider.
    pub fn has_stats(&self) -> bool {
        self.github.is_some() || self.leetcode.is_some()
    }

    /// Combined composite points over the present stat blocks.
    pub fn combined_points(&self) -> i64 {
        let github = self.github.as_ref().map_or(0, ProviderCounters::github_composite);
        let leetcode = self
            .leetcode
            .as_ref()
            .map_or(0, ProviderCounters::leetcode_composite);
        github + leetcode
    }
}

/// One row of a computed leaderboard.
///
/// Never persisted except through the leaderboard cache; always derived
/// from the underlying stat set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based rank; `None` for members retained for profile-only views
    /// (no stats, or zero combined total).
    pub rank: Option<u32>,
    /// Member id.
    pub member_id: Uuid,
    /// Display handle.
    pub handle: String,
    /// The value scored for the requested dimension and period.
    pub value: i64,
    /// Combined composite points, for display alongside any dimension.
    pub points: i64,
}

/// The value a subject scores for a dimension within a period.
fn dimension_value(subject: &SubjectStats, dimension: Dimension, period: Period, today: NaiveDate) -> i64 {
    let github = subject.github.as_ref();
    let leetcode = subject.leetcode.as_ref();

    // Scalars carry no time series and ignore the period.
    match dimension {
        Dimension::Experience => return i64::from(subject.experience),
        Dimension::Streak => return i64::from(subject.streak),
        _ => {}
    }

    match period.window_days() {
        None => match dimension {
            Dimension::Commits => github.map_or(0, |c| i64::from(c.commits)),
            Dimension::PullRequests => github.map_or(0, |c| i64::from(c.pull_requests)),
            Dimension::Issues => github.map_or(0, |c| i64::from(c.issues)),
            Dimension::Contributions => {
                github.map_or(0, |c| i64::from(c.contributions))
                    + leetcode.map_or(0, |c| i64::from(c.contributions))
            }
            Dimension::GitHub => github.map_or(0, ProviderCounters::github_composite),
            Dimension::LeetCode => leetcode.map_or(0, ProviderCounters::leetcode_composite),
            Dimension::Combined => subject.combined_points(),
            Dimension::Experience | Dimension::Streak => unreachable!(),
        },
        // Bounded periods score windowed activity from the daily series;
        // the calendar does not split by contribution type, so every
        // GitHub-backed dimension windows over the same series.
        Some(days) => match dimension {
            Dimension::Commits
            | Dimension::PullRequests
            | Dimension::Issues
            | Dimension::GitHub => github.map_or(0, |c| c.window_sum(days, today)),
            Dimension::LeetCode => leetcode.map_or(0, |c| c.window_sum(days, today)),
            Dimension::Contributions | Dimension::Combined => {
                github.map_or(0, |c| c.window_sum(days, today))
                    + leetcode.map_or(0, |c| c.window_sum(days, today))
            }
            Dimension::Experience | Dimension::Streak => unreachable!(),
        },
    }
}

/// Rank a stat set for a dimension and period.
///
/// Members with at least one stat block and a non-zero combined total are
/// ranked 1..N by value descending, ties broken by member id ascending.
/// Remaining members are appended unranked (`rank: None`) so profile
/// views can still display their values.
pub fn rank(
    subjects: &[SubjectStats],
    dimension: Dimension,
    period: Period,
    today: NaiveDate,
) -> Vec<RankedEntry> {
    let mut qualified: Vec<RankedEntry> = Vec::new();
    let mut unranked: Vec<RankedEntry> = Vec::new();

    for subject in subjects {
        let entry = RankedEntry {
            rank: None,
            member_id: subject.member_id,
            handle: subject.handle.clone(),
            value: dimension_value(subject, dimension, period, today),
            points: subject.combined_points(),
        };

        if subject.has_stats() && subject.combined_points() > 0 {
            qualified.push(entry);
        } else {
            unranked.push(entry);
        }
    }

    qualified.sort_by(|a, b| b.value.cmp(&a.value).then(a.member_id.cmp(&b.member_id)));
    for (index, entry) in qualified.iter_mut().enumerate() {
        entry.rank = Some(index as u32 + 1);
    }

    unranked.sort_by(|a, b| a.member_id.cmp(&b.member_id));
    qualified.extend(unranked);
    qualified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uuid(n: u8) -> Uuid {
        Uuid::from_bytes([n; 16])
    }

    fn github_counters(commits: i32, prs: i32, issues: i32, repos: i32) -> ProviderCounters {
        ProviderCounters {
            commits,
            pull_requests: prs,
            issues,
            repositories: repos,
            contributions: commits + prs + issues,
            ..ProviderCounters::default()
        }
    }

    fn leetcode_counters(easy: i32, medium: i32, hard: i32) -> ProviderCounters {
        ProviderCounters {
            solved_easy: easy,
            solved_medium: medium,
            solved_hard: hard,
            contributions: easy + medium + hard,
            ..ProviderCounters::default()
        }
    }

    fn subject(n: u8, github: Option<ProviderCounters>, leetcode: Option<ProviderCounters>) -> SubjectStats {
        SubjectStats {
            member_id: uuid(n),
            handle: format!("member-{}", n),
            github,
            leetcode,
            experience: 0,
            streak: 0,
        }
    }

    fn today() -> NaiveDate {
        "2026-03-15".parse().unwrap()
    }

    #[test]
    fn test_github_points_formula() {
        assert_eq!(github_points(10, 2, 1, 1), 25);
        assert_eq!(github_points(0, 0, 0, 0), 0);
    }

    #[test]
    fn test_leetcode_points_formula() {
        assert_eq!(leetcode_points(5, 2, 1), 24);
        assert_eq!(leetcode_points(0, 0, 0), 0);
    }

    #[test]
    fn test_rank_orders_by_value_descending() {
        let subjects = vec![
            subject(1, Some(github_counters(5, 0, 0, 0)), None),
            subject(2, Some(github_counters(20, 0, 0, 0)), None),
            subject(3, Some(github_counters(10, 0, 0, 0)), None),
        ];

        let ranked = rank(&subjects, Dimension::Commits, Period::AllTime, today());
        assert_eq!(ranked[0].member_id, uuid(2));
        assert_eq!(ranked[0].rank, Some(1));
        assert_eq!(ranked[1].member_id, uuid(3));
        assert_eq!(ranked[1].rank, Some(2));
        assert_eq!(ranked[2].member_id, uuid(1));
        assert_eq!(ranked[2].rank, Some(3));
    }

    #[test]
    fn test_rank_breaks_ties_by_member_id() {
        let subjects = vec![
            subject(9, Some(github_counters(10, 0, 0, 0)), None),
            subject(1, Some(github_counters(10, 0, 0, 0)), None),
        ];

        let ranked = rank(&subjects, Dimension::Commits, Period::AllTime, today());
        assert_eq!(ranked[0].member_id, uuid(1));
        assert_eq!(ranked[1].member_id, uuid(9));
    }

    #[test]
    fn test_rank_is_idempotent() {
        let subjects = vec![
            subject(3, Some(github_counters(7, 1, 2, 0)), Some(leetcode_counters(4, 1, 0))),
            subject(1, Some(github_counters(7, 1, 2, 0)), None),
            subject(2, None, Some(leetcode_counters(9, 3, 1))),
        ];

        let first = rank(&subjects, Dimension::Combined, Period::AllTime, today());
        let second = rank(&subjects, Dimension::Combined, Period::AllTime, today());
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_total_subjects_are_retained_unranked() {
        let subjects = vec![
            subject(1, Some(github_counters(10, 0, 0, 0)), None),
            subject(2, Some(github_counters(0, 0, 0, 0)), None),
            subject(3, None, None),
        ];

        let ranked = rank(&subjects, Dimension::Combined, Period::AllTime, today());
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].member_id, uuid(1));
        assert_eq!(ranked[0].rank, Some(1));
        assert_eq!(ranked[1].rank, None);
        assert_eq!(ranked[2].rank, None);
    }

    #[test]
    fn test_combined_sums_both_providers() {
        let subjects = vec![subject(
            1,
            Some(github_counters(10, 2, 1, 1)),
            Some(leetcode_counters(5, 2, 1)),
        )];

        let ranked = rank(&subjects, Dimension::Combined, Period::AllTime, today());
        assert_eq!(ranked[0].value, 25 + 24);
        assert_eq!(ranked[0].points, 25 + 24);
    }

    #[test]
    fn test_windowed_period_sums_daily_series() {
        let mut counters = github_counters(100, 0, 0, 0);
        counters.daily = [
            ("2026-03-15", 3),
            ("2026-03-10", 4),
            ("2026-03-01", 9),
            ("2026-02-01", 50),
        ]
        .into_iter()
        .map(|(d, c)| (d.parse::<NaiveDate>().unwrap(), c))
        .collect();

        let subjects = vec![subject(1, Some(counters), None)];

        let daily = rank(&subjects, Dimension::Commits, Period::Daily, today());
        assert_eq!(daily[0].value, 3);

        let weekly = rank(&subjects, Dimension::Commits, Period::Weekly, today());
        assert_eq!(weekly[0].value, 7);

        let monthly = rank(&subjects, Dimension::Commits, Period::Monthly, today());
        assert_eq!(monthly[0].value, 16);

        let all_time = rank(&subjects, Dimension::Commits, Period::AllTime, today());
        assert_eq!(all_time[0].value, 100);
    }

    #[test]
    fn test_scalar_dimensions_ignore_period() {
        let mut s = subject(1, Some(github_counters(1, 0, 0, 0)), None);
        s.experience = 340;
        s.streak = 12;
        let subjects = vec![s];

        let xp = rank(&subjects, Dimension::Experience, Period::Weekly, today());
        assert_eq!(xp[0].value, 340);

        let streak = rank(&subjects, Dimension::Streak, Period::Daily, today());
        assert_eq!(streak[0].value, 12);
    }

    #[test]
    fn test_dimension_and_period_round_trip_strings() {
        for dimension in Dimension::ALL {
            let parsed: Dimension = dimension.to_string().parse().unwrap();
            assert_eq!(parsed, dimension);
        }
        for period in Period::ALL {
            let parsed: Period = period.to_string().parse().unwrap();
            assert_eq!(parsed, period);
        }
    }
}
