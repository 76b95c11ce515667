//! Conversion from GitHub API shapes to the provider-agnostic raw payload.

use std::collections::BTreeMap;

use crate::provider::{DailyCount, GitHubRawStats, Profile};

use super::types::{GraphQlUser, RestEvent};

/// Build a [`Profile`] from the REST `/users/{username}` payload.
///
/// GitHub omits fields for minimal accounts; everything defaults rather
/// than erroring.
pub fn to_profile(username: &str, raw: &serde_json::Value) -> Profile {
    Profile {
        username: raw
            .get("login")
            .and_then(|v| v.as_str())
            .unwrap_or(username)
            .to_string(),
        display_name: raw.get("name").and_then(|v| v.as_str()).map(String::from),
        avatar_url: raw
            .get("avatar_url")
            .and_then(|v| v.as_str())
            .map(String::from),
        followers: raw.get("followers").and_then(|v| v.as_i64()).unwrap_or(0),
        public_repos: raw
            .get("public_repos")
            .and_then(|v| v.as_i64())
            .unwrap_or(0),
    }
}

/// Aggregate per-repository language sizes into a percentage histogram.
///
/// Percentages are rounded and need not sum to exactly 100.
fn language_percentages(user: &GraphQlUser) -> serde_json::Value {
    let mut sizes: BTreeMap<String, i64> = BTreeMap::new();
    for repo in &user.repositories.nodes {
        let Some(languages) = &repo.languages else {
            continue;
        };
        for edge in &languages.edges {
            *sizes.entry(edge.node.name.clone()).or_default() += edge.size.max(0);
        }
    }

    let total: i64 = sizes.values().sum();
    if total == 0 {
        return serde_json::json!({});
    }

    serde_json::Value::Object(
        sizes
            .into_iter()
            .map(|(name, size)| {
                let percent = (size as f64 / total as f64 * 100.0).round() as i64;
                (name, serde_json::json!(percent))
            })
            .collect(),
    )
}

/// Convert a GraphQL user node into the raw GitHub payload.
pub fn to_raw_stats(user: &GraphQlUser) -> GitHubRawStats {
    let collection = &user.contributions_collection;

    let calendar: Vec<DailyCount> = collection
        .contribution_calendar
        .weeks
        .iter()
        .flat_map(|week| &week.contribution_days)
        .map(|day| DailyCount {
            date: day.date,
            count: day.contribution_count,
        })
        .collect();

    GitHubRawStats {
        commits: collection.total_commit_contributions,
        pull_requests: collection.total_pull_request_contributions,
        issues: collection.total_issue_contributions,
        repositories: user.repositories.total_count,
        followers: user.followers.total_count,
        contributions: collection.contribution_calendar.total_contributions,
        language_histogram: language_percentages(user),
        calendar,
        approximated: false,
    }
}

/// Approximate contribution counters from the public events feed.
///
/// Used when the GraphQL call fails: one page of recent events yields
/// rough commit/PR/issue counts and a sparse calendar, while the REST
/// profile supplies repository and follower counts. The language
/// histogram is left empty rather than guessed.
pub fn approximate_from_events(profile: &Profile, events: &[RestEvent]) -> GitHubRawStats {
    let mut commits = 0i64;
    let mut pull_requests = 0i64;
    let mut issues = 0i64;
    let mut by_day: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();

    for event in events {
        let weight = match event.event_type.as_str() {
            // A push event carries its commit count in the payload
            "PushEvent" => {
                let count = event
                    .payload
                    .get("size")
                    .and_then(|v| v.as_i64())
                    .unwrap_or(1)
                    .max(0);
                commits += count;
                count
            }
            "PullRequestEvent" => {
                let opened = event
                    .payload
                    .get("action")
                    .and_then(|v| v.as_str())
                    .is_some_and(|a| a == "opened");
                if opened {
                    pull_requests += 1;
                    1
                } else {
                    0
                }
            }
            "IssuesEvent" => {
                let opened = event
                    .payload
                    .get("action")
                    .and_then(|v| v.as_str())
                    .is_some_and(|a| a == "opened");
                if opened {
                    issues += 1;
                    1
                } else {
                    0
                }
            }
            _ => 0,
        };

        if weight > 0
            && let Some(created_at) = event.created_at
        {
            *by_day.entry(created_at.date_naive()).or_default() += weight;
        }
    }

    let contributions = commits + pull_requests + issues;

    GitHubRawStats {
        commits,
        pull_requests,
        issues,
        repositories: profile.public_repos,
        followers: profile.followers,
        contributions,
        language_histogram: serde_json::json!({}),
        calendar: by_day
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect(),
        approximated: true,
    }
}
