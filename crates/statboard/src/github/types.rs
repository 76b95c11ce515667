//! GitHub API data types: the GraphQL wire shapes and the REST event
//! shape used by the approximation fallback.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The GraphQL query fetching a user's contribution collection, follower
/// count, repositories and per-repository language sizes in one round trip.
pub const CONTRIBUTIONS_QUERY: &str = r#"
query($login: String!) {
  user(login: $login) {
    followers { totalCount }
    repositories(first: 100, ownerAffiliations: OWNER, privacy: PUBLIC) {
      totalCount
      nodes {
        languages(first: 10, orderBy: {field: SIZE, direction: DESC}) {
          edges { size node { name } }
        }
      }
    }
    contributionsCollection {
      totalCommitContributions
      totalPullRequestContributions
      totalIssueContributions
      contributionCalendar {
        totalContributions
        weeks { contributionDays { date contributionCount } }
      }
    }
  }
}
"#;

/// Top-level GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlEnvelope {
    /// Query result; absent when the query failed outright.
    pub data: Option<GraphQlData>,
    /// Errors reported alongside (or instead of) data.
    #[serde(default)]
    pub errors: Vec<GraphQlErrorItem>,
}

/// One error entry from a GraphQL response.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorItem {
    /// Human-readable message.
    pub message: String,
    /// Machine-readable type, e.g. `NOT_FOUND`.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

/// The `data` object of the contributions query.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlData {
    /// The requested user; `None` when the login does not exist.
    pub user: Option<GraphQlUser>,
}

/// The queried user node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlUser {
    /// Follower connection (count only).
    pub followers: CountNode,
    /// Owned public repositories with language sizes.
    pub repositories: RepositoriesNode,
    /// The contribution collection for the default (last-year) range.
    pub contributions_collection: ContributionsCollection,
}

/// A connection node carrying only a total count.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountNode {
    pub total_count: i64,
}

/// Repository connection with per-repo language edges.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoriesNode {
    pub total_count: i64,
    #[serde(default)]
    pub nodes: Vec<RepositoryNode>,
}

/// One repository node.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryNode {
    /// Language sizes for the repository, if any.
    pub languages: Option<LanguagesNode>,
}

/// Language connection of a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesNode {
    #[serde(default)]
    pub edges: Vec<LanguageEdge>,
}

/// One language edge: byte size and name.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageEdge {
    pub size: i64,
    pub node: LanguageName,
}

/// A language name node.
#[derive(Debug, Clone, Deserialize)]
pub struct LanguageName {
    pub name: String,
}

/// The user's contribution collection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub total_commit_contributions: i64,
    pub total_pull_request_contributions: i64,
    pub total_issue_contributions: i64,
    pub contribution_calendar: ContributionCalendar,
}

/// The contribution calendar: total plus week-by-week daily counts.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: i64,
    #[serde(default)]
    pub weeks: Vec<CalendarWeek>,
}

/// One calendar week.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWeek {
    #[serde(default)]
    pub contribution_days: Vec<CalendarDay>,
}

/// One calendar day.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub contribution_count: i64,
}

/// A public timeline event from the REST events endpoint.
///
/// Only the fields the approximation fallback reads are modeled; the
/// payload stays dynamic because its shape varies per event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestEvent {
    /// Event type, e.g. `PushEvent`, `PullRequestEvent`, `IssuesEvent`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// When the event occurred.
    pub created_at: Option<DateTime<Utc>>,
    /// Event-type-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_user_response() {
        let body = serde_json::json!({
            "data": {
                "user": {
                    "followers": {"totalCount": 12},
                    "repositories": {"totalCount": 3, "nodes": []},
                    "contributionsCollection": {
                        "totalCommitContributions": 100,
                        "totalPullRequestContributions": 5,
                        "totalIssueContributions": 2,
                        "contributionCalendar": {
                            "totalContributions": 110,
                            "weeks": [
                                {"contributionDays": [
                                    {"date": "2026-03-01", "contributionCount": 4}
                                ]}
                            ]
                        }
                    }
                }
            }
        });

        let envelope: GraphQlEnvelope = serde_json::from_value(body).unwrap();
        let user = envelope.data.unwrap().user.unwrap();
        assert_eq!(user.followers.total_count, 12);
        assert_eq!(user.repositories.total_count, 3);
        assert_eq!(
            user.contributions_collection.total_commit_contributions,
            100
        );
        assert_eq!(
            user.contributions_collection.contribution_calendar.weeks[0].contribution_days[0]
                .contribution_count,
            4
        );
    }

    #[test]
    fn test_envelope_parses_not_found_errors() {
        let body = serde_json::json!({
            "data": {"user": null},
            "errors": [{"type": "NOT_FOUND", "message": "Could not resolve to a User"}]
        });

        let envelope: GraphQlEnvelope = serde_json::from_value(body).unwrap();
        assert!(envelope.data.unwrap().user.is_none());
        assert_eq!(envelope.errors[0].error_type.as_deref(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_rest_event_tolerates_missing_payload() {
        let event: RestEvent = serde_json::from_value(serde_json::json!({
            "type": "WatchEvent",
            "created_at": "2026-03-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(event.event_type, "WatchEvent");
        assert!(event.payload.is_null());
    }
}
