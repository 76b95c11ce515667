//! LeetCode GraphQL wire shapes.

use serde::Deserialize;

/// The public GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://leetcode.com/graphql";

/// The query fetching everything the sync needs in one round trip:
/// solved counts by difficulty, profile ranking/reputation, the
/// submission calendar and the per-language solved counts.
pub const MATCHED_USER_QUERY: &str = r#"
query($username: String!) {
  matchedUser(username: $username) {
    username
    profile { realName userAvatar ranking reputation }
    submitStats { acSubmissionNum { difficulty count } }
    submissionCalendar
    languageProblemCount { languageName problemsSolved }
  }
}
"#;

/// Top-level GraphQL response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlEnvelope {
    /// Query result; absent when the query failed outright.
    pub data: Option<MatchedUserData>,
    /// Errors reported alongside (or instead of) data.
    #[serde(default)]
    pub errors: Vec<GraphQlErrorItem>,
}

/// One error entry from a GraphQL response.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlErrorItem {
    /// Human-readable message.
    pub message: String,
}

/// The `data` object of the matched-user query.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUserData {
    /// The requested user; `None` when the username does not exist.
    pub matched_user: Option<MatchedUser>,
}

/// The matched user node.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    /// Username as LeetCode knows it.
    pub username: String,
    /// Profile block with ranking and reputation.
    pub profile: Option<UserProfile>,
    /// Accepted-submission counters by difficulty.
    pub submit_stats: Option<SubmitStats>,
    /// Sparse `unixSeconds -> count` map, serialized as a JSON *string*.
    pub submission_calendar: Option<String>,
    /// Solved-problem counts per language.
    #[serde(default)]
    pub language_problem_count: Vec<LanguageProblemCount>,
}

/// The profile block.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub real_name: Option<String>,
    pub user_avatar: Option<String>,
    pub ranking: Option<i64>,
    pub reputation: Option<i64>,
}

/// Accepted-submission statistics.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    #[serde(default)]
    pub ac_submission_num: Vec<DifficultyCount>,
}

/// One difficulty bucket: "All", "Easy", "Medium" or "Hard".
#[derive(Debug, Clone, Deserialize)]
pub struct DifficultyCount {
    pub difficulty: String,
    pub count: i64,
}

/// Solved-problem count for one language.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageProblemCount {
    pub language_name: String,
    pub problems_solved: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_matched_user() {
        let body = serde_json::json!({
            "data": {
                "matchedUser": {
                    "username": "octo-lc",
                    "profile": {"realName": "Octo", "userAvatar": null, "ranking": 54321, "reputation": 10},
                    "submitStats": {"acSubmissionNum": [
                        {"difficulty": "All", "count": 8, "submissions": 20},
                        {"difficulty": "Easy", "count": 5, "submissions": 9},
                        {"difficulty": "Medium", "count": 2, "submissions": 7},
                        {"difficulty": "Hard", "count": 1, "submissions": 4}
                    ]},
                    "submissionCalendar": "{\"1767225600\": 3}",
                    "languageProblemCount": [
                        {"languageName": "Python3", "problemsSolved": 6}
                    ]
                }
            }
        });

        let envelope: GraphQlEnvelope = serde_json::from_value(body).unwrap();
        let user = envelope.data.unwrap().matched_user.unwrap();
        assert_eq!(user.username, "octo-lc");
        assert_eq!(user.profile.as_ref().unwrap().ranking, Some(54321));
        assert_eq!(user.submit_stats.unwrap().ac_submission_num.len(), 4);
        assert_eq!(user.language_problem_count[0].problems_solved, 6);
    }

    #[test]
    fn test_envelope_parses_missing_user() {
        let body = serde_json::json!({
            "data": {"matchedUser": null},
            "errors": [{"message": "That user does not exist."}]
        });

        let envelope: GraphQlEnvelope = serde_json::from_value(body).unwrap();
        assert!(envelope.data.unwrap().matched_user.is_none());
        assert_eq!(envelope.errors.len(), 1);
    }
}
