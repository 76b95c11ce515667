//! Shared helpers for integration tests: an in-memory database and a
//! scripted provider client.
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;

use statboard::connect_and_migrate;
use statboard::entity::member::{ActiveModel as MemberActiveModel, Model as MemberModel};
use statboard::entity::provider::Provider;
use statboard::provider::{
    GitHubRawStats, LeetCodeRawStats, Profile, ProviderClient, ProviderError, RawContributions,
    Result as ProviderResult,
};

/// Create an in-memory SQLite database with migrations applied.
pub async fn setup_db() -> DatabaseConnection {
    connect_and_migrate("sqlite::memory:")
        .await
        .expect("test database should migrate")
}

/// Insert a member with the given provider usernames.
pub async fn insert_member(
    db: &DatabaseConnection,
    handle: &str,
    github: Option<&str>,
    leetcode: Option<&str>,
) -> MemberModel {
    let model = MemberActiveModel {
        id: Set(Uuid::new_v4()),
        handle: Set(handle.to_string()),
        github_username: Set(github.map(String::from)),
        leetcode_username: Set(leetcode.map(String::from)),
        experience: Set(0),
        streak: Set(0),
        created_at: Set(Utc::now().fixed_offset()),
    };
    statboard::store::members::insert(db, model)
        .await
        .expect("member should insert")
}

/// One scripted response for the fake client.
#[derive(Debug, Clone)]
pub enum Scripted {
    GitHub {
        commits: i64,
        pull_requests: i64,
        issues: i64,
        repositories: i64,
    },
    LeetCode {
        easy: i64,
        medium: i64,
        hard: i64,
    },
    Upstream(String),
    NotFound,
}

impl Scripted {
    fn into_result(self, username: &str) -> ProviderResult<RawContributions> {
        match self {
            Scripted::GitHub {
                commits,
                pull_requests,
                issues,
                repositories,
            } => Ok(RawContributions::GitHub(GitHubRawStats {
                commits,
                pull_requests,
                issues,
                repositories,
                contributions: commits + pull_requests + issues,
                language_histogram: serde_json::json!({"Rust": 100}),
                ..GitHubRawStats::default()
            })),
            Scripted::LeetCode { easy, medium, hard } => {
                Ok(RawContributions::LeetCode(LeetCodeRawStats {
                    solved_easy: easy,
                    solved_medium: medium,
                    solved_hard: hard,
                    total_solved: easy + medium + hard,
                    ..LeetCodeRawStats::default()
                }))
            }
            Scripted::Upstream(message) => Err(ProviderError::upstream(message)),
            Scripted::NotFound => Err(ProviderError::not_found(username)),
        }
    }
}

/// A provider client that plays back a script.
///
/// Responses are consumed in order; the final response repeats once the
/// script is exhausted. Every fetch increments the call counter, which
/// is how tests assert "the provider was not called again".
pub struct ScriptedClient {
    provider: Provider,
    calls: AtomicUsize,
    script: Mutex<Vec<Scripted>>,
}

impl ScriptedClient {
    pub fn new(provider: Provider, script: Vec<Scripted>) -> Self {
        Self {
            provider,
            calls: AtomicUsize::new(0),
            script: Mutex::new(script),
        }
    }

    /// How many contribution fetches have run.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> Scripted {
        let mut script = self.script.lock().expect("script lock");
        if script.len() > 1 {
            script.remove(0)
        } else {
            script
                .first()
                .cloned()
                .unwrap_or(Scripted::Upstream("script exhausted".to_string()))
        }
    }
}

#[async_trait]
impl ProviderClient for ScriptedClient {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn fetch_profile(&self, username: &str) -> ProviderResult<Profile> {
        Ok(Profile {
            username: username.to_string(),
            ..Profile::default()
        })
    }

    async fn fetch_contributions(&self, username: &str) -> ProviderResult<RawContributions> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.next_response().into_result(username)
    }
}
