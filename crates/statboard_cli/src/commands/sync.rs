//! Sync commands: one member or the whole roster.

use console::style;

use statboard::sync::{ProviderSyncStatus, SkipReason, SyncOrchestrator, SyncTrigger};

use crate::commands::shared::{CommandResult, build_clients, connect_cache, connect_db};
use crate::config::Config;
use crate::resolve_member;

pub(crate) async fn handle(
    member: Option<String>,
    all: bool,
    force: bool,
    config: &Config,
) -> CommandResult {
    let db = connect_db(config).await?;
    let cache = connect_cache(config).await;
    let clients = build_clients(config)?;
    let orchestrator = SyncOrchestrator::new(db.clone(), cache, clients);

    match (member, all) {
        (Some(reference), _) => {
            let member = resolve_member(&db, &reference).await?;
            let trigger = if force {
                SyncTrigger::Forced
            } else {
                SyncTrigger::Visit
            };

            let result = orchestrator.sync_member(member.id, trigger).await?;

            for (provider, status) in &result.statuses {
                let line = match status {
                    ProviderSyncStatus::Synced => style("synced").green().to_string(),
                    ProviderSyncStatus::Skipped(SkipReason::Fresh) => {
                        style("fresh, skipped").dim().to_string()
                    }
                    ProviderSyncStatus::Skipped(SkipReason::InFlight) => {
                        style("in flight elsewhere, skipped").dim().to_string()
                    }
                    ProviderSyncStatus::Skipped(SkipReason::NoClient) => {
                        style("no client configured").yellow().to_string()
                    }
                    ProviderSyncStatus::Failed(message) => {
                        format!("{} {}", style("failed:").red(), message)
                    }
                };
                println!("{:<10} {}", provider.to_string(), line);
            }

            if let Some(snapshot) = &result.github {
                println!(
                    "github: {} commits, {} PRs, {} issues, {} repos",
                    snapshot.commits, snapshot.pull_requests, snapshot.issues, snapshot.repositories
                );
            }
            if let Some(snapshot) = &result.leetcode {
                println!(
                    "leetcode: {} easy, {} medium, {} hard",
                    snapshot.solved_easy, snapshot.solved_medium, snapshot.solved_hard
                );
            }
        }
        (None, true) => {
            let report = orchestrator.sync_all().await?;
            println!(
                "{} synced, {} skipped, {} errors",
                style(report.synced).green(),
                style(report.skipped).dim(),
                style(report.errors.len()).red()
            );
            for (member_id, message) in &report.errors {
                println!("  {} {}: {}", style("!").red(), member_id, message);
            }
        }
        (None, false) => {
            return Err("pass --member <handle> or --all".into());
        }
    }

    Ok(())
}
