//! Bootcamp operations: listing, creation, registration, the periodic
//! sync trigger, and administrative completion.

use chrono::{DateTime, Utc};
use clap::Subcommand;
use console::style;
use uuid::Uuid;

use statboard::bootcamp;
use statboard::entity::bootcamp::ActiveModel as BootcampActiveModel;
use statboard::entity::provider::Provider;
use statboard::store;

use crate::commands::shared::{CommandResult, build_clients, connect_db};
use crate::config::Config;
use crate::resolve_member;

/// Bootcamp subcommands.
#[derive(Subcommand)]
pub(crate) enum BootcampAction {
    /// List all bootcamps
    List,
    /// Create a bootcamp
    Create {
        /// Title
        title: String,
        /// Provider scored by this bootcamp (github or leetcode)
        #[arg(short, long)]
        provider: String,
        /// Start of the competition window (RFC 3339)
        #[arg(long)]
        starts_at: DateTime<Utc>,
        /// End of the competition window (RFC 3339)
        #[arg(long)]
        ends_at: DateTime<Utc>,
    },
    /// Register a member, capturing their baseline
    Register {
        /// Bootcamp id
        bootcamp: Uuid,
        /// Member handle or id
        member: String,
    },
    /// Advance statuses and refresh active participants
    Sync {
        /// Restrict to one bootcamp
        #[arg(short, long)]
        bootcamp: Option<Uuid>,
    },
    /// Complete a bootcamp ahead of its end date, assigning final ranks
    Complete {
        /// Bootcamp id
        bootcamp: Uuid,
    },
}

pub(crate) async fn handle(action: BootcampAction, config: &Config) -> CommandResult {
    let db = connect_db(config).await?;

    match action {
        BootcampAction::List => {
            for bootcamp in store::bootcamps::list_all(&db).await? {
                println!(
                    "{}  {:<24} {:<10} {:<10} {} -> {}",
                    bootcamp.id,
                    bootcamp.title,
                    bootcamp.provider.to_string(),
                    bootcamp.status.to_string(),
                    bootcamp.starts_at.format("%Y-%m-%d"),
                    bootcamp.ends_at.format("%Y-%m-%d")
                );
            }
        }
        BootcampAction::Create {
            title,
            provider,
            starts_at,
            ends_at,
        } => {
            use sea_orm::Set;

            let provider: Provider = provider.parse()?;
            if ends_at <= starts_at {
                return Err("ends_at must be after starts_at".into());
            }

            let now = Utc::now();
            let model = BootcampActiveModel {
                id: Set(Uuid::new_v4()),
                title: Set(title),
                provider: Set(provider),
                status: Set(statboard::BootcampStatus::Upcoming),
                starts_at: Set(starts_at.fixed_offset()),
                ends_at: Set(ends_at.fixed_offset()),
                created_at: Set(now.fixed_offset()),
            };
            let created = store::bootcamps::insert(&db, model).await?;
            println!("created bootcamp {}", created.id);
        }
        BootcampAction::Register { bootcamp, member } => {
            let clients = build_clients(config)?;
            let member = resolve_member(&db, &member).await?;

            let participant =
                bootcamp::register(&db, &clients, bootcamp, member.id, Utc::now()).await?;
            let baseline = participant.baseline();
            println!(
                "registered {} (baseline: {} commits, {} solved)",
                member.handle,
                baseline.commits,
                baseline.solved_easy + baseline.solved_medium + baseline.solved_hard
            );
        }
        BootcampAction::Sync { bootcamp } => {
            let clients = build_clients(config)?;
            let report =
                bootcamp::run_bootcamp_sync(&db, &clients, bootcamp, Utc::now()).await?;

            for (id, status) in &report.advanced {
                println!("{} -> {}", id, status);
            }
            println!(
                "{} bootcamps, {} participants synced, {} errors",
                report.bootcamps,
                style(report.synced).green(),
                style(report.errors.len()).red()
            );
            for (id, message) in &report.errors {
                println!("  {} {}: {}", style("!").red(), id, message);
            }
        }
        BootcampAction::Complete { bootcamp } => {
            bootcamp::complete_bootcamp(&db, bootcamp).await?;
            println!("bootcamp {} completed", bootcamp);
        }
    }

    Ok(())
}
