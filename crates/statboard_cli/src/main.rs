//! Statboard CLI - operator interface for the stat sync and leaderboard
//! engine.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "statboard")]
#[command(version)]
#[command(about = "Contribution stat sync and leaderboards for the club portal")]
#[command(
    long_about = "Statboard pulls member contribution stats from GitHub and LeetCode, \
keeps cached activity feeds and leaderboards, and tracks bootcamp \
competition progress. This CLI drives the same engine the portal uses, \
for cron jobs and operators."
)]
#[command(after_long_help = r#"EXAMPLES
    Run migrations, then sync every linked member:
        $ statboard migrate up
        $ statboard sync --all

    Force-refresh one member (respects the 10-minute throttle):
        $ statboard sync --member alice --force

    Show the weekly combined leaderboard:
        $ statboard leaderboard --dimension combined --period weekly

    Advance bootcamp statuses and refresh active participants:
        $ statboard bootcamp sync

CONFIGURATION
    Statboard reads configuration from:
      1. ~/.config/statboard/config.toml (or $XDG_CONFIG_HOME/statboard/config.toml)
      2. ./statboard.toml
      3. Environment variables (STATBOARD_* prefix)
      4. .env file in the current directory

ENVIRONMENT VARIABLES
    STATBOARD_DATABASE_URL    Database connection string
    STATBOARD_GITHUB_TOKEN    GitHub personal access token
    STATBOARD_CACHE_REDIS_URL Redis URL for the distributed cache tier
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: commands::migrate::MigrateAction,
    },
    /// Sync member contribution stats from providers
    Sync {
        /// Member handle or id to sync
        #[arg(short, long, conflicts_with = "all")]
        member: Option<String>,

        /// Sync every member with a linked provider account
        #[arg(short, long)]
        all: bool,

        /// Force the sync, bypassing the staleness window
        #[arg(short, long)]
        force: bool,
    },
    /// Show a cached or freshly built activity feed
    Activities {
        /// Member handle or id; omit for the global feed
        #[arg(short, long)]
        member: Option<String>,

        /// Maximum entries to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Show a leaderboard
    Leaderboard {
        /// Scoring dimension (commits, pull_requests, issues,
        /// contributions, experience, streak, github, leetcode, combined)
        #[arg(short, long, default_value = "combined")]
        dimension: String,

        /// Time period (daily, weekly, monthly, all_time)
        #[arg(short, long, default_value = "all_time")]
        period: String,
    },
    /// Bootcamp operations
    Bootcamp {
        #[command(subcommand)]
        action: commands::bootcamp::BootcampAction,
    },
    /// Member roster operations
    Members {
        #[command(subcommand)]
        action: commands::members::MembersAction,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    let config = config::Config::load();

    let result = match cli.command {
        Commands::Migrate { action } => commands::migrate::handle(action, &config).await,
        Commands::Sync { member, all, force } => {
            commands::sync::handle(member, all, force, &config).await
        }
        Commands::Activities { member, limit } => {
            commands::activities::handle(member, limit, &config).await
        }
        Commands::Leaderboard { dimension, period } => {
            commands::leaderboard::handle(&dimension, &period, &config).await
        }
        Commands::Bootcamp { action } => commands::bootcamp::handle(action, &config).await,
        Commands::Members { action } => commands::members::handle(action, &config).await,
    };

    if let Err(e) = result {
        eprintln!("{} {}", console::style("error:").red().bold(), e);
        std::process::exit(1);
    }
}

/// Parse a member reference: a UUID, or a handle to look up.
pub(crate) async fn resolve_member(
    db: &sea_orm::DatabaseConnection,
    reference: &str,
) -> Result<statboard::MemberModel, Box<dyn std::error::Error>> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return statboard::store::members::find_by_id(db, id)
            .await?
            .ok_or_else(|| format!("no member with id {}", id).into());
    }

    statboard::store::members::find_by_handle(db, reference)
        .await?
        .ok_or_else(|| format!("no member with handle '{}'", reference).into())
}
