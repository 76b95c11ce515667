//! Database migration commands.

use clap::Subcommand;

// The migration prelude (including MigratorTrait) is re-exported through
// the library, so the CLI needs no sea-orm-migration dependency of its own.
use statboard::migration::{Migrator, MigratorTrait};

use crate::commands::shared::CommandResult;
use crate::config::Config;

/// Migration subcommands.
#[derive(Subcommand)]
pub(crate) enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Drop everything and re-apply from scratch
    Fresh,
    /// Show applied and pending migrations
    Status,
}

pub(crate) async fn handle(action: MigrateAction, config: &Config) -> CommandResult {
    let url = config
        .database_url()
        .ok_or("no database URL configured and no state directory available")?;

    if url.starts_with("sqlite://")
        && let Some(state_dir) = Config::default_state_dir()
    {
        std::fs::create_dir_all(&state_dir).ok();
    }

    let db = statboard::connect(&url).await?;

    match action {
        MigrateAction::Up => {
            Migrator::up(&db, None).await?;
            println!("migrations applied");
        }
        MigrateAction::Fresh => {
            Migrator::fresh(&db).await?;
            println!("database recreated");
        }
        MigrateAction::Status => {
            Migrator::status(&db).await?;
        }
    }

    Ok(())
}
