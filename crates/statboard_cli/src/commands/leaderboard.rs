//! Leaderboard display.

use console::style;

use statboard::ranking::{Dimension, Period};
use statboard::service::LeaderboardService;

use crate::commands::shared::{CommandResult, connect_cache, connect_db};
use crate::config::Config;

pub(crate) async fn handle(dimension: &str, period: &str, config: &Config) -> CommandResult {
    let dimension: Dimension = dimension.parse()?;
    let period: Period = period.parse()?;

    let db = connect_db(config).await?;
    let cache = connect_cache(config).await;
    let service = LeaderboardService::new(db, cache);

    let entries = service.leaderboard(dimension, period).await?;

    println!(
        "{}",
        style(format!("{} / {}", dimension, period)).bold()
    );

    for entry in entries {
        match entry.rank {
            Some(rank) => println!(
                "{:>4}  {:<16} {:>8}  ({} pts)",
                rank, entry.handle, entry.value, entry.points
            ),
            None => println!(
                "   -  {:<16} {:>8}  ({})",
                entry.handle,
                entry.value,
                style("unranked").dim()
            ),
        }
    }

    Ok(())
}
