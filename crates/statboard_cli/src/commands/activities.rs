//! Activity feed display.

use console::style;

use statboard::service::{ActivityService, FeedScope};

use crate::commands::shared::{CommandResult, connect_cache, connect_db};
use crate::config::Config;
use crate::resolve_member;

pub(crate) async fn handle(member: Option<String>, limit: usize, config: &Config) -> CommandResult {
    let db = connect_db(config).await?;
    let cache = connect_cache(config).await;
    let service = ActivityService::new(db.clone(), cache);

    let scope = match member {
        Some(reference) => FeedScope::Member(resolve_member(&db, &reference).await?.id),
        None => FeedScope::Global,
    };

    let entries = service.activities(scope, limit).await?;

    if entries.is_empty() {
        println!("{}", style("no activity yet").dim());
        return Ok(());
    }

    for entry in entries {
        println!(
            "{}  {:<16} {:<10} {:?} x{}",
            entry.occurred_at.format("%Y-%m-%d %H:%M"),
            entry.handle,
            entry.provider.to_string(),
            entry.kind,
            entry.amount
        );
    }

    Ok(())
}
