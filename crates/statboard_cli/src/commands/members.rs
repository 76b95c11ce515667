//! Member roster commands.

use chrono::Utc;
use clap::Subcommand;
use console::style;
use sea_orm::Set;
use uuid::Uuid;

use statboard::entity::member::ActiveModel as MemberActiveModel;
use statboard::store;

use crate::commands::shared::{CommandResult, connect_db};
use crate::config::Config;

/// Member subcommands.
#[derive(Subcommand)]
pub(crate) enum MembersAction {
    /// List all members
    List,
    /// Add a member to the roster
    Add {
        /// Portal handle
        handle: String,
        /// GitHub login
        #[arg(long)]
        github: Option<String>,
        /// LeetCode username
        #[arg(long)]
        leetcode: Option<String>,
    },
}

pub(crate) async fn handle(action: MembersAction, config: &Config) -> CommandResult {
    let db = connect_db(config).await?;

    match action {
        MembersAction::List => {
            for member in store::members::list_all(&db).await? {
                let github = member.github_username.as_deref().unwrap_or("-");
                let leetcode = member.leetcode_username.as_deref().unwrap_or("-");
                println!(
                    "{}  {:<16} github:{:<16} leetcode:{}",
                    member.id, member.handle, github, leetcode
                );
            }
        }
        MembersAction::Add {
            handle,
            github,
            leetcode,
        } => {
            if github.is_none() && leetcode.is_none() {
                println!(
                    "{}",
                    style("note: member has no linked accounts and will not sync").yellow()
                );
            }

            let model = MemberActiveModel {
                id: Set(Uuid::new_v4()),
                handle: Set(handle.clone()),
                github_username: Set(github),
                leetcode_username: Set(leetcode),
                experience: Set(0),
                streak: Set(0),
                created_at: Set(Utc::now().fixed_offset()),
            };
            let created = store::members::insert(&db, model).await?;
            println!("added {} ({})", created.handle, created.id);
        }
    }

    Ok(())
}
