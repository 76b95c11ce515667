//! SeaORM entity definitions for the statboard database schema.

pub mod bootcamp;
pub mod bootcamp_participant;
pub mod contribution_snapshot;
pub mod member;
pub mod prelude;
pub mod provider;
pub mod sync_state;
