pub(crate) mod activities;
pub(crate) mod bootcamp;
pub(crate) mod leaderboard;
pub(crate) mod members;
pub(crate) mod migrate;
pub(crate) mod shared;
pub(crate) mod sync;
