//! GitHub provider client.
//!
//! The profile comes from the REST API; contribution totals, the
//! contribution calendar and language sizes come from one GraphQL query.
//! A GraphQL failure degrades to REST-derived approximations instead of
//! failing the fetch.

pub mod client;
pub mod convert;
pub mod error;
pub mod types;

pub use client::{GitHubClient, create_client};
pub use error::{GitHubError, is_not_found_error, is_rate_limit_error};
