//! Bootcamp progress tracking: registration baselines, periodic
//! progress re-sync, and final ranking at completion.
//!
//! # Module Structure
//!
//! - [`progress`] - registration, status advancement, re-sync, completion

pub mod progress;

use thiserror::Error;
use uuid::Uuid;

use crate::entity::bootcamp::BootcampStatus;
use crate::entity::provider::Provider;
use crate::store::StoreError;

/// Errors from bootcamp operations.
#[derive(Debug, Error)]
pub enum BootcampError {
    /// The bootcamp id does not resolve.
    #[error("Unknown bootcamp: {0}")]
    UnknownBootcamp(Uuid),

    /// The member id does not resolve.
    #[error("Unknown member: {0}")]
    UnknownMember(Uuid),

    /// The bootcamp no longer accepts registrations.
    #[error("Registration closed: bootcamp is {status}")]
    RegistrationClosed { status: BootcampStatus },

    /// The member is already registered for this bootcamp.
    #[error("Member {member_id} is already registered")]
    AlreadyRegistered { member_id: Uuid },

    /// The member has no username for the bootcamp's provider.
    ///
    /// Registration is rejected: without a username there can be no
    /// baseline, and without a baseline no meaningful progress delta.
    #[error("No {provider} username registered for member {member_id}")]
    MissingUsername {
        provider: Provider,
        member_id: Uuid,
    },

    /// The baseline fetch failed; registration is rejected, not
    /// silently degraded.
    #[error("Baseline fetch failed: {message}")]
    BaselineFetchFailed { message: String },

    /// No client is configured for the bootcamp's provider.
    #[error("No {provider} client configured")]
    NoClient { provider: Provider },

    /// Database failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Aggregate result of a bootcamp sync pass.
///
/// Partial failure never aborts the pass: each failed participant is
/// recorded and the rest continue.
#[derive(Debug, Default)]
pub struct BootcampSyncReport {
    /// Status transitions applied this pass.
    pub advanced: Vec<(Uuid, BootcampStatus)>,
    /// Bootcamps whose participants were re-synced.
    pub bootcamps: usize,
    /// Participants refreshed successfully.
    pub synced: usize,
    /// Failures: `(member or bootcamp id, message)`.
    pub errors: Vec<(Uuid, String)>,
}

impl BootcampSyncReport {
    /// Whether anything failed.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

pub use progress::{
    advance_statuses, complete_bootcamp, register, resync_participants, run_bootcamp_sync,
};
