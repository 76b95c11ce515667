//! The staleness and rate-limit gate.
//!
//! Every "is this pair due for a sync" decision in the system goes
//! through [`evaluate`]; call sites never compare timestamps themselves.
//! The gate is a pure function over the stored [`SyncState`] so the
//! policy has exactly one implementation and one set of tests.
//!
//! [`SyncState`]: crate::entity::sync_state::Model

use chrono::{DateTime, Duration, Utc};

use crate::entity::sync_state::Model as SyncStateModel;

use super::types::{BACKGROUND_STALE_HOURS, SyncTrigger, VISIT_STALE_MINUTES};

/// The gate's verdict for one (member, provider) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Eligible and stale: the caller should claim and fetch.
    Due,
    /// Within the staleness window (or another worker holds the claim);
    /// a passive sync is a no-op.
    Fresh,
    /// A forced sync arrived inside the throttle window; fail fast with
    /// the remaining delay, without touching the provider.
    Throttled {
        /// Seconds until the pair becomes eligible.
        retry_after_seconds: u64,
    },
}

/// Staleness window for a trigger.
fn stale_window(trigger: SyncTrigger) -> Duration {
    match trigger {
        SyncTrigger::Background => Duration::hours(BACKGROUND_STALE_HOURS),
        SyncTrigger::Visit => Duration::minutes(VISIT_STALE_MINUTES),
        // Forced syncs bypass staleness entirely; only the throttle gates
        SyncTrigger::Forced => Duration::zero(),
    }
}

/// Decide whether a (member, provider) pair is due for a sync.
pub fn evaluate(
    state: Option<&SyncStateModel>,
    trigger: SyncTrigger,
    now: DateTime<Utc>,
) -> GateDecision {
    let Some(state) = state else {
        // Never synced: always due
        return GateDecision::Due;
    };

    let eligible = state.seconds_until_eligible(now) == 0;

    match trigger {
        SyncTrigger::Forced => {
            if eligible {
                GateDecision::Due
            } else {
                GateDecision::Throttled {
                    retry_after_seconds: state.seconds_until_eligible(now).max(1),
                }
            }
        }
        SyncTrigger::Background | SyncTrigger::Visit => {
            if !eligible {
                return GateDecision::Fresh;
            }
            // A failed attempt does not wait out the full window again
            if !state.last_sync_ok {
                return GateDecision::Due;
            }
            if state.age(now) > stale_window(trigger) {
                GateDecision::Due
            } else {
                GateDecision::Fresh
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use crate::entity::provider::Provider;

    use super::*;

    fn state(synced_hours_ago: i64, eligible_in_seconds: i64, ok: bool) -> SyncStateModel {
        let now = Utc::now();
        SyncStateModel {
            id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            provider: Provider::GitHub,
            last_synced_at: (now - Duration::hours(synced_hours_ago)).fixed_offset(),
            last_sync_ok: ok,
            next_eligible_at: (now + Duration::seconds(eligible_in_seconds)).fixed_offset(),
        }
    }

    #[test]
    fn test_missing_state_is_due() {
        assert_eq!(
            evaluate(None, SyncTrigger::Background, Utc::now()),
            GateDecision::Due
        );
        assert_eq!(
            evaluate(None, SyncTrigger::Forced, Utc::now()),
            GateDecision::Due
        );
    }

    #[test]
    fn test_background_within_window_is_fresh() {
        let s = state(23, -1, true);
        assert_eq!(
            evaluate(Some(&s), SyncTrigger::Background, Utc::now()),
            GateDecision::Fresh
        );
    }

    #[test]
    fn test_background_past_window_is_due() {
        let s = state(25, -1, true);
        assert_eq!(
            evaluate(Some(&s), SyncTrigger::Background, Utc::now()),
            GateDecision::Due
        );
    }

    #[test]
    fn test_visit_uses_the_shorter_window() {
        let now = Utc::now();
        let mut s = state(0, -1, true);
        s.last_synced_at = (now - Duration::minutes(45)).fixed_offset();

        assert_eq!(
            evaluate(Some(&s), SyncTrigger::Visit, now),
            GateDecision::Due
        );
        assert_eq!(
            evaluate(Some(&s), SyncTrigger::Background, now),
            GateDecision::Fresh
        );
    }

    #[test]
    fn test_visit_within_window_is_fresh() {
        let now = Utc::now();
        let mut s = state(0, -1, true);
        s.last_synced_at = (now - Duration::minutes(10)).fixed_offset();

        assert_eq!(
            evaluate(Some(&s), SyncTrigger::Visit, now),
            GateDecision::Fresh
        );
    }

    #[test]
    fn test_forced_inside_throttle_is_throttled_with_hint() {
        let s = state(0, 240, true);
        match evaluate(Some(&s), SyncTrigger::Forced, Utc::now()) {
            GateDecision::Throttled {
                retry_after_seconds,
            } => {
                assert!(retry_after_seconds > 0);
                assert!(retry_after_seconds <= 240);
            }
            other => panic!("expected Throttled, got {other:?}"),
        }
    }

    #[test]
    fn test_forced_after_throttle_is_due_regardless_of_age() {
        // Synced one minute ago but eligible: forced bypasses staleness
        let now = Utc::now();
        let mut s = state(0, -1, true);
        s.last_synced_at = (now - Duration::minutes(1)).fixed_offset();

        assert_eq!(evaluate(Some(&s), SyncTrigger::Forced, now), GateDecision::Due);
    }

    #[test]
    fn test_failed_last_sync_retries_once_eligible() {
        // Only 1 hour old, but the last attempt failed
        let s = state(1, -1, false);
        assert_eq!(
            evaluate(Some(&s), SyncTrigger::Background, Utc::now()),
            GateDecision::Due
        );
    }

    #[test]
    fn test_passive_sync_inside_hold_is_fresh_not_throttled() {
        // Another worker holds the claim; passive syncs just move on
        let s = state(25, 300, true);
        assert_eq!(
            evaluate(Some(&s), SyncTrigger::Background, Utc::now()),
            GateDecision::Fresh
        );
    }
}
