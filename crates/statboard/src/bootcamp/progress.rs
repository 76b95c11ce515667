//! Bootcamp lifecycle operations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, Set};
use uuid::Uuid;

use crate::entity::bootcamp::{BootcampStatus, Model as BootcampModel};
use crate::entity::bootcamp_participant::{
    ActiveModel as ParticipantActiveModel, Model as ParticipantModel, StatBlock,
};
use crate::entity::provider::Provider;
use crate::normalize::normalize;
use crate::provider::ProviderClient;
use crate::store;
use crate::sync::PROVIDER_FETCH_TIMEOUT;

use super::{BootcampError, BootcampSyncReport};

fn client_for<'a>(
    clients: &'a [Arc<dyn ProviderClient>],
    provider: Provider,
) -> Result<&'a Arc<dyn ProviderClient>, BootcampError> {
    clients
        .iter()
        .find(|c| c.provider() == provider)
        .ok_or(BootcampError::NoClient { provider })
}

/// Fetch a member's current stat block from the bootcamp's provider.
async fn fetch_stat_block(
    client: &Arc<dyn ProviderClient>,
    username: &str,
) -> Result<StatBlock, String> {
    let fetched =
        tokio::time::timeout(PROVIDER_FETCH_TIMEOUT, client.fetch_contributions(username)).await;

    match fetched {
        Err(_) => Err(format!("{} fetch timed out", client.provider())),
        Ok(Err(e)) => Err(e.to_string()),
        Ok(Ok(raw)) => Ok(normalize(&raw).stat_block()),
    }
}

/// Register a member for a bootcamp, capturing their baseline snapshot.
///
/// The baseline is the zero-point for all progress scoring, so
/// registration is rejected outright when it cannot be captured: a
/// missing username or a failed provider call never degrades into a
/// zeroed baseline.
pub async fn register(
    db: &DatabaseConnection,
    clients: &[Arc<dyn ProviderClient>],
    bootcamp_id: Uuid,
    member_id: Uuid,
    now: DateTime<Utc>,
) -> Result<ParticipantModel, BootcampError> {
    let bootcamp = store::bootcamps::find_by_id(db, bootcamp_id)
        .await?
        .ok_or(BootcampError::UnknownBootcamp(bootcamp_id))?;

    if !bootcamp.accepts_registrations() {
        return Err(BootcampError::RegistrationClosed {
            status: bootcamp.status,
        });
    }

    let member = store::members::find_by_id(db, member_id)
        .await?
        .ok_or(BootcampError::UnknownMember(member_id))?;

    let username = member
        .username_for(bootcamp.provider)
        .ok_or(BootcampError::MissingUsername {
            provider: bootcamp.provider,
            member_id,
        })?
        .to_string();

    if store::bootcamps::find_participant(db, bootcamp_id, member_id)
        .await?
        .is_some()
    {
        return Err(BootcampError::AlreadyRegistered { member_id });
    }

    let client = client_for(clients, bootcamp.provider)?;
    let baseline = fetch_stat_block(client, &username)
        .await
        .map_err(|message| BootcampError::BaselineFetchFailed { message })?;

    let model = ParticipantActiveModel {
        id: Set(Uuid::new_v4()),
        bootcamp_id: Set(bootcamp_id),
        member_id: Set(member_id),
        baseline_stats: Set(baseline.to_json()),
        current_stats: Set(baseline.to_json()),
        progress_stats: Set(StatBlock::default().to_json()),
        final_points: Set(0),
        final_rank: Set(None),
        registered_at: Set(now.fixed_offset()),
    };

    Ok(store::bootcamps::insert_participant(db, model).await?)
}

/// Advance every open bootcamp to the status its dates call for.
///
/// `UPCOMING -> ACTIVE` at the start date, `ACTIVE -> COMPLETED` at the
/// end date. Completion also assigns final ranks. Cancelled bootcamps
/// never move.
pub async fn advance_statuses(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<Vec<(Uuid, BootcampStatus)>, BootcampError> {
    let mut advanced = Vec::new();

    for bootcamp in store::bootcamps::list_open(db).await? {
        let expected = bootcamp.expected_status(now);
        if expected == bootcamp.status {
            continue;
        }

        tracing::info!(
            "bootcamp {} moves {} -> {}",
            bootcamp.id,
            bootcamp.status,
            expected
        );

        let id = bootcamp.id;
        if expected == BootcampStatus::Completed {
            finalize(db, bootcamp).await?;
        } else {
            store::bootcamps::set_status(db, bootcamp, expected).await?;
        }
        advanced.push((id, expected));
    }

    Ok(advanced)
}

/// Refresh progress for every participant of an active bootcamp.
///
/// Per participant: fetch current stats, recompute the clamped delta
/// against the baseline, recompute points. Individual failures are
/// collected and never abort the batch.
pub async fn resync_participants(
    db: &DatabaseConnection,
    clients: &[Arc<dyn ProviderClient>],
    bootcamp: &BootcampModel,
) -> Result<(usize, Vec<(Uuid, String)>), BootcampError> {
    let client = client_for(clients, bootcamp.provider)?;
    let participants = store::bootcamps::list_participants(db, bootcamp.id).await?;

    let mut synced = 0usize;
    let mut errors: Vec<(Uuid, String)> = Vec::new();

    for participant in participants {
        let member_id = participant.member_id;

        let member = match store::members::find_by_id(db, member_id).await {
            Ok(Some(member)) => member,
            Ok(None) => {
                errors.push((member_id, "member no longer exists".to_string()));
                continue;
            }
            Err(e) => {
                errors.push((member_id, e.to_string()));
                continue;
            }
        };

        let Some(username) = member.username_for(bootcamp.provider) else {
            errors.push((member_id, format!("no {} username", bootcamp.provider)));
            continue;
        };

        let current = match fetch_stat_block(client, username).await {
            Ok(block) => block,
            Err(message) => {
                errors.push((member_id, message));
                continue;
            }
        };

        let baseline = participant.baseline();
        let progress = current.delta_since(&baseline);
        let points = progress.points(bootcamp.provider);

        let mut active: ParticipantActiveModel = participant.into();
        active.current_stats = Set(current.to_json());
        active.progress_stats = Set(progress.to_json());
        active.final_points = Set(points);

        match store::bootcamps::update_participant(db, active).await {
            Ok(_) => synced += 1,
            Err(e) => errors.push((member_id, e.to_string())),
        }
    }

    Ok((synced, errors))
}

/// Assign final ranks and mark the bootcamp completed.
///
/// Participants are ordered by points descending; ties keep registration
/// order (the participant list comes back registration-ordered and the
/// sort is stable). Re-running produces identical ranks.
async fn finalize(db: &DatabaseConnection, bootcamp: BootcampModel) -> Result<(), BootcampError> {
    let mut participants = store::bootcamps::list_participants(db, bootcamp.id).await?;
    participants.sort_by_key(|p| std::cmp::Reverse(p.final_points));

    for (index, participant) in participants.into_iter().enumerate() {
        let rank = index as i32 + 1;
        if participant.final_rank == Some(rank) {
            continue;
        }
        let mut active: ParticipantActiveModel = participant.into();
        active.final_rank = Set(Some(rank));
        store::bootcamps::update_participant(db, active).await?;
    }

    store::bootcamps::set_status(db, bootcamp, BootcampStatus::Completed).await?;
    Ok(())
}

/// Administratively complete a bootcamp ahead of its end date.
pub async fn complete_bootcamp(
    db: &DatabaseConnection,
    bootcamp_id: Uuid,
) -> Result<(), BootcampError> {
    let bootcamp = store::bootcamps::find_by_id(db, bootcamp_id)
        .await?
        .ok_or(BootcampError::UnknownBootcamp(bootcamp_id))?;
    finalize(db, bootcamp).await
}

/// The periodic-trigger entry point: advance statuses, then refresh all
/// active participants.
///
/// With `bootcamp_id` set only that bootcamp is refreshed (it must
/// exist); otherwise every active bootcamp is. Runs on its own cadence,
/// independent of the dashboard sync gates.
pub async fn run_bootcamp_sync(
    db: &DatabaseConnection,
    clients: &[Arc<dyn ProviderClient>],
    bootcamp_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<BootcampSyncReport, BootcampError> {
    let mut report = BootcampSyncReport {
        advanced: advance_statuses(db, now).await?,
        ..BootcampSyncReport::default()
    };

    let targets = match bootcamp_id {
        Some(id) => {
            let bootcamp = store::bootcamps::find_by_id(db, id)
                .await?
                .ok_or(BootcampError::UnknownBootcamp(id))?;
            if bootcamp.status == BootcampStatus::Active {
                vec![bootcamp]
            } else {
                Vec::new()
            }
        }
        None => store::bootcamps::list_by_status(db, BootcampStatus::Active).await?,
    };

    for bootcamp in targets {
        match resync_participants(db, clients, &bootcamp).await {
            Ok((synced, errors)) => {
                report.bootcamps += 1;
                report.synced += synced;
                report.errors.extend(errors);
            }
            Err(e) => {
                report.errors.push((bootcamp.id, e.to_string()));
            }
        }
    }

    Ok(report)
}
