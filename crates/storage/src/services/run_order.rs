//! Run-order transitions. Each public operation is one transaction that
//! row-locks the lane it changes, so two organizers finishing the same lane
//! at once cannot both promote the same lifter.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use super::generation::{RunOrderStrategy, plan_division_signup, plan_last_man_standing};
use super::lane::{Finish, Lane, TransitionError};
use super::ranking;
use super::scoring::score_snapshot;
use crate::Database;
use crate::dto::run_order::{CompletedSlot, CompletionResponse, LaneBoard, LaneTransition, LaneView};
use crate::error::Result;
use crate::models::attempt_note::NEXT_ATTEMPT;
use crate::models::{Event, EventResult, RunSlot};
use crate::repository::attempt_note::AttemptNoteRepository;
use crate::repository::competition::CompetitionRepository;
use crate::repository::entry::EntryRepository;
use crate::repository::event::EventRepository;
use crate::repository::event_result::ResultRepository;
use crate::repository::lane_assignment::LaneAssignmentRepository;
use crate::repository::run_slot::RunSlotRepository;

/// Replaces the event's run order. On any failure the previous order stays.
pub async fn generate_run_order(
    db: &Database,
    competition_id: Uuid,
    event_id: Uuid,
    strategy: RunOrderStrategy,
) -> Result<Vec<RunSlot>> {
    let mut tx = db.begin().await?;

    let event = EventRepository::new(&mut tx)
        .find_in_competition(competition_id, event_id)
        .await?;

    let removed = RunSlotRepository::new(&mut tx)
        .delete_for_event(competition_id, event_id)
        .await?;

    let entries = EntryRepository::new(&mut tx)
        .list_for_competition(competition_id)
        .await?;

    let plan = match strategy {
        RunOrderStrategy::DivisionSignup => {
            let assignments = LaneAssignmentRepository::new(&mut tx)
                .list_for_event(event_id)
                .await?;
            plan_division_signup(&entries, &assignments)
        }
        RunOrderStrategy::LastManStanding => {
            let notes = AttemptNoteRepository::new(&mut tx)
                .declared_weights(event_id)
                .await?;
            plan_last_man_standing(&entries, &notes)
        }
    };

    let mut slots = Vec::with_capacity(plan.len());
    for planned in &plan {
        let slot = RunSlotRepository::new(&mut tx)
            .insert(competition_id, event_id, planned)
            .await?;
        slots.push(slot);
    }

    tx.commit().await?;

    tracing::info!(
        "Generated {} run order for event {} ({}): {} slots, {} replaced",
        strategy,
        event.name,
        event_id,
        slots.len(),
        removed
    );

    Ok(slots)
}

/// Makes a slot the current lifter of its lane.
pub async fn update_current_lifter(db: &Database, slot_id: Uuid) -> Result<LaneTransition> {
    let mut tx = db.begin().await?;

    let mut lane = lock_lane_of(&mut tx, slot_id).await?;
    lane.set_current(slot_id, Utc::now())?;
    let transition = persist(&mut tx, &lane, slot_id).await?;

    tx.commit().await?;

    tracing::info!(
        "Event {} lane {}: slot {} is now current",
        transition.event_id,
        transition.lane,
        slot_id
    );

    Ok(transition)
}

/// Records the current lifter's attempt (when a score is given), recomputes
/// the event, then retires or re-queues the lifter and promotes the next one.
pub async fn complete_current_lifter(
    db: &Database,
    slot_id: Uuid,
    score: Option<&str>,
    force_complete: bool,
) -> Result<CompletionResponse> {
    let mut tx = db.begin().await?;

    let mut lane = lock_lane_of(&mut tx, slot_id).await?;
    let slot = lane.ensure_current(slot_id)?.clone();

    let event = EventRepository::new(&mut tx)
        .find_in_competition(slot.competition_id, slot.event_id)
        .await?;

    let score = score.map(str::trim).filter(|s| !s.is_empty());
    let previous_attempt = AttemptNoteRepository::new(&mut tx)
        .last_attempt(slot.entry_id, slot.event_id, NEXT_ATTEMPT)
        .await?;

    let (attempt_number, snapshot) = match score {
        Some(score) => {
            let attempt = previous_attempt + 1;
            AttemptNoteRepository::new(&mut tx)
                .insert_attempt(slot.entry_id, slot.event_id, NEXT_ATTEMPT, score, attempt)
                .await?;
            ResultRepository::new(&mut tx)
                .upsert_value(slot.entry_id, slot.event_id, score)
                .await?;
            ranking::recompute_event(&mut tx, slot.competition_id, slot.event_id).await?;

            let snapshot = score_snapshot(&mut tx, slot.competition_id, slot.entry_id, slot.event_id).await?;
            (Some(attempt), Some(snapshot))
        }
        None => (None, None),
    };

    let attempts_taken = attempt_number.unwrap_or(previous_attempt);
    let next_order = RunSlotRepository::new(&mut tx)
        .next_order(slot.event_id, slot.lane)
        .await?;
    let finish = Finish::decide(attempts_taken, event.max_attempts, force_complete, next_order);

    let promoted = lane.finish_current(slot_id, finish, Utc::now())?;
    let transition = persist(&mut tx, &lane, slot_id).await?;

    tx.commit().await?;

    tracing::info!(
        "Event {} lane {}: slot {} {} after attempt {}/{}{}",
        event.name,
        lane.number(),
        slot_id,
        if finish == Finish::Complete { "completed" } else { "re-queued" },
        attempts_taken,
        event.max_attempts,
        match promoted {
            Some(next) => format!(", slot {} is now current", next),
            None => ", lane is idle".to_string(),
        }
    );

    Ok(CompletionResponse {
        transition,
        attempt_number,
        completed: finish == Finish::Complete,
        score: snapshot,
    })
}

/// completed -> pending. Does not promote or demote anyone else.
pub async fn reactivate_lifter(db: &Database, slot_id: Uuid) -> Result<LaneTransition> {
    let mut tx = db.begin().await?;

    let mut lane = lock_lane_of(&mut tx, slot_id).await?;
    lane.reactivate(slot_id)?;
    let transition = persist(&mut tx, &lane, slot_id).await?;

    tx.commit().await?;

    tracing::info!(
        "Event {} lane {}: slot {} reactivated",
        transition.event_id,
        transition.lane,
        slot_id
    );

    Ok(transition)
}

pub async fn lane_board(db: &Database, competition_id: Uuid, event_id: Uuid) -> Result<LaneBoard> {
    let mut conn = db.pool().acquire().await?;

    let competition = CompetitionRepository::new(&mut conn)
        .find_by_id(competition_id)
        .await?;
    let event = EventRepository::new(&mut conn)
        .find_in_competition(competition_id, event_id)
        .await?;
    let slots = RunSlotRepository::new(&mut conn)
        .list_for_event(competition_id, event_id)
        .await?;
    let results = ResultRepository::new(&mut conn)
        .list_for_event(event_id)
        .await?;

    let results: HashMap<Uuid, EventResult> = results.into_iter().map(|r| (r.entry_id, r)).collect();
    let mut board = build_lane_board(&event, slots, &results);
    board.is_active = competition.active_event_id == Some(event_id);

    Ok(board)
}

/// Groups an event's slots into lanes `1..=number_of_lanes`; slots outside
/// that range still get a lane of their own.
pub fn build_lane_board(event: &Event, slots: Vec<RunSlot>, results: &HashMap<Uuid, EventResult>) -> LaneBoard {
    let mut by_lane: BTreeMap<i32, Vec<RunSlot>> = (1..=event.number_of_lanes.max(1))
        .map(|lane| (lane, Vec::new()))
        .collect();
    for slot in slots {
        by_lane.entry(slot.lane).or_default().push(slot);
    }

    let lanes = by_lane
        .into_iter()
        .map(|(number, slots)| {
            let lane = Lane::new(number, slots);
            let heats: BTreeSet<i32> = lane.slots().iter().map(|s| s.heat).collect();

            let mut pending = lane.pending().cloned();
            let on_deck = pending.next();

            LaneView {
                lane: number,
                heats: heats.into_iter().collect(),
                current: lane.current().cloned(),
                on_deck,
                pending: pending.collect(),
                completed: lane
                    .completed()
                    .map(|slot| {
                        let result = results.get(&slot.entry_id);
                        CompletedSlot {
                            slot: slot.clone(),
                            value: result.map(|r| r.value.clone()),
                            points_earned: result.map_or(Decimal::ZERO, |r| r.points_earned),
                        }
                    })
                    .collect(),
            }
        })
        .collect();

    LaneBoard {
        competition_id: event.competition_id,
        event_id: event.id,
        event_name: event.name.clone(),
        is_active: false,
        lanes,
    }
}

async fn lock_lane_of(conn: &mut PgConnection, slot_id: Uuid) -> Result<Lane> {
    let slot = RunSlotRepository::new(conn).find_by_id(slot_id).await?;
    let slots = RunSlotRepository::new(conn)
        .lock_lane(slot.competition_id, slot.event_id, slot.lane)
        .await?;
    Ok(Lane::new(slot.lane, slots))
}

async fn persist(conn: &mut PgConnection, lane: &Lane, slot_id: Uuid) -> Result<LaneTransition> {
    let changed: Vec<RunSlot> = lane.changed().into_iter().cloned().collect();
    for slot in &changed {
        RunSlotRepository::new(conn).save_state(slot).await?;
    }

    debug_assert!(lane.current_count() <= 1);

    let anchor = lane
        .get(slot_id)
        .ok_or(TransitionError::UnknownSlot(slot_id))?;

    Ok(LaneTransition {
        competition_id: anchor.competition_id,
        event_id: anchor.event_id,
        lane: lane.number(),
        current: lane.current().cloned(),
        on_deck: lane.on_deck().cloned(),
        changed,
    })
}
