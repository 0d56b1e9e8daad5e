use std::collections::BTreeMap;

use storage::{
    Database,
    dto::run_order::{CompleteLifterRequest, CompletionResponse, LaneBoard, LaneTransition},
    error::Result,
    models::RunSlot,
    services::{generation::RunOrderStrategy, lane::Lane, run_order},
};
use uuid::Uuid;

use crate::live::{LiveHub, LiveMessage};

/// Generate the run order and announce the opening lifter of every lane
pub async fn generate_run_order(
    db: &Database,
    hub: &LiveHub,
    competition_id: Uuid,
    event_id: Uuid,
    strategy: RunOrderStrategy,
) -> Result<Vec<RunSlot>> {
    let slots = run_order::generate_run_order(db, competition_id, event_id, strategy).await?;

    for message in lane_openings(&slots) {
        hub.publish(competition_id, message);
    }

    Ok(slots)
}

/// Get every lane of an event
pub async fn lane_board(db: &Database, competition_id: Uuid, event_id: Uuid) -> Result<LaneBoard> {
    run_order::lane_board(db, competition_id, event_id).await
}

/// Make a slot the current lifter of its lane
pub async fn update_current_lifter(
    db: &Database,
    hub: &LiveHub,
    slot_id: Uuid,
) -> Result<LaneTransition> {
    let transition = run_order::update_current_lifter(db, slot_id).await?;
    hub.publish_lane(&transition);

    Ok(transition)
}

/// Record the current lifter's attempt and advance the lane
pub async fn complete_current_lifter(
    db: &Database,
    hub: &LiveHub,
    slot_id: Uuid,
    req: &CompleteLifterRequest,
) -> Result<CompletionResponse> {
    let response = run_order::complete_current_lifter(
        db,
        slot_id,
        req.score.as_deref(),
        req.force_complete,
    )
    .await?;

    if let Some(score) = &response.score {
        hub.publish_score(score);
    }
    hub.publish_lane(&response.transition);

    Ok(response)
}

/// Put a completed lifter back into the queue
pub async fn reactivate_lifter(
    db: &Database,
    hub: &LiveHub,
    slot_id: Uuid,
) -> Result<LaneTransition> {
    let transition = run_order::reactivate_lifter(db, slot_id).await?;
    hub.publish_lane(&transition);

    Ok(transition)
}

fn lane_openings(slots: &[RunSlot]) -> Vec<LiveMessage> {
    let mut lanes: BTreeMap<(Uuid, i32), Vec<RunSlot>> = BTreeMap::new();
    for slot in slots {
        lanes
            .entry((slot.event_id, slot.lane))
            .or_default()
            .push(slot.clone());
    }

    lanes
        .into_iter()
        .map(|((event_id, number), slots)| {
            let lane = Lane::new(number, slots);
            LiveMessage::RunOrder {
                event_id,
                lane: number,
                current_slot_id: lane.current().map(|s| s.id),
                on_deck_slot_id: lane.on_deck().map(|s| s.id),
            }
        })
        .collect()
}
