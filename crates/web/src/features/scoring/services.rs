use storage::{
    Database,
    dto::scoring::{EventRecomputeSummary, NoteTypesResponse, ScoreUpdate},
    error::Result,
    models::{AttemptNote, Competition, Entry, LaneAssignment},
    services::{ranking, scoring},
};
use uuid::Uuid;

use crate::live::LiveHub;

/// Save an organizer note for one entry and event
pub async fn save_event_note(
    db: &Database,
    entry_id: Uuid,
    event_id: Uuid,
    note_type: &str,
    value: &str,
) -> Result<AttemptNote> {
    scoring::save_event_note(db, entry_id, event_id, note_type, value).await
}

/// Enter a score directly and broadcast it once committed
pub async fn record_result(
    db: &Database,
    hub: &LiveHub,
    entry_id: Uuid,
    event_id: Uuid,
    value: &str,
) -> Result<ScoreUpdate> {
    let update = scoring::record_result(db, entry_id, event_id, value).await?;
    hub.publish_score(&update);

    Ok(update)
}

pub async fn assign_lane(
    db: &Database,
    entry_id: Uuid,
    event_id: Uuid,
    lane: i32,
    heat: i32,
) -> Result<LaneAssignment> {
    scoring::assign_lane(db, entry_id, event_id, lane, heat).await
}

/// Recompute points, event ranks and standings from stored results
pub async fn recompute_event(
    db: &Database,
    competition_id: Uuid,
    event_id: Uuid,
) -> Result<EventRecomputeSummary> {
    ranking::recompute_event_now(db, competition_id, event_id).await
}

pub async fn standings(db: &Database, competition_id: Uuid) -> Result<Vec<Entry>> {
    scoring::standings(db, competition_id).await
}

pub async fn set_active_event(
    db: &Database,
    competition_id: Uuid,
    event_id: Uuid,
) -> Result<Competition> {
    scoring::set_active_event(db, competition_id, event_id).await
}

pub async fn note_types(db: &Database, event_id: Uuid) -> Result<NoteTypesResponse> {
    scoring::note_types(db, event_id).await
}
