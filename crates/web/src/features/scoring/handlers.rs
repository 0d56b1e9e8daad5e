use axum::{
    Json,
    extract::{Path, State},
};
use storage::{
    Database,
    dto::scoring::{
        AssignLaneRequest, EventRecomputeSummary, NoteTypesResponse, RecordResultRequest,
        SaveEventNoteRequest, ScoreUpdate, SetActiveEventRequest,
    },
    models::{AttemptNote, Competition, Entry, LaneAssignment},
};
use uuid::Uuid;
use validator::Validate;

use crate::{error::WebError, live::LiveHub};

use super::services;

#[utoipa::path(
    put,
    path = "/api/entries/{entry_id}/events/{event_id}/notes",
    params(
        ("entry_id" = Uuid, Path, description = "Entry ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = SaveEventNoteRequest,
    responses(
        (status = 200, description = "Note saved", body = AttemptNote),
        (status = 400, description = "Empty note or note type not used by this event"),
        (status = 404, description = "Entry or event not found")
    ),
    tag = "scoring"
)]
pub async fn save_event_note(
    State(db): State<Database>,
    Path((entry_id, event_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<SaveEventNoteRequest>,
) -> Result<Json<AttemptNote>, WebError> {
    req.validate()?;

    let note = services::save_event_note(&db, entry_id, event_id, &req.note_type, &req.value).await?;

    Ok(Json(note))
}

#[utoipa::path(
    put,
    path = "/api/entries/{entry_id}/events/{event_id}/result",
    params(
        ("entry_id" = Uuid, Path, description = "Entry ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = RecordResultRequest,
    responses(
        (status = 200, description = "Score stored and the event re-ranked", body = ScoreUpdate),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Entry or event not found"),
        (status = 409, description = "Concurrent recompute; retry")
    ),
    tag = "scoring"
)]
pub async fn record_result(
    State(db): State<Database>,
    State(hub): State<LiveHub>,
    Path((entry_id, event_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<RecordResultRequest>,
) -> Result<Json<ScoreUpdate>, WebError> {
    req.validate()?;

    let update = services::record_result(&db, &hub, entry_id, event_id, &req.value).await?;

    Ok(Json(update))
}

#[utoipa::path(
    put,
    path = "/api/entries/{entry_id}/events/{event_id}/lane",
    params(
        ("entry_id" = Uuid, Path, description = "Entry ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = AssignLaneRequest,
    responses(
        (status = 200, description = "Lane assigned for the next generation", body = LaneAssignment),
        (status = 400, description = "Lane outside the event's lanes"),
        (status = 404, description = "Entry or event not found")
    ),
    tag = "scoring"
)]
pub async fn assign_lane(
    State(db): State<Database>,
    Path((entry_id, event_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<AssignLaneRequest>,
) -> Result<Json<LaneAssignment>, WebError> {
    req.validate()?;

    let assignment = services::assign_lane(&db, entry_id, event_id, req.lane, req.heat).await?;

    Ok(Json(assignment))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/events/{event_id}/recompute",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event points, ranks and standings recomputed", body = EventRecomputeSummary),
        (status = 404, description = "Competition or event not found"),
        (status = 409, description = "Concurrent recompute; retry")
    ),
    tag = "scoring"
)]
pub async fn recompute_event(
    State(db): State<Database>,
    Path((competition_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<EventRecomputeSummary>, WebError> {
    let summary = services::recompute_event(&db, competition_id, event_id).await?;

    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/standings",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    responses(
        (status = 200, description = "Entries ordered by scoring group and rank", body = Vec<Entry>),
        (status = 404, description = "Competition not found")
    ),
    tag = "scoring"
)]
pub async fn get_standings(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
) -> Result<Json<Vec<Entry>>, WebError> {
    let entries = services::standings(&db, competition_id).await?;

    Ok(Json(entries))
}

#[utoipa::path(
    put,
    path = "/api/competitions/{competition_id}/active-event",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID")
    ),
    request_body = SetActiveEventRequest,
    responses(
        (status = 200, description = "Active event changed", body = Competition),
        (status = 404, description = "Competition or event not found")
    ),
    tag = "scoring"
)]
pub async fn set_active_event(
    State(db): State<Database>,
    Path(competition_id): Path<Uuid>,
    Json(req): Json<SetActiveEventRequest>,
) -> Result<Json<Competition>, WebError> {
    let competition = services::set_active_event(&db, competition_id, req.event_id).await?;

    Ok(Json(competition))
}

#[utoipa::path(
    get,
    path = "/api/events/{event_id}/note-types",
    params(
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Note types accepted for this event", body = NoteTypesResponse),
        (status = 404, description = "Event not found")
    ),
    tag = "scoring"
)]
pub async fn list_note_types(
    State(db): State<Database>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<NoteTypesResponse>, WebError> {
    let response = services::note_types(&db, event_id).await?;

    Ok(Json(response))
}
