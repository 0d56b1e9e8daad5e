use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::run_order::{
        CompleteLifterRequest, CompletionResponse, GenerateRunOrderRequest, LaneBoard,
        LaneTransition,
    },
    models::RunSlot,
};
use uuid::Uuid;
use validator::Validate;

use crate::{error::WebError, live::LiveHub};

use super::services;

#[utoipa::path(
    post,
    path = "/api/competitions/{competition_id}/events/{event_id}/run-order",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    request_body = GenerateRunOrderRequest,
    responses(
        (status = 201, description = "Run order replaced; the first lifter of each lane is current", body = Vec<RunSlot>),
        (status = 404, description = "Competition or event not found"),
        (status = 409, description = "Another generation is running for this event"),
        (status = 500, description = "Generation aborted, previous order kept")
    ),
    tag = "run-order"
)]
pub async fn generate_run_order(
    State(db): State<Database>,
    State(hub): State<LiveHub>,
    Path((competition_id, event_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<GenerateRunOrderRequest>,
) -> Result<Response, WebError> {
    let slots =
        services::generate_run_order(&db, &hub, competition_id, event_id, req.strategy).await?;

    Ok((StatusCode::CREATED, Json(slots)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{competition_id}/events/{event_id}/run-order",
    params(
        ("competition_id" = Uuid, Path, description = "Competition ID"),
        ("event_id" = Uuid, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Current, on-deck, pending and completed lifters per lane", body = LaneBoard),
        (status = 404, description = "Competition or event not found")
    ),
    tag = "run-order"
)]
pub async fn get_lane_board(
    State(db): State<Database>,
    Path((competition_id, event_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<LaneBoard>, WebError> {
    let board = services::lane_board(&db, competition_id, event_id).await?;

    Ok(Json(board))
}

#[utoipa::path(
    post,
    path = "/api/run-slots/{slot_id}/current",
    params(
        ("slot_id" = Uuid, Path, description = "Run slot ID")
    ),
    responses(
        (status = 200, description = "Slot is now the current lifter of its lane", body = LaneTransition),
        (status = 404, description = "Slot not found"),
        (status = 409, description = "Slot already completed, or the lane changed concurrently"),
        (status = 503, description = "Lane is locked by another transition; retry")
    ),
    tag = "run-order"
)]
pub async fn update_current_lifter(
    State(db): State<Database>,
    State(hub): State<LiveHub>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<LaneTransition>, WebError> {
    let transition = services::update_current_lifter(&db, &hub, slot_id).await?;

    Ok(Json(transition))
}

#[utoipa::path(
    post,
    path = "/api/run-slots/{slot_id}/complete",
    params(
        ("slot_id" = Uuid, Path, description = "Run slot ID")
    ),
    request_body = CompleteLifterRequest,
    responses(
        (status = 200, description = "Attempt recorded and the lane advanced", body = CompletionResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Slot not found"),
        (status = 409, description = "Slot is not the current lifter of its lane"),
        (status = 503, description = "Lane is locked by another transition; retry")
    ),
    tag = "run-order"
)]
pub async fn complete_current_lifter(
    State(db): State<Database>,
    State(hub): State<LiveHub>,
    Path(slot_id): Path<Uuid>,
    Json(req): Json<CompleteLifterRequest>,
) -> Result<Json<CompletionResponse>, WebError> {
    req.validate()?;

    let response = services::complete_current_lifter(&db, &hub, slot_id, &req).await?;

    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/run-slots/{slot_id}/reactivate",
    params(
        ("slot_id" = Uuid, Path, description = "Run slot ID")
    ),
    responses(
        (status = 200, description = "Lifter is back in the queue", body = LaneTransition),
        (status = 404, description = "Slot not found"),
        (status = 409, description = "Slot is not completed")
    ),
    tag = "run-order"
)]
pub async fn reactivate_lifter(
    State(db): State<Database>,
    State(hub): State<LiveHub>,
    Path(slot_id): Path<Uuid>,
) -> Result<Json<LaneTransition>, WebError> {
    let transition = services::reactivate_lifter(&db, &hub, slot_id).await?;

    Ok(Json(transition))
}
