use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::EventKind;

/// Request payload for saving an organizer note for one entry and event
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SaveEventNoteRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Note type must be between 1 and 100 characters"
    ))]
    pub note_type: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Note value must be between 1 and 255 characters"
    ))]
    pub value: String,
}

/// Request payload for entering a score directly
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordResultRequest {
    #[validate(length(max = 255))]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignLaneRequest {
    #[validate(range(min = 1, message = "Lane must be at least 1"))]
    pub lane: i32,

    #[validate(range(min = 1, message = "Heat must be at least 1"))]
    #[serde(default = "default_heat")]
    pub heat: i32,
}

fn default_heat() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetActiveEventRequest {
    pub event_id: Uuid,
}

/// A committed score with the points it produced, ready to broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoreUpdate {
    pub competition_id: Uuid,
    pub entry_id: Uuid,
    pub event_id: Uuid,
    pub value: String,
    pub points_earned: Decimal,
    pub event_rank: Option<i32>,
    pub total_points: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventRecomputeSummary {
    pub event_id: Uuid,
    pub results: usize,
    pub groups: usize,
    /// Results placed as "no score".
    pub unscored: usize,
    pub entries_ranked: u64,
}

/// Note types an organizer may record for an event, given its kind.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteTypesResponse {
    pub event_id: Uuid,
    pub weight_type: EventKind,
    pub note_types: Vec<String>,
}
