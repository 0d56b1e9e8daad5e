use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::scoring::ScoreUpdate;
use crate::models::RunSlot;
use crate::services::generation::RunOrderStrategy;

/// Request payload for generating the run order of an event
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct GenerateRunOrderRequest {
    #[serde(default)]
    pub strategy: RunOrderStrategy,
}

/// Request payload for recording the current lifter's attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CompleteLifterRequest {
    /// Raw score. Omit to finish the lifter without recording an attempt.
    #[validate(length(max = 64, message = "Score must be at most 64 characters"))]
    pub score: Option<String>,

    /// Retire the lifter even if attempts remain.
    #[serde(default)]
    pub force_complete: bool,
}

/// State of one lane after a transition.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LaneTransition {
    pub competition_id: Uuid,
    pub event_id: Uuid,
    pub lane: i32,
    pub current: Option<RunSlot>,
    pub on_deck: Option<RunSlot>,
    /// Slots whose state this transition wrote.
    pub changed: Vec<RunSlot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompletionResponse {
    #[serde(flatten)]
    pub transition: LaneTransition,
    /// Set when a score was given.
    pub attempt_number: Option<i32>,
    /// False when the lifter went back into the queue.
    pub completed: bool,
    pub score: Option<ScoreUpdate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompletedSlot {
    #[serde(flatten)]
    pub slot: RunSlot,
    pub value: Option<String>,
    pub points_earned: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LaneView {
    pub lane: i32,
    pub heats: Vec<i32>,
    pub current: Option<RunSlot>,
    pub on_deck: Option<RunSlot>,
    /// Waiting behind the on-deck slot, in promotion order.
    pub pending: Vec<RunSlot>,
    pub completed: Vec<CompletedSlot>,
}

/// Organizer and display view of every lane of an event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LaneBoard {
    pub competition_id: Uuid,
    pub event_id: Uuid,
    pub event_name: String,
    pub is_active: bool,
    pub lanes: Vec<LaneView>,
}
