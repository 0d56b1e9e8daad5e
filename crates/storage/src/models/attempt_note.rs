use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

pub const OPENING_WEIGHT: &str = "opening_weight";
pub const NEXT_ATTEMPT: &str = "next_attempt";

/// Note types whose value is a declared weight.
pub const DECLARED_WEIGHT_TYPES: &[&str] = &[OPENING_WEIGHT, NEXT_ATTEMPT];

/// Attempt number used by notes saved from the organizer's note form,
/// as opposed to attempts recorded when a lifter completes.
pub const DECLARATION_ATTEMPT: i32 = 0;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttemptNote {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub event_id: Uuid,
    pub note_type: String,
    pub value: String,
    pub attempt_number: i32,
    pub updated_at: DateTime<Utc>,
}
