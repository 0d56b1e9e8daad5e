use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LaneAssignment {
    pub entry_id: Uuid,
    pub event_id: Uuid,
    pub lane: i32,
    pub heat: i32,
}
