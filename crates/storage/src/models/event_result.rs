use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EventResult {
    pub id: Uuid,
    pub entry_id: Uuid,
    pub event_id: Uuid,
    pub value: String,
    pub points_earned: Decimal,
    pub event_rank: Option<i32>,
    pub updated_at: DateTime<Utc>,
}
