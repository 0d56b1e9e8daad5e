use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// An athlete's registration within one competition.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entry {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub gender: String,
    pub division_id: Option<Uuid>,
    pub weight_class_id: Option<Uuid>,
    pub total_points: Decimal,
    /// Overall rank inside the scoring group, unset until standings are computed.
    pub rank: Option<i32>,
    pub registered_at: DateTime<Utc>,
}
