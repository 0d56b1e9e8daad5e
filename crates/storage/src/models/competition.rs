use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub id: Uuid,
    pub name: String,
    /// At most one event runs at a time.
    pub active_event_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
