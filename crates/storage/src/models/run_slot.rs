use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::event::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Pending,
    Current,
    Completed,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Current => "current",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SlotStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "current" => Ok(Self::Current),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseEnumError::new("slot status", s)),
        }
    }
}

impl TryFrom<String> for SlotStatus {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One entry's place in the run order of one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RunSlot {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub event_id: Uuid,
    pub entry_id: Uuid,
    pub lane: i32,
    pub heat: i32,
    pub order: i32,
    #[sqlx(try_from = "String")]
    pub status: SlotStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl RunSlot {
    /// Promotion key: lower runs earlier.
    pub fn queue_position(&self) -> (i32, i32) {
        (self.heat, self.order)
    }

    pub fn is_pending(&self) -> bool {
        self.status == SlotStatus::Pending
    }
}
