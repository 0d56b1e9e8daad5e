use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// How raw result values of an event compare to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Time,
    Reps,
    Distance,
    Height,
    Max,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Reps => "reps",
            Self::Distance => "distance",
            Self::Height => "height",
            Self::Max => "max",
        }
    }

    /// Note types an organizer may attach to an entry for this kind of event.
    pub fn note_types(&self) -> &'static [&'static str] {
        match self {
            Self::Max => &[
                "general",
                "equipment",
                "custom",
                "opening_weight",
                "next_attempt",
                "rack_height",
            ],
            Self::Time => &["general", "equipment", "custom", "target_time", "strategy"],
            Self::Distance => &["general", "equipment", "custom", "implement_selection"],
            Self::Reps => &["general", "equipment", "custom", "target_reps"],
            Self::Height => &["general", "equipment", "custom"],
        }
    }

    pub fn accepts_note_type(&self, note_type: &str) -> bool {
        self.note_types().contains(&note_type)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(Self::Time),
            "reps" => Ok(Self::Reps),
            "distance" => Ok(Self::Distance),
            "height" => Ok(Self::Height),
            "max" => Ok(Self::Max),
            _ => Err(ParseEnumError::new("event kind", s)),
        }
    }
}

impl TryFrom<String> for EventKind {
    type Error = ParseEnumError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Event {
    pub id: Uuid,
    pub competition_id: Uuid,
    pub name: String,
    #[sqlx(try_from = "String")]
    pub weight_type: EventKind,
    pub number_of_lanes: i32,
    pub max_attempts: i32,
    pub event_order: i32,
}

impl Event {
    pub fn has_lane(&self, lane: i32) -> bool {
        (1..=self.number_of_lanes.max(1)).contains(&lane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_parsing() {
        assert_eq!("time".parse::<EventKind>().unwrap(), EventKind::Time);
        assert_eq!("MAX".parse::<EventKind>().unwrap(), EventKind::Max);
        assert_eq!(
            EventKind::try_from("distance".to_string()).unwrap(),
            EventKind::Distance
        );
        assert!("weight".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_note_types_per_kind() {
        assert!(EventKind::Max.accepts_note_type("opening_weight"));
        assert!(EventKind::Time.accepts_note_type("target_time"));
        assert!(EventKind::Reps.accepts_note_type("general"));
        assert!(!EventKind::Reps.accepts_note_type("opening_weight"));
        assert!(!EventKind::Height.accepts_note_type(""));
    }
}
