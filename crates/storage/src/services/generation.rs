use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::scoring_group::{ScoringGroupKey, partition};
use crate::models::attempt_note::DECLARED_WEIGHT_TYPES;
use crate::models::{AttemptNote, Entry, LaneAssignment, ParseEnumError, SlotStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunOrderStrategy {
    /// Scoring group by scoring group, each in registration order.
    #[default]
    DivisionSignup,
    /// Lightest declared attempt first, single lane.
    LastManStanding,
}

impl RunOrderStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DivisionSignup => "division_signup",
            Self::LastManStanding => "last_man_standing",
        }
    }
}

impl fmt::Display for RunOrderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RunOrderStrategy {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "division_signup" => Ok(Self::DivisionSignup),
            "last_man_standing" => Ok(Self::LastManStanding),
            _ => Err(ParseEnumError::new("run order strategy", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlot {
    pub entry_id: Uuid,
    pub lane: i32,
    pub heat: i32,
    pub order: i32,
    pub status: SlotStatus,
}

pub fn plan_division_signup(entries: &[Entry], assignments: &[LaneAssignment]) -> Vec<PlannedSlot> {
    let lanes: HashMap<Uuid, (i32, i32)> = assignments
        .iter()
        .map(|a| (a.entry_id, (a.lane, a.heat)))
        .collect();

    let groups = partition(entries.iter(), |entry| ScoringGroupKey::of(entry));
    let flattened = groups.into_values().flat_map(|mut group| {
        group.sort_by_key(|entry| (entry.registered_at, entry.id));
        group
    });

    seed(flattened.map(|entry| {
        let (lane, heat) = lanes.get(&entry.id).copied().unwrap_or((1, 1));
        (entry.id, lane, heat)
    }))
}

/// Orders entries by their lightest declared weight. Entries without a
/// parseable `opening_weight` or `next_attempt` note are left out.
pub fn plan_last_man_standing(entries: &[Entry], notes: &[AttemptNote]) -> Vec<PlannedSlot> {
    let mut lightest: HashMap<Uuid, Decimal> = HashMap::new();
    for note in notes
        .iter()
        .filter(|n| DECLARED_WEIGHT_TYPES.contains(&n.note_type.as_str()))
    {
        let Ok(weight) = Decimal::from_str(note.value.trim()) else {
            tracing::debug!(
                "Ignoring unparseable {} '{}' for entry {}",
                note.note_type,
                note.value,
                note.entry_id
            );
            continue;
        };
        lightest
            .entry(note.entry_id)
            .and_modify(|w| *w = (*w).min(weight))
            .or_insert(weight);
    }

    let mut ranked: Vec<(Decimal, &Entry)> = entries
        .iter()
        .filter_map(|entry| lightest.get(&entry.id).map(|w| (*w, entry)))
        .collect();
    ranked.sort_by_key(|(weight, entry)| (*weight, entry.registered_at, entry.id));

    seed(ranked.into_iter().map(|(_, entry)| (entry.id, 1, 1)))
}

/// Numbers slots 1..N and makes the first one current.
fn seed(ordered: impl Iterator<Item = (Uuid, i32, i32)>) -> Vec<PlannedSlot> {
    ordered
        .enumerate()
        .map(|(i, (entry_id, lane, heat))| PlannedSlot {
            entry_id,
            lane,
            heat,
            order: i as i32 + 1,
            status: if i == 0 {
                SlotStatus::Current
            } else {
                SlotStatus::Pending
            },
        })
        .collect()
}
