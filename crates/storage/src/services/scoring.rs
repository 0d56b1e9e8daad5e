use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use super::ranking;
use super::scoring_group::ScoringGroupKey;
use crate::Database;
use crate::dto::scoring::{NoteTypesResponse, ScoreUpdate};
use crate::error::{Result, StorageError};
use crate::models::attempt_note::DECLARED_WEIGHT_TYPES;
use crate::models::{AttemptNote, Competition, Entry, LaneAssignment};
use crate::repository::attempt_note::AttemptNoteRepository;
use crate::repository::competition::CompetitionRepository;
use crate::repository::entry::EntryRepository;
use crate::repository::event::EventRepository;
use crate::repository::event_result::ResultRepository;
use crate::repository::lane_assignment::LaneAssignmentRepository;

/// Saves (or overwrites) an organizer note such as an opening weight.
///
/// A declared weight that is not a number is still stored; last-man-standing
/// generation skips it.
pub async fn save_event_note(
    db: &Database,
    entry_id: Uuid,
    event_id: Uuid,
    note_type: &str,
    value: &str,
) -> Result<AttemptNote> {
    let note_type = note_type.trim();
    let value = value.trim();
    if note_type.is_empty() || value.is_empty() {
        return Err(StorageError::Validation(
            "Both note type and value are required".to_string(),
        ));
    }

    let mut conn = db.pool().acquire().await?;
    let entry = EntryRepository::new(&mut conn).find_by_id(entry_id).await?;
    let event = EventRepository::new(&mut conn)
        .find_in_competition(entry.competition_id, event_id)
        .await?;

    if !event.weight_type.accepts_note_type(note_type) {
        return Err(StorageError::Validation(format!(
            "note type '{}' is not used by {} events like {}",
            note_type, event.weight_type, event.name
        )));
    }

    if DECLARED_WEIGHT_TYPES.contains(&note_type) && Decimal::from_str(value).is_err() {
        tracing::warn!(
            "Entry {} declared a non-numeric {} '{}' for event {}",
            entry_id,
            note_type,
            value,
            event_id
        );
    }

    AttemptNoteRepository::new(&mut conn)
        .upsert_declaration(entry_id, event_id, note_type, value)
        .await
}

/// Direct score entry outside the run order.
pub async fn record_result(db: &Database, entry_id: Uuid, event_id: Uuid, value: &str) -> Result<ScoreUpdate> {
    let mut tx = db.begin().await?;

    let entry = EntryRepository::new(&mut tx).find_by_id(entry_id).await?;
    EventRepository::new(&mut tx)
        .find_in_competition(entry.competition_id, event_id)
        .await?;

    ResultRepository::new(&mut tx)
        .upsert_value(entry_id, event_id, value.trim())
        .await?;
    ranking::recompute_event(&mut tx, entry.competition_id, event_id).await?;
    let update = score_snapshot(&mut tx, entry.competition_id, entry_id, event_id).await?;

    tx.commit().await?;

    tracing::info!(
        "Recorded '{}' for entry {} in event {}: {} points, {} total",
        update.value,
        entry_id,
        event_id,
        update.points_earned,
        update.total_points
    );

    Ok(update)
}

pub async fn assign_lane(
    db: &Database,
    entry_id: Uuid,
    event_id: Uuid,
    lane: i32,
    heat: i32,
) -> Result<LaneAssignment> {
    let mut conn = db.pool().acquire().await?;

    let entry = EntryRepository::new(&mut conn).find_by_id(entry_id).await?;
    let event = EventRepository::new(&mut conn)
        .find_in_competition(entry.competition_id, event_id)
        .await?;

    if !event.has_lane(lane) {
        return Err(StorageError::Validation(format!(
            "{} has {} lane(s), lane {} does not exist",
            event.name, event.number_of_lanes, lane
        )));
    }
    if heat < 1 {
        return Err(StorageError::Validation("Heat must be at least 1".to_string()));
    }

    LaneAssignmentRepository::new(&mut conn)
        .upsert(entry_id, event_id, lane, heat)
        .await
}

pub async fn set_active_event(db: &Database, competition_id: Uuid, event_id: Uuid) -> Result<Competition> {
    let mut tx = db.begin().await?;

    let event = EventRepository::new(&mut tx)
        .find_in_competition(competition_id, event_id)
        .await?;
    let competition = CompetitionRepository::new(&mut tx)
        .set_active_event(competition_id, event_id)
        .await?;

    tx.commit().await?;

    tracing::info!("Competition {} is now running {}", competition_id, event.name);

    Ok(competition)
}

pub async fn note_types(db: &Database, event_id: Uuid) -> Result<NoteTypesResponse> {
    let mut conn = db.pool().acquire().await?;
    let event = EventRepository::new(&mut conn).find_by_id(event_id).await?;

    Ok(NoteTypesResponse {
        event_id,
        weight_type: event.weight_type,
        note_types: event
            .weight_type
            .note_types()
            .iter()
            .map(|t| t.to_string())
            .collect(),
    })
}

/// Entries grouped by scoring group, best rank first within each group.
pub async fn standings(db: &Database, competition_id: Uuid) -> Result<Vec<Entry>> {
    let mut conn = db.pool().acquire().await?;

    CompetitionRepository::new(&mut conn)
        .find_by_id(competition_id)
        .await?;
    let mut entries = EntryRepository::new(&mut conn)
        .list_for_competition(competition_id)
        .await?;

    order_standings(&mut entries);
    Ok(entries)
}

pub fn order_standings(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        ScoringGroupKey::of(a)
            .cmp(&ScoringGroupKey::of(b))
            .then_with(|| match (a.rank, b.rank) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.registered_at.cmp(&b.registered_at))
    });
}

/// The committed result of one entry and event together with the entry's
/// running total.
pub(crate) async fn score_snapshot(
    conn: &mut PgConnection,
    competition_id: Uuid,
    entry_id: Uuid,
    event_id: Uuid,
) -> Result<ScoreUpdate> {
    let result = ResultRepository::new(conn)
        .find(entry_id, event_id)
        .await?
        .ok_or_else(|| StorageError::not_found("result for entry", entry_id))?;
    let entry = EntryRepository::new(conn).find_by_id(entry_id).await?;

    Ok(ScoreUpdate {
        competition_id,
        entry_id,
        event_id,
        value: result.value,
        points_earned: result.points_earned,
        event_rank: result.event_rank,
        total_points: entry.total_points,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(gender: &str, rank: Option<i32>, minutes: i64) -> Entry {
        Entry {
            id: Uuid::new_v4(),
            competition_id: Uuid::nil(),
            gender: gender.to_string(),
            division_id: None,
            weight_class_id: None,
            total_points: Decimal::ZERO,
            rank,
            registered_at: Utc::now() + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_standings_group_then_rank_unranked_last() {
        let m_unranked = entry("M", None, 0);
        let m_second = entry("M", Some(2), 1);
        let f_first = entry("F", Some(1), 2);
        let m_first = entry("M", Some(1), 3);

        let mut entries = vec![
            m_unranked.clone(),
            m_second.clone(),
            f_first.clone(),
            m_first.clone(),
        ];
        order_standings(&mut entries);

        let ids: Vec<Uuid> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![f_first.id, m_first.id, m_second.id, m_unranked.id]);
    }
}
