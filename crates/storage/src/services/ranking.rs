//! Event placement and overall standings, recomputed from committed results.
//!
//! Both operations run on a caller-supplied connection so a score write and
//! the recomputation it triggers can share one transaction. Each starts by
//! row-locking its event or competition; under READ COMMITTED the reads that
//! follow the lock see every score committed by the transaction that held it.

use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use super::comparator::performance_key;
use super::placement::{place_group, rank_totals};
use super::scoring_group::{ScoringGroupKey, partition};
use crate::Database;
use crate::dto::scoring::EventRecomputeSummary;
use crate::error::Result;
use crate::repository::competition::CompetitionRepository;
use crate::repository::entry::EntryRepository;
use crate::repository::event::EventRepository;
use crate::repository::event_result::ResultRepository;

pub async fn recompute_event(
    conn: &mut PgConnection,
    competition_id: Uuid,
    event_id: Uuid,
) -> Result<EventRecomputeSummary> {
    let event = EventRepository::new(conn)
        .lock_in_competition(competition_id, event_id)
        .await?;

    let results = ResultRepository::new(conn)
        .list_grouped_for_event(competition_id, event_id)
        .await?;
    let result_count = results.len();

    let groups = partition(results, |r| {
        ScoringGroupKey::new(&r.gender, r.division_id, r.weight_class_id)
    });
    let group_count = groups.len();

    let mut ids = Vec::with_capacity(result_count);
    let mut points = Vec::with_capacity(result_count);
    let mut ranks = Vec::with_capacity(result_count);
    let mut unscored = 0;

    for (key, group) in &groups {
        let keys: Vec<_> = group
            .iter()
            .map(|r| performance_key(event.weight_type, &r.value))
            .collect();
        unscored += keys.iter().filter(|k| !k.is_scored()).count();

        for (result, placement) in group.iter().zip(place_group(&keys)) {
            ids.push(result.result_id);
            points.push(placement.points);
            ranks.push(placement.rank);
        }

        tracing::debug!(
            "Placed {} results of event {} in group {}",
            group.len(),
            event_id,
            key
        );
    }

    ResultRepository::new(conn)
        .apply_placements(&ids, &points, &ranks)
        .await?;

    let entries_ranked = recompute_standings(conn, competition_id).await?;

    tracing::info!(
        "Recomputed event {} ({}): {} results in {} groups, {} without a score",
        event.name,
        event_id,
        result_count,
        group_count,
        unscored
    );

    Ok(EventRecomputeSummary {
        event_id,
        results: result_count,
        groups: group_count,
        unscored,
        entries_ranked,
    })
}

/// Sums per-event points into `total_points` and ranks every entry of the
/// competition inside its scoring group. Returns the number of entries updated.
pub async fn recompute_standings(conn: &mut PgConnection, competition_id: Uuid) -> Result<u64> {
    CompetitionRepository::new(conn).lock(competition_id).await?;

    let totals = EntryRepository::new(conn)
        .totals_for_competition(competition_id)
        .await?;
    let groups = partition(totals, |t| {
        ScoringGroupKey::new(&t.gender, t.division_id, t.weight_class_id)
    });

    let mut ids = Vec::new();
    let mut sums: Vec<Decimal> = Vec::new();
    let mut ranks = Vec::new();

    for group in groups.values() {
        let group_totals: Vec<Decimal> = group.iter().map(|t| t.total_points).collect();
        for (total, rank) in group.iter().zip(rank_totals(&group_totals)) {
            ids.push(total.entry_id);
            sums.push(total.total_points);
            ranks.push(rank);
        }
    }

    EntryRepository::new(conn)
        .apply_standings(&ids, &sums, &ranks)
        .await
}

/// Standalone recompute for organizers, in its own transaction.
pub async fn recompute_event_now(
    db: &Database,
    competition_id: Uuid,
    event_id: Uuid,
) -> Result<EventRecomputeSummary> {
    let mut tx = db.begin().await?;
    let summary = recompute_event(&mut tx, competition_id, event_id).await?;
    tx.commit().await?;
    Ok(summary)
}
