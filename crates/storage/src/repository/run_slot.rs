use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::RunSlot;
use crate::services::generation::PlannedSlot;

const SLOT_COLUMNS: &str = r#"
    id, competition_id, event_id, entry_id, lane, heat, "order", status,
    started_at, completed_at
"#;

pub struct RunSlotRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> RunSlotRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&mut self, id: Uuid) -> Result<RunSlot> {
        sqlx::query_as::<_, RunSlot>(&format!("SELECT {} FROM run_slots WHERE id = $1", SLOT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found("run slot", id))
    }

    /// Row-locks every slot of one lane until the transaction ends.
    pub async fn lock_lane(&mut self, competition_id: Uuid, event_id: Uuid, lane: i32) -> Result<Vec<RunSlot>> {
        let slots = sqlx::query_as::<_, RunSlot>(&format!(
            r#"
            SELECT {}
            FROM run_slots
            WHERE competition_id = $1 AND event_id = $2 AND lane = $3
            ORDER BY heat, "order"
            FOR UPDATE
            "#,
            SLOT_COLUMNS
        ))
        .bind(competition_id)
        .bind(event_id)
        .bind(lane)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(slots)
    }

    pub async fn list_for_event(&mut self, competition_id: Uuid, event_id: Uuid) -> Result<Vec<RunSlot>> {
        let slots = sqlx::query_as::<_, RunSlot>(&format!(
            r#"
            SELECT {}
            FROM run_slots
            WHERE competition_id = $1 AND event_id = $2
            ORDER BY lane, heat, "order"
            "#,
            SLOT_COLUMNS
        ))
        .bind(competition_id)
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(slots)
    }

    pub async fn delete_for_event(&mut self, competition_id: Uuid, event_id: Uuid) -> Result<u64> {
        let result = sqlx::query("DELETE FROM run_slots WHERE competition_id = $1 AND event_id = $2")
            .bind(competition_id)
            .bind(event_id)
            .execute(&mut *self.conn)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn insert(&mut self, competition_id: Uuid, event_id: Uuid, planned: &PlannedSlot) -> Result<RunSlot> {
        sqlx::query_as::<_, RunSlot>(&format!(
            r#"
            INSERT INTO run_slots (competition_id, event_id, entry_id, lane, heat, "order", status, started_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, CASE WHEN $7 = 'current' THEN now() END)
            RETURNING {}
            "#,
            SLOT_COLUMNS
        ))
        .bind(competition_id)
        .bind(event_id)
        .bind(planned.entry_id)
        .bind(planned.lane)
        .bind(planned.heat)
        .bind(planned.order)
        .bind(planned.status.as_str())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| {
            let err = StorageError::from(e);
            if err.is_unique_violation() {
                StorageError::Integrity(format!(
                    "entry {} already has a run slot for event {}",
                    planned.entry_id, event_id
                ))
            } else {
                err
            }
        })
    }

    /// Persists the mutable state of a slot after a lane transition.
    pub async fn save_state(&mut self, slot: &RunSlot) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE run_slots
            SET status = $2, "order" = $3, started_at = $4, completed_at = $5
            WHERE id = $1
            "#,
        )
        .bind(slot.id)
        .bind(slot.status.as_str())
        .bind(slot.order)
        .bind(slot.started_at)
        .bind(slot.completed_at)
        .execute(&mut *self.conn)
        .await
        .map_err(|e| StorageError::from(e).unique_as_conflict("lane"))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("run slot", slot.id));
        }

        Ok(())
    }

    /// Next free run order of one lane, `max + 1` over rows this transaction
    /// holds locked through [`lock_lane`](Self::lock_lane).
    pub async fn next_order(&mut self, event_id: Uuid, lane: i32) -> Result<i32> {
        let max: Option<i32> = sqlx::query_scalar(
            r#"SELECT MAX("order") FROM run_slots WHERE event_id = $1 AND lane = $2"#,
        )
        .bind(event_id)
        .bind(lane)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(max.unwrap_or(0) + 1)
    }
}
