use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::Result;
use crate::models::EventResult;

/// A result joined with the grouping fields of its entry.
#[derive(Debug, Clone, FromRow)]
pub struct GroupedResult {
    pub result_id: Uuid,
    pub entry_id: Uuid,
    pub value: String,
    pub gender: String,
    pub division_id: Option<Uuid>,
    pub weight_class_id: Option<Uuid>,
}

pub struct ResultRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> ResultRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Creates the result on first score entry, overwrites the value afterwards.
    pub async fn upsert_value(&mut self, entry_id: Uuid, event_id: Uuid, value: &str) -> Result<EventResult> {
        let result = sqlx::query_as::<_, EventResult>(
            r#"
            INSERT INTO results (entry_id, event_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (entry_id, event_id)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            RETURNING id, entry_id, event_id, value, points_earned, event_rank, updated_at
            "#,
        )
        .bind(entry_id)
        .bind(event_id)
        .bind(value)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(result)
    }

    pub async fn find(&mut self, entry_id: Uuid, event_id: Uuid) -> Result<Option<EventResult>> {
        let result = sqlx::query_as::<_, EventResult>(
            r#"
            SELECT id, entry_id, event_id, value, points_earned, event_rank, updated_at
            FROM results
            WHERE entry_id = $1 AND event_id = $2
            "#,
        )
        .bind(entry_id)
        .bind(event_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(result)
    }

    pub async fn list_for_event(&mut self, event_id: Uuid) -> Result<Vec<EventResult>> {
        let results = sqlx::query_as::<_, EventResult>(
            r#"
            SELECT id, entry_id, event_id, value, points_earned, event_rank, updated_at
            FROM results
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(results)
    }

    pub async fn list_grouped_for_event(
        &mut self,
        competition_id: Uuid,
        event_id: Uuid,
    ) -> Result<Vec<GroupedResult>> {
        let results = sqlx::query_as::<_, GroupedResult>(
            r#"
            SELECT
                r.id AS result_id,
                r.entry_id,
                r.value,
                e.gender,
                e.division_id,
                e.weight_class_id
            FROM results r
            INNER JOIN entries e ON e.id = r.entry_id
            WHERE r.event_id = $1 AND e.competition_id = $2
            ORDER BY r.id
            "#,
        )
        .bind(event_id)
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(results)
    }

    pub async fn apply_placements(&mut self, ids: &[Uuid], points: &[Decimal], ranks: &[i32]) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE results AS r
            SET points_earned = u.points, event_rank = u.rank
            FROM UNNEST($1::uuid[], $2::numeric[], $3::int4[]) AS u(id, points, rank)
            WHERE r.id = u.id
            "#,
        )
        .bind(ids)
        .bind(points)
        .bind(ranks)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}
