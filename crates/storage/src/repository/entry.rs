use rust_decimal::Decimal;
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Entry;

const ENTRY_COLUMNS: &str = r#"
    id, competition_id, gender, division_id, weight_class_id,
    total_points, rank, registered_at
"#;

/// An entry with the sum of its per-event points.
#[derive(Debug, Clone, FromRow)]
pub struct EntryTotal {
    pub entry_id: Uuid,
    pub gender: String,
    pub division_id: Option<Uuid>,
    pub weight_class_id: Option<Uuid>,
    pub total_points: Decimal,
}

pub struct EntryRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> EntryRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&mut self, id: Uuid) -> Result<Entry> {
        sqlx::query_as::<_, Entry>(&format!("SELECT {} FROM entries WHERE id = $1", ENTRY_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found("entry", id))
    }

    /// Entries in registration order
    pub async fn list_for_competition(&mut self, competition_id: Uuid) -> Result<Vec<Entry>> {
        let entries = sqlx::query_as::<_, Entry>(&format!(
            "SELECT {} FROM entries WHERE competition_id = $1 ORDER BY registered_at, id",
            ENTRY_COLUMNS
        ))
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(entries)
    }

    /// Every entry of the competition, including those without results yet.
    pub async fn totals_for_competition(&mut self, competition_id: Uuid) -> Result<Vec<EntryTotal>> {
        let totals = sqlx::query_as::<_, EntryTotal>(
            r#"
            SELECT
                e.id AS entry_id,
                e.gender,
                e.division_id,
                e.weight_class_id,
                COALESCE(SUM(r.points_earned), 0) AS total_points
            FROM entries e
            LEFT JOIN results r ON r.entry_id = e.id
            WHERE e.competition_id = $1
            GROUP BY e.id, e.gender, e.division_id, e.weight_class_id
            "#,
        )
        .bind(competition_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(totals)
    }

    pub async fn apply_standings(
        &mut self,
        ids: &[Uuid],
        totals: &[Decimal],
        ranks: &[i32],
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE entries AS e
            SET total_points = u.total_points, rank = u.rank
            FROM UNNEST($1::uuid[], $2::numeric[], $3::int4[]) AS u(id, total_points, rank)
            WHERE e.id = u.id
            "#,
        )
        .bind(ids)
        .bind(totals)
        .bind(ranks)
        .execute(&mut *self.conn)
        .await?;

        Ok(result.rows_affected())
    }
}
