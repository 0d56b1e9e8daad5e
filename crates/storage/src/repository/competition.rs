use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Competition;

/// Repository for Competition database operations
pub struct CompetitionRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> CompetitionRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// Get a competition by ID
    pub async fn find_by_id(&mut self, id: Uuid) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(
            r#"
            SELECT id, name, active_event_id, created_at
            FROM competitions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| StorageError::not_found("competition", id))
    }

    /// Row-locks the competition so standings are summed by one
    /// transaction at a time
    pub async fn lock(&mut self, id: Uuid) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(
            r#"
            SELECT id, name, active_event_id, created_at
            FROM competitions
            WHERE id = $1
            FOR NO KEY UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| StorageError::not_found("competition", id))
    }

    /// Point the competition at the event that is running now
    pub async fn set_active_event(&mut self, id: Uuid, event_id: Uuid) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(
            r#"
            UPDATE competitions
            SET active_event_id = $2
            WHERE id = $1
            RETURNING id, name, active_event_id, created_at
            "#,
        )
        .bind(id)
        .bind(event_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| StorageError::not_found("competition", id))
    }
}
