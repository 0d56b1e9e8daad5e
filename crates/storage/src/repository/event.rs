use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::Event;

pub struct EventRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> EventRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&mut self, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, competition_id, name, weight_type, number_of_lanes, max_attempts, event_order
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| StorageError::not_found("event", id))
    }

    /// Like [`find_by_id`](Self::find_by_id), but an event of another
    /// competition counts as missing.
    pub async fn find_in_competition(&mut self, competition_id: Uuid, id: Uuid) -> Result<Event> {
        let event = self.find_by_id(id).await?;
        if event.competition_id != competition_id {
            return Err(StorageError::NotFound(format!(
                "event {} does not belong to competition {}",
                id, competition_id
            )));
        }
        Ok(event)
    }

    /// Row-locks the event until the transaction ends. Recomputes of one
    /// event queue up here, so each one reads results committed before it.
    pub async fn lock_in_competition(&mut self, competition_id: Uuid, id: Uuid) -> Result<Event> {
        sqlx::query_as::<_, Event>(
            r#"
            SELECT id, competition_id, name, weight_type, number_of_lanes, max_attempts, event_order
            FROM events
            WHERE id = $1 AND competition_id = $2
            FOR NO KEY UPDATE
            "#,
        )
        .bind(id)
        .bind(competition_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| {
            StorageError::NotFound(format!(
                "event {} does not belong to competition {}",
                id, competition_id
            ))
        })
    }
}
