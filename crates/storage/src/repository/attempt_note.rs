use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::AttemptNote;
use crate::models::attempt_note::{DECLARATION_ATTEMPT, DECLARED_WEIGHT_TYPES};

pub struct AttemptNoteRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> AttemptNoteRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    /// One declaration per (entry, event, note type); saving again overwrites it.
    pub async fn upsert_declaration(
        &mut self,
        entry_id: Uuid,
        event_id: Uuid,
        note_type: &str,
        value: &str,
    ) -> Result<AttemptNote> {
        let note = sqlx::query_as::<_, AttemptNote>(
            r#"
            INSERT INTO attempt_notes (entry_id, event_id, note_type, value, attempt_number)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (entry_id, event_id, note_type, attempt_number)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            RETURNING id, entry_id, event_id, note_type, value, attempt_number, updated_at
            "#,
        )
        .bind(entry_id)
        .bind(event_id)
        .bind(note_type)
        .bind(value)
        .bind(DECLARATION_ATTEMPT)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(note)
    }

    pub async fn insert_attempt(
        &mut self,
        entry_id: Uuid,
        event_id: Uuid,
        note_type: &str,
        value: &str,
        attempt_number: i32,
    ) -> Result<AttemptNote> {
        sqlx::query_as::<_, AttemptNote>(
            r#"
            INSERT INTO attempt_notes (entry_id, event_id, note_type, value, attempt_number)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, entry_id, event_id, note_type, value, attempt_number, updated_at
            "#,
        )
        .bind(entry_id)
        .bind(event_id)
        .bind(note_type)
        .bind(value)
        .bind(attempt_number)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| StorageError::from(e).unique_as_conflict("attempt log"))
    }

    /// Highest recorded attempt number, 0 when nothing was recorded yet.
    pub async fn last_attempt(&mut self, entry_id: Uuid, event_id: Uuid, note_type: &str) -> Result<i32> {
        let max: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT MAX(attempt_number)
            FROM attempt_notes
            WHERE entry_id = $1 AND event_id = $2 AND note_type = $3
            "#,
        )
        .bind(entry_id)
        .bind(event_id)
        .bind(note_type)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(max.unwrap_or(0))
    }

    /// Opening weights and next-attempt declarations of an event.
    pub async fn declared_weights(&mut self, event_id: Uuid) -> Result<Vec<AttemptNote>> {
        let types: Vec<String> = DECLARED_WEIGHT_TYPES.iter().map(|t| t.to_string()).collect();
        let notes = sqlx::query_as::<_, AttemptNote>(
            r#"
            SELECT id, entry_id, event_id, note_type, value, attempt_number, updated_at
            FROM attempt_notes
            WHERE event_id = $1 AND note_type = ANY($2)
            ORDER BY entry_id, attempt_number
            "#,
        )
        .bind(event_id)
        .bind(&types)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(notes)
    }
}
