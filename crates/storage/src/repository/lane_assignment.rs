use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::Result;
use crate::models::LaneAssignment;

pub struct LaneAssignmentRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> LaneAssignmentRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn upsert(&mut self, entry_id: Uuid, event_id: Uuid, lane: i32, heat: i32) -> Result<LaneAssignment> {
        let assignment = sqlx::query_as::<_, LaneAssignment>(
            r#"
            INSERT INTO lane_assignments (entry_id, event_id, lane, heat)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (entry_id, event_id)
            DO UPDATE SET lane = EXCLUDED.lane, heat = EXCLUDED.heat
            RETURNING entry_id, event_id, lane, heat
            "#,
        )
        .bind(entry_id)
        .bind(event_id)
        .bind(lane)
        .bind(heat)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(assignment)
    }

    pub async fn list_for_event(&mut self, event_id: Uuid) -> Result<Vec<LaneAssignment>> {
        let assignments = sqlx::query_as::<_, LaneAssignment>(
            "SELECT entry_id, event_id, lane, heat FROM lane_assignments WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(assignments)
    }
}
