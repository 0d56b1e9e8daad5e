//! Fixtures for tests that need Postgres. Every test creates its own
//! competition, so tests can share one database and run in parallel.
#![allow(dead_code)]

use storage::Database;
use storage::models::{EventResult, RunSlot, SlotStatus};
use storage::repository::entry::EntryRepository;
use storage::repository::event_result::ResultRepository;
use storage::repository::run_slot::RunSlotRepository;
use uuid::Uuid;

/// Connects to `DATABASE_URL` and migrates it. `None` skips the test when no
/// database is configured.
pub async fn database() -> Option<Database> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL is not set, skipping database test");
        return None;
    };

    let db = Database::new(&url)
        .await
        .expect("Failed to connect to DATABASE_URL");
    db.run_migrations()
        .await
        .expect("Failed to run migrations");
    Some(db)
}

pub struct Meet {
    pub competition_id: Uuid,
    pub event_id: Uuid,
}

impl Meet {
    pub async fn create(db: &Database, weight_type: &str, lanes: i32, max_attempts: i32) -> Self {
        let competition_id: Uuid =
            sqlx::query_scalar("INSERT INTO competitions (name) VALUES ('Test Open') RETURNING id")
                .fetch_one(db.pool())
                .await
                .expect("Failed to insert competition");

        let event_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO events (competition_id, name, weight_type, number_of_lanes, max_attempts)
            VALUES ($1, 'Log Press', $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(competition_id)
        .bind(weight_type)
        .bind(lanes)
        .bind(max_attempts)
        .fetch_one(db.pool())
        .await
        .expect("Failed to insert event");

        Self {
            competition_id,
            event_id,
        }
    }

    /// Registers an entry `seconds_late` seconds after the first one.
    pub async fn entry(&self, db: &Database, gender: &str, seconds_late: i32) -> Uuid {
        sqlx::query_scalar(
            r#"
            INSERT INTO entries (competition_id, gender, registered_at)
            VALUES ($1, $2, TIMESTAMPTZ '2025-03-01 09:00:00+00' + $3::int * INTERVAL '1 second')
            RETURNING id
            "#,
        )
        .bind(self.competition_id)
        .bind(gender)
        .bind(seconds_late)
        .fetch_one(db.pool())
        .await
        .expect("Failed to insert entry")
    }

    pub async fn result(&self, db: &Database, entry_id: Uuid) -> EventResult {
        let mut conn = db.pool().acquire().await.unwrap();
        ResultRepository::new(&mut conn)
            .find(entry_id, self.event_id)
            .await
            .unwrap()
            .expect("entry has no result")
    }

    pub async fn entry_standing(&self, db: &Database, entry_id: Uuid) -> storage::models::Entry {
        let mut conn = db.pool().acquire().await.unwrap();
        EntryRepository::new(&mut conn).find_by_id(entry_id).await.unwrap()
    }

    pub async fn slots(&self, db: &Database) -> Vec<RunSlot> {
        let mut conn = db.pool().acquire().await.unwrap();
        RunSlotRepository::new(&mut conn)
            .list_for_event(self.competition_id, self.event_id)
            .await
            .unwrap()
    }

    pub async fn current_in_lane(&self, db: &Database, lane: i32) -> Vec<RunSlot> {
        self.slots(db)
            .await
            .into_iter()
            .filter(|s| s.lane == lane && s.status == SlotStatus::Current)
            .collect()
    }
}

pub fn slot_of(slots: &[RunSlot], entry_id: Uuid) -> &RunSlot {
    slots
        .iter()
        .find(|s| s.entry_id == entry_id)
        .expect("entry has no run slot")
}
