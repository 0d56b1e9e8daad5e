use axum::extract::FromRef;
use storage::Database;

use crate::live::LiveHub;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Database,
    pub hub: LiveHub,
}
