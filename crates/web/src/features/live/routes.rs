use axum::{Router, routing::get};

use super::handlers::watch_competition;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/competitions/:competition_id", get(watch_competition))
}
