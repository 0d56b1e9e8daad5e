use axum::{
    Router,
    routing::{get, post, put},
};

use super::handlers::{
    assign_lane, get_standings, list_note_types, recompute_event, record_result,
    save_event_note, set_active_event,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/entries/:entry_id/events/:event_id/notes", put(save_event_note))
        .route("/entries/:entry_id/events/:event_id/result", put(record_result))
        .route("/entries/:entry_id/events/:event_id/lane", put(assign_lane))
        .route(
            "/competitions/:competition_id/events/:event_id/recompute",
            post(recompute_event),
        )
        .route("/competitions/:competition_id/standings", get(get_standings))
        .route("/competitions/:competition_id/active-event", put(set_active_event))
        .route("/events/:event_id/note-types", get(list_note_types))
}
