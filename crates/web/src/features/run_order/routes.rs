use axum::{Router, routing::post};

use super::handlers::{
    complete_current_lifter, generate_run_order, get_lane_board, reactivate_lifter,
    update_current_lifter,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/competitions/:competition_id/events/:event_id/run-order",
            post(generate_run_order).get(get_lane_board),
        )
        .route("/run-slots/:slot_id/current", post(update_current_lifter))
        .route("/run-slots/:slot_id/complete", post(complete_current_lifter))
        .route("/run-slots/:slot_id/reactivate", post(reactivate_lifter))
}
