pub mod live;
pub mod run_order;
pub mod scoring;

use axum::Router;

use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(run_order::routes::routes())
        .merge(scoring::routes::routes())
}
