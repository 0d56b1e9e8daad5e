use anyhow::Context;
use axum::Router;
use storage::Database;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod features;
mod live;
mod state;

use config::Config;
use live::LiveHub;
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::run_order::handlers::generate_run_order,
        features::run_order::handlers::get_lane_board,
        features::run_order::handlers::update_current_lifter,
        features::run_order::handlers::complete_current_lifter,
        features::run_order::handlers::reactivate_lifter,
        features::scoring::handlers::save_event_note,
        features::scoring::handlers::record_result,
        features::scoring::handlers::assign_lane,
        features::scoring::handlers::recompute_event,
        features::scoring::handlers::get_standings,
        features::scoring::handlers::set_active_event,
        features::scoring::handlers::list_note_types,
    ),
    components(
        schemas(
            storage::dto::run_order::GenerateRunOrderRequest,
            storage::dto::run_order::CompleteLifterRequest,
            storage::dto::run_order::LaneTransition,
            storage::dto::run_order::CompletionResponse,
            storage::dto::run_order::CompletedSlot,
            storage::dto::run_order::LaneView,
            storage::dto::run_order::LaneBoard,
            storage::dto::scoring::SaveEventNoteRequest,
            storage::dto::scoring::RecordResultRequest,
            storage::dto::scoring::AssignLaneRequest,
            storage::dto::scoring::SetActiveEventRequest,
            storage::dto::scoring::ScoreUpdate,
            storage::dto::scoring::EventRecomputeSummary,
            storage::dto::scoring::NoteTypesResponse,
            storage::services::generation::RunOrderStrategy,
            storage::models::Competition,
            storage::models::Event,
            storage::models::EventKind,
            storage::models::Entry,
            storage::models::EventResult,
            storage::models::LaneAssignment,
            storage::models::AttemptNote,
            storage::models::RunSlot,
            storage::models::SlotStatus,
        )
    ),
    tags(
        (name = "run-order", description = "Lane queues and lifter transitions"),
        (name = "scoring", description = "Scores, notes, points and standings"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting scoring engine API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!(
        "Connecting to database at: {}",
        config
            .database_url
            .split('@')
            .next_back()
            .unwrap_or("unknown")
    );
    let db = Database::connect(&config.database_url, &config.database)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let state = AppState {
        db,
        hub: LiveHub::new(config.broadcast_capacity),
    };

    let app = Router::new()
        .nest("/api", features::api_routes())
        .nest("/ws", features::live::routes::routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
