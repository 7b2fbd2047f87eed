pub mod request_id;

use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::controllers::{
    hc3::Hc3Controller, health, status::StatusController, tts::TtsController,
};
use crate::infrastructure::config::Config;
use request_id::request_id_middleware;

/// Build the webhook router with all routes configured
pub fn build_router(
    tts_controller: Arc<TtsController>,
    status_controller: Arc<StatusController>,
    hc3_controller: Arc<Hc3Controller>,
) -> Router {
    // Webhook routes (no auth; the daemon lives on a trusted LAN)
    let tts_routes = Router::new()
        .route("/tts", post(TtsController::speak))
        .with_state(tts_controller);

    let status_routes = Router::new()
        .route("/status", get(StatusController::get_status))
        .with_state(status_controller);

    let hc3_routes = Router::new()
        .route("/hc3/command", post(Hc3Controller::command))
        .with_state(hc3_controller);

    Router::new()
        .route("/health", get(health::health))
        .merge(tts_routes)
        .merge(status_routes)
        .merge(hc3_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    tts_controller: Arc<TtsController>,
    status_controller: Arc<StatusController>,
    hc3_controller: Arc<Hc3Controller>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(tts_controller, status_controller, hc3_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
