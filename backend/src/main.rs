//! Status Board Backend
//!
//! REST backend for the department and cell status dashboard, persisting the
//! current state and a day-partitioned history log in blob storage.

mod api;
mod clock;
mod config;
mod errors;
mod models;
mod service;
mod storage;
mod store;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clock::SystemClock;
use config::{Config, LogFormat};
use service::StatusService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StatusService>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    tracing::info!("Starting Status Board Backend");
    tracing::info!("Storage backend: {:?}", config.storage);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.live_updates_url.is_none() {
        tracing::info!("Live-update channel disabled (STATUS_BOARD_LIVE_UPDATES_URL unset)");
    }

    // Initialize storage and service
    let blobs = storage::open_blob_store(&config).await?;
    let service = Arc::new(StatusService::new(blobs, Arc::new(SystemClock)));

    if config.seed_demo
        && store::seed::seed_if_empty(service.entity_store(), service.now()).await?
    {
        tracing::info!("Seeded demo departments and cells");
    }

    // Create application state
    let state = AppState {
        service,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Status
        .route("/status", get(api::get_status))
        .route("/status/update", post(api::update_status))
        .route("/status/create", post(api::create_entity))
        .route("/status/delete", delete(api::delete_entity))
        // History
        .route("/history/{entity_id}", get(api::get_history))
        // Live updates
        .route("/negotiate", post(api::negotiate));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
