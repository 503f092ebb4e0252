//! Gateway server setup
//!
//! Routes, store wiring, and the serve loop with graceful shutdown.

mod handler;
mod state;

pub use handler::ws_handler;
pub use state::GatewayState;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use room_common::{AppConfig, AppError, ConfigError, StoreBackend};
use room_db::{MemoryStore, PgMessageRepository, PgUserRepository};
use room_service::{ServiceContext, ServiceContextBuilder};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// How long shutdown waits for open sessions to run their disconnect flow
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Create the gateway router
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    /// Joined sessions
    connections: usize,
}

/// Health check endpoint
async fn health_check(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        connections: state.registry().count(),
    })
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Connect the configured store and build the service context
async fn create_service_context(config: &AppConfig) -> Result<ServiceContext, AppError> {
    let builder = ServiceContextBuilder::new();

    let builder = match config.store.backend {
        StoreBackend::Postgres => {
            let database = config
                .store
                .database
                .as_ref()
                .ok_or(ConfigError::MissingVar("DATABASE_URL"))?;

            tracing::info!("Connecting to PostgreSQL...");
            let pool = room_db::create_pool(&room_db::DatabaseConfig::from(database))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            room_db::ensure_schema(&pool)
                .await
                .map_err(|e| AppError::Database(format!("Schema bootstrap failed: {e}")))?;
            tracing::info!("PostgreSQL connection established");

            builder
                .user_repo(Arc::new(PgUserRepository::new(pool.clone())))
                .message_repo(Arc::new(PgMessageRepository::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; history is lost on restart");
            let store = MemoryStore::new();
            builder
                .user_repo(Arc::new(store.user_repo()))
                .message_repo(Arc::new(store.message_repo()))
        }
    };

    Ok(builder.build()?)
}

/// Initialize all dependencies and create `GatewayState`
///
/// Starts the rate limiter's sweeper; [`run_server`] stops it.
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    let service_context = create_service_context(&config).await?;
    let state = GatewayState::new(service_context, config);
    Arc::clone(state.rate_limiter()).start();
    Ok(state)
}

/// Serve until `shutdown` resolves, then close every connection
///
/// After the listener stops, live sockets get a close frame and their
/// disconnect flows run; the sweeper is stopped last.
pub async fn run_server<F>(listener: TcpListener, state: GatewayState, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(state.clone());
    let signal_state = state.clone();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("Shutdown signal received, closing connections");
            signal_state.trigger_shutdown();
        })
        .await
        .map_err(|e| AppError::Server(format!("Server error: {e}")))?;

    drain_sessions(&state).await;
    state.rate_limiter().stop();

    tracing::info!("Gateway stopped");
    Ok(())
}

/// Wait for open sessions to finish disconnecting, up to [`DRAIN_TIMEOUT`]
async fn drain_sessions(state: &GatewayState) {
    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    while !state.registry().is_empty() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let remaining = state.registry().count();
    if remaining > 0 {
        tracing::warn!(remaining, "Sessions still open after drain timeout");
    }
}

/// Resolve on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

/// Run the complete gateway server with configuration
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = config.gateway.address();

    // Create gateway state
    let state = create_gateway_state(config).await?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!("Gateway listening on ws://{}/ws", addr);

    run_server(listener, state, shutdown_signal()).await
}
