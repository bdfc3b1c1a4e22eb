//! Application builder: wires router, middleware and state into an Axum
//! app, and runs it.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_middleware;
use tower_http::trace::TraceLayer;

use casehub_core::config::AppConfig;
use casehub_core::error::AppError;
use casehub_database::store::Stores;
use casehub_worker::TaskRuntime;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
}

/// Runs the CaseHub server until Ctrl+C.
pub async fn run_server(
    config: AppConfig,
    stores: Stores,
    runtime: Arc<dyn TaskRuntime>,
) -> Result<(), AppError> {
    tokio::fs::create_dir_all(&config.workflow.data_root)
        .await
        .map_err(|e| {
            AppError::internal(format!(
                "Failed to create data root '{}': {e}",
                config.workflow.data_root
            ))
        })?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, stores, runtime);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(addr = %addr, "CaseHub server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("CaseHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
