//! Route definitions for the CaseHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the API router with every route bound to `state`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(role_routes())
        .merge(file_routes())
        .merge(workflow_routes())
        .merge(template_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Folder sharing and grant removal
fn role_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders/{folder_id}/roles",
            post(handlers::permission::share_folder),
        )
        .route(
            "/folders/{folder_id}/roles/me",
            get(handlers::permission::my_role),
        )
        .route(
            "/folders/{folder_id}/roles/users/{role_id}",
            delete(handlers::permission::delete_user_role),
        )
        .route(
            "/folders/{folder_id}/roles/groups/{role_id}",
            delete(handlers::permission::delete_group_role),
        )
}

/// File metadata
fn file_routes() -> Router<AppState> {
    Router::new().route("/files/{file_id}", get(handlers::file::get_file))
}

/// Workflow lifecycle
fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders/{folder_id}/workflows",
            post(handlers::workflow::create_workflow),
        )
        .route(
            "/folders/{folder_id}/workflows/{workflow_id}",
            get(handlers::workflow::get_workflow),
        )
        .route(
            "/folders/{folder_id}/workflows/{workflow_id}/copy",
            post(handlers::workflow::copy_workflow),
        )
        .route(
            "/folders/{folder_id}/workflows/{workflow_id}/run",
            post(handlers::workflow::run_workflow),
        )
}

/// Workflow templates
fn template_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/workflows/templates",
            get(handlers::template::list_templates).post(handlers::template::create_template),
        )
        .route(
            "/workflows/templates/{template_id}",
            get(handlers::template::get_template),
        )
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
