//! Workflow template handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use casehub_entity::workflow::WorkflowTemplate;

use crate::dto::request::CreateTemplateBody;
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/workflows/templates
pub async fn list_templates(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<WorkflowTemplate>>>, ApiError> {
    let templates = state.template_service.list().await?;
    Ok(Json(ApiResponse::ok(templates)))
}

/// GET /api/workflows/templates/{template_id}
pub async fn get_template(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(template_id): Path<Uuid>,
) -> Result<Json<ApiResponse<WorkflowTemplate>>, ApiError> {
    let template = state.template_service.get(template_id).await?;
    Ok(Json(ApiResponse::ok(template)))
}

/// POST /api/workflows/templates
pub async fn create_template(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateTemplateBody>,
) -> Result<(StatusCode, Json<ApiResponse<WorkflowTemplate>>), ApiError> {
    let template = state
        .template_service
        .create(&auth, body.into_request()?)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(template))))
}
