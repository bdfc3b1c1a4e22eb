//! Workflow handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use casehub_entity::workflow::Workflow;
use casehub_service::workflow::{CreateWorkflowRequest, RunOutcome, RunWorkflowRequest, WorkflowView};

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/folders/{folder_id}/workflows
pub async fn create_workflow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder_id): Path<Uuid>,
    Json(req): Json<CreateWorkflowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Workflow>>), ApiError> {
    let workflow = state.workflow_service.create(&auth, folder_id, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(workflow))))
}

/// GET /api/folders/{folder_id}/workflows/{workflow_id}
pub async fn get_workflow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((folder_id, workflow_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<WorkflowView>>, ApiError> {
    let view = state
        .workflow_service
        .get(&auth, folder_id, workflow_id)
        .await?;
    Ok(Json(ApiResponse::ok(view)))
}

/// POST /api/folders/{folder_id}/workflows/{workflow_id}/copy
pub async fn copy_workflow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((folder_id, workflow_id)): Path<(Uuid, Uuid)>,
) -> Result<(StatusCode, Json<ApiResponse<Workflow>>), ApiError> {
    let copy = state
        .workflow_service
        .copy(&auth, folder_id, workflow_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(copy))))
}

/// POST /api/folders/{folder_id}/workflows/{workflow_id}/run
pub async fn run_workflow(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((folder_id, workflow_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<RunWorkflowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RunOutcome>>), ApiError> {
    let outcome = state
        .workflow_service
        .run(&auth, folder_id, workflow_id, req)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::ok(outcome))))
}
