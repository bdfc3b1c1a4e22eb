//! Folder role handlers: share, inspect, revoke.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use casehub_entity::role::Grant;
use casehub_service::permission::{ShareFolderRequest, ShareResult};

use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/folders/{folder_id}/roles
pub async fn share_folder(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder_id): Path<Uuid>,
    Json(req): Json<ShareFolderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ShareResult>>), ApiError> {
    let result = state
        .permission_service
        .share_folder(&auth, folder_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(result))))
}

/// GET /api/folders/{folder_id}/roles/me
pub async fn my_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(folder_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Grant>>, ApiError> {
    let grant = state.permission_service.my_role(&auth, folder_id).await?;
    Ok(Json(ApiResponse::ok(grant)))
}

/// DELETE /api/folders/{folder_id}/roles/users/{role_id}
pub async fn delete_user_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((folder_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .permission_service
        .delete_user_role(&auth, folder_id, role_id)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("User role removed"))))
}

/// DELETE /api/folders/{folder_id}/roles/groups/{role_id}
pub async fn delete_group_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((folder_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state
        .permission_service
        .delete_group_role(&auth, folder_id, role_id)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Group role removed"))))
}
