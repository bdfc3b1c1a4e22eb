//! File handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use casehub_entity::file::File;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/files/{file_id}
pub async fn get_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(file_id): Path<Uuid>,
) -> Result<Json<ApiResponse<File>>, ApiError> {
    let file = state.file_service.get(&auth, file_id).await?;
    Ok(Json(ApiResponse::ok(file)))
}
