//! Workflow repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_entity::file::File;
use casehub_entity::workflow::{CreateWorkflow, Workflow};

use crate::store::WorkflowStore;

/// Repository for workflows and their input file links.
#[derive(Debug, Clone)]
pub struct WorkflowRepository {
    pool: PgPool,
}

impl WorkflowRepository {
    /// Create a new workflow repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for WorkflowRepository {
    async fn find_workflow(&self, id: Uuid) -> AppResult<Option<Workflow>> {
        sqlx::query_as::<_, Workflow>("SELECT * FROM workflows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find workflow", e))
    }

    async fn create_workflow(&self, data: &CreateWorkflow) -> AppResult<Workflow> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let workflow = sqlx::query_as::<_, Workflow>(
            "INSERT INTO workflows (display_name, description, spec_json, user_id, folder_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&data.display_name)
        .bind(&data.description)
        .bind(&data.spec_json)
        .bind(data.user_id)
        .bind(data.folder_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create workflow", e))?;

        for (position, file_id) in data.file_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO workflow_files (workflow_id, file_id, position) VALUES ($1, $2, $3) \
                 ON CONFLICT (workflow_id, file_id) DO NOTHING",
            )
            .bind(workflow.id)
            .bind(file_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to attach workflow file", e)
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit workflow", e)
        })?;

        Ok(workflow)
    }

    async fn update_spec(&self, id: Uuid, spec_json: &serde_json::Value) -> AppResult<Workflow> {
        sqlx::query_as::<_, Workflow>(
            "UPDATE workflows SET spec_json = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(spec_json)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update workflow", e))?
        .ok_or_else(|| AppError::not_found(format!("Workflow {id} not found")))
    }

    async fn workflow_files(&self, workflow_id: Uuid) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT f.* FROM files f \
             INNER JOIN workflow_files wf ON wf.file_id = f.id \
             WHERE wf.workflow_id = $1 ORDER BY wf.position ASC",
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list workflow files", e)
        })
    }
}
