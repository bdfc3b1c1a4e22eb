//! Workflow template repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_entity::workflow::{CreateWorkflowTemplate, WorkflowTemplate};

use crate::store::TemplateStore;

/// Repository for saved workflow templates.
#[derive(Debug, Clone)]
pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    /// Create a new template repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for TemplateRepository {
    async fn find_template(&self, id: Uuid) -> AppResult<Option<WorkflowTemplate>> {
        sqlx::query_as::<_, WorkflowTemplate>("SELECT * FROM workflow_templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find template", e))
    }

    async fn list_templates(&self) -> AppResult<Vec<WorkflowTemplate>> {
        sqlx::query_as::<_, WorkflowTemplate>(
            "SELECT * FROM workflow_templates ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list templates", e))
    }

    async fn create_template(&self, data: &CreateWorkflowTemplate) -> AppResult<WorkflowTemplate> {
        sqlx::query_as::<_, WorkflowTemplate>(
            "INSERT INTO workflow_templates (display_name, description, spec_json, user_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.display_name)
        .bind(&data.description)
        .bind(&data.spec_json)
        .bind(data.user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create template", e))
    }
}
