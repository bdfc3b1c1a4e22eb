//! Task repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_entity::workflow::{CreateTask, Task};

use crate::store::TaskStore;

/// Repository for persisted task rows.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn find_task_by_uuid(&self, workflow_id: Uuid, uuid: &str) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE workflow_id = $1 AND uuid = $2")
            .bind(workflow_id)
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find task", e))
    }

    async fn create_task(&self, data: &CreateTask) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (uuid, display_name, description, config, user_id, workflow_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&data.uuid)
        .bind(&data.display_name)
        .bind(&data.description)
        .bind(&data.config)
        .bind(data.user_id)
        .bind(data.workflow_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("tasks_workflow_uuid_key") =>
            {
                AppError::conflict(format!("Task '{}' already registered", data.uuid))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create task", e),
        })
    }

    async fn reset_task(&self, task_id: Uuid, data: &CreateTask) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET display_name = $2, description = $3, config = $4, user_id = $5, \
             status = 'PENDING', status_detail = NULL, status_progress = NULL, result = NULL, \
             runtime = NULL, error_exception = NULL, error_traceback = NULL, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(task_id)
        .bind(&data.display_name)
        .bind(&data.description)
        .bind(&data.config)
        .bind(data.user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to reset task", e))?
        .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))
    }

    async fn tasks_for_workflow(&self, workflow_id: Uuid) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE workflow_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(workflow_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tasks", e))
    }
}
