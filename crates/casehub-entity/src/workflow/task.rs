//! Persisted task entity and its execution status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Execution state reported by the task runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    /// Registered by the compiler, not yet picked up.
    Pending,
    /// Accepted by a worker.
    Received,
    /// Execution started.
    Started,
    /// Execution reported intermediate progress.
    Progress,
    /// Scheduled for another attempt.
    Retry,
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Failure,
    /// Cancelled by the runtime.
    Revoked,
}

impl TaskStatus {
    /// Check if the task is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Revoked)
    }

    /// Check if a worker is currently handling the task.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Received | Self::Started | Self::Progress | Self::Retry
        )
    }

    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Received => "RECEIVED",
            Self::Started => "STARTED",
            Self::Progress => "PROGRESS",
            Self::Retry => "RETRY",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One planned or executed unit of a compiled workflow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Row identifier.
    pub id: Uuid,
    /// Identity of the spec node that produced this row.
    pub uuid: String,
    /// Display name copied from the spec node.
    pub display_name: Option<String>,
    /// Description copied from the spec node.
    pub description: Option<String>,
    /// Flattened `name -> value` configuration.
    pub config: serde_json::Value,
    /// Current execution status.
    pub status: TaskStatus,
    /// Runtime-provided status detail.
    pub status_detail: Option<String>,
    /// Runtime-provided progress payload.
    pub status_progress: Option<serde_json::Value>,
    /// Result payload on completion.
    pub result: Option<serde_json::Value>,
    /// Execution time in seconds.
    pub runtime: Option<f64>,
    /// Exception text on failure.
    pub error_exception: Option<String>,
    /// Traceback on failure.
    pub error_traceback: Option<String>,
    /// The user who ran the workflow.
    pub user_id: Uuid,
    /// The owning workflow.
    pub workflow_id: Uuid,
    /// When the task row was created.
    pub created_at: DateTime<Utc>,
    /// When the task row was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to register a task row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Node identity.
    pub uuid: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Flattened configuration.
    pub config: serde_json::Value,
    /// The user who ran the workflow.
    pub user_id: Uuid,
    /// The owning workflow.
    pub workflow_id: Uuid,
}
