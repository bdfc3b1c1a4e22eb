//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::JobStatus;

/// A compiled task graph handed to external workers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    /// Unique job identifier.
    pub id: Uuid,
    /// Job type identifier (e.g., `"workflow.run"`).
    pub job_type: String,
    /// Queue of the graph's entry unit.
    pub queue: String,
    /// Numeric priority; higher runs first.
    pub priority: i32,
    /// The serialized task graph.
    pub payload: serde_json::Value,
    /// Current job status.
    pub status: JobStatus,
    /// Workflow the graph belongs to.
    pub workflow_id: Option<Uuid>,
    /// User who submitted the graph.
    pub created_by: Option<Uuid>,
    /// When the job was created.
    pub created_at: DateTime<Utc>,
    /// When the job was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateJob {
    /// Job type identifier.
    pub job_type: String,
    /// Queue name.
    pub queue: String,
    /// Priority.
    pub priority: i32,
    /// Job-specific payload.
    pub payload: serde_json::Value,
    /// Owning workflow.
    pub workflow_id: Option<Uuid>,
    /// Submitting user.
    pub created_by: Option<Uuid>,
}
