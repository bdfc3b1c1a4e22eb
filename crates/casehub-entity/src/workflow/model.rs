//! Workflow entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An analysis pipeline bound to a working folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Workflow {
    /// Unique workflow identifier.
    pub id: Uuid,
    /// Workflow display name.
    pub display_name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// The serialized task graph, replaced on every run.
    pub spec_json: Option<serde_json::Value>,
    /// The owning user.
    pub user_id: Uuid,
    /// The working folder that receives task output.
    pub folder_id: Uuid,
    /// When the workflow was created.
    pub created_at: DateTime<Utc>,
    /// When the workflow was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a new workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflow {
    /// Workflow display name.
    pub display_name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Initial task graph, if seeded from a template or a copy.
    pub spec_json: Option<serde_json::Value>,
    /// The owning user.
    pub user_id: Uuid,
    /// The working folder.
    pub folder_id: Uuid,
    /// Input files, in order.
    pub file_ids: Vec<Uuid>,
}
