//! Workflow template entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A reusable task graph with every node identity stamped to a placeholder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowTemplate {
    /// Unique template identifier.
    pub id: Uuid,
    /// Template display name.
    pub display_name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// The scrubbed task graph.
    pub spec_json: serde_json::Value,
    /// The user who saved the template.
    pub user_id: Uuid,
    /// When the template was created.
    pub created_at: DateTime<Utc>,
}

/// Data required to save a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflowTemplate {
    /// Template display name.
    pub display_name: String,
    /// Free-text description.
    pub description: Option<String>,
    /// The scrubbed task graph.
    pub spec_json: serde_json::Value,
    /// The saving user.
    pub user_id: Uuid,
}
