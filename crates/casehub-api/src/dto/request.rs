//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use casehub_core::{AppError, AppResult};
use casehub_service::workflow::CreateTemplateRequest;

/// Save-as-template request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTemplateBody {
    /// Template name.
    #[validate(length(min = 1, max = 255, message = "Template name must be 1-255 characters"))]
    pub display_name: String,
    /// Description.
    #[serde(default)]
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    /// Workflow whose task graph is saved.
    pub workflow_id: Uuid,
}

impl CreateTemplateBody {
    /// Validate and convert into the service request.
    pub fn into_request(self) -> AppResult<CreateTemplateRequest> {
        self.validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        Ok(CreateTemplateRequest {
            display_name: self.display_name,
            description: self.description,
            workflow_id: self.workflow_id,
        })
    }
}
