//! Saved workflow templates.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use casehub_auth::{AccessGuard, AccessTarget};
use casehub_core::config::workflow::WorkflowConfig;
use casehub_core::traits::IdGenerator;
use casehub_core::{AppError, AppResult};
use casehub_database::store::{TemplateStore, WorkflowStore};
use casehub_entity::role::Role;
use casehub_entity::workflow::{CreateWorkflowTemplate, WorkflowTemplate};
use casehub_workflow::identifiers::rewrite_identifiers;
use casehub_workflow::params::assign_param_names;

use crate::context::RequestContext;

/// Request to save a workflow's spec as a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    /// Template name.
    pub display_name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow whose spec is saved.
    pub workflow_id: Uuid,
}

/// Lists, reads and saves templates.
#[derive(Debug, Clone)]
pub struct TemplateService {
    templates: Arc<dyn TemplateStore>,
    workflows: Arc<dyn WorkflowStore>,
    guard: Arc<AccessGuard>,
    ids: Arc<dyn IdGenerator>,
    placeholder: String,
}

impl TemplateService {
    /// Creates a new template service.
    pub fn new(
        templates: Arc<dyn TemplateStore>,
        workflows: Arc<dyn WorkflowStore>,
        guard: Arc<AccessGuard>,
        ids: Arc<dyn IdGenerator>,
        config: &WorkflowConfig,
    ) -> Self {
        Self {
            templates,
            workflows,
            guard,
            ids,
            placeholder: config.template_placeholder.clone(),
        }
    }

    /// All templates, newest first.
    pub async fn list(&self) -> AppResult<Vec<WorkflowTemplate>> {
        self.templates.list_templates().await
    }

    /// Get one template.
    pub async fn get(&self, template_id: Uuid) -> AppResult<WorkflowTemplate> {
        self.templates
            .find_template(template_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Template {template_id} not found")))
    }

    /// Save the spec of a readable workflow as a template.
    ///
    /// Config entries get parameter names and every `uuid` is replaced by
    /// the placeholder, so instantiation can stamp fresh ones.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateTemplateRequest,
    ) -> AppResult<WorkflowTemplate> {
        let display_name = req.display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::validation("Template name cannot be empty"));
        }

        let workflow = self
            .workflows
            .find_workflow(req.workflow_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Workflow {} not found", req.workflow_id)))?;
        self.guard
            .authorize(
                ctx.user_id,
                &Role::READERS,
                AccessTarget::folder(workflow.folder_id),
            )
            .await?;

        let spec = workflow
            .spec_json
            .as_ref()
            .ok_or_else(|| AppError::validation("Workflow has no task graph to save"))?;
        let named = assign_param_names(spec, &mut HashMap::new());
        let stamped = rewrite_identifiers(&named, Some(&self.placeholder), self.ids.as_ref());

        let template = self
            .templates
            .create_template(&CreateWorkflowTemplate {
                display_name: display_name.to_string(),
                description: req.description,
                spec_json: stamped,
                user_id: ctx.user_id,
            })
            .await?;

        info!(
            template_id = %template.id,
            workflow_id = %workflow.id,
            user_id = %ctx.user_id,
            "Workflow template saved"
        );
        Ok(template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casehub_core::error::ErrorKind;
    use casehub_workflow::identifiers::collect_identifiers;
    use serde_json::json;

    use crate::testing::Harness;
    use crate::workflow::{CreateWorkflowRequest, RunWorkflowRequest};

    async fn workflow_with_spec(h: &Harness) -> Uuid {
        let service = h.workflow_service();
        let workflow = service
            .create(&h.ctx(&h.owner), h.case.id, CreateWorkflowRequest::default())
            .await
            .unwrap();
        service
            .run(
                &h.ctx(&h.owner),
                h.case.id,
                workflow.id,
                RunWorkflowRequest {
                    workflow_spec: json!({
                        "workflow": {
                            "type": "group",
                            "tasks": [
                                {
                                    "type": "task",
                                    "task_name": "strings",
                                    "uuid": "a",
                                    "task_config": [{"name": "encoding", "value": "utf-16le"}]
                                },
                                {
                                    "type": "task",
                                    "task_name": "strings",
                                    "uuid": "b",
                                    "task_config": [{"name": "encoding", "value": "ascii"}]
                                }
                            ]
                        }
                    }),
                },
            )
            .await
            .unwrap();
        workflow.id
    }

    #[tokio::test]
    async fn test_create_names_params_and_stamps_placeholder() {
        let h = Harness::new().await;
        let workflow_id = workflow_with_spec(&h).await;
        let service = h.template_service();

        let template = service
            .create(
                &h.ctx(&h.owner),
                CreateTemplateRequest {
                    display_name: "Strings".to_string(),
                    description: None,
                    workflow_id,
                },
            )
            .await
            .unwrap();

        let ids = collect_identifiers(&template.spec_json);
        assert_eq!(ids.len(), 2);
        assert!(ids.iter().all(|v| v.as_str() == Some("PLACEHOLDER")));

        let tasks = template.spec_json["workflow"]["tasks"].as_array().unwrap();
        assert_eq!(tasks[0]["task_config"][0]["param_name"], "encoding_0");
        assert_eq!(tasks[1]["task_config"][0]["param_name"], "encoding_1");

        assert_eq!(service.get(template.id).await.unwrap().display_name, "Strings");
        assert_eq!(service.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_requires_read_access_and_a_spec() {
        let h = Harness::new().await;
        let workflow_id = workflow_with_spec(&h).await;
        let service = h.template_service();
        let outsider = h.user("outsider").await;

        let err = service
            .create(
                &h.ctx(&outsider),
                CreateTemplateRequest {
                    display_name: "Stolen".to_string(),
                    description: None,
                    workflow_id,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let empty = h
            .workflow_service()
            .create(&h.ctx(&h.owner), h.case.id, CreateWorkflowRequest::default())
            .await
            .unwrap();
        let err = service
            .create(
                &h.ctx(&h.owner),
                CreateTemplateRequest {
                    display_name: "Empty".to_string(),
                    description: None,
                    workflow_id: empty.id,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_get_unknown_template() {
        let h = Harness::new().await;
        let err = h.template_service().get(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
