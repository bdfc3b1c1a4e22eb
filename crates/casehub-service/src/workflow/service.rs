//! Workflow lifecycle: create, inspect, copy and run.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use casehub_auth::{AccessGuard, AccessTarget};
use casehub_core::config::workflow::WorkflowConfig;
use casehub_core::traits::IdGenerator;
use casehub_core::{AppError, AppResult};
use casehub_database::store::Stores;
use casehub_entity::file::File;
use casehub_entity::folder::Folder;
use casehub_entity::role::Role;
use casehub_entity::workflow::{CreateWorkflow, Task, Workflow, WorkflowStatus};
use casehub_worker::{SubmitContext, Submission, TaskRuntime};
use casehub_workflow::identifiers::rewrite_identifiers;
use casehub_workflow::params::apply_parameters;
use casehub_workflow::{CompileContext, InputFile, SignatureCompiler, WorkflowSpec};

use crate::context::RequestContext;
use crate::folder::FolderService;

/// Request to create a workflow in a folder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateWorkflowRequest {
    /// Name for the workflow and its results folder.
    pub display_name: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
    /// Input files.
    pub file_ids: Vec<Uuid>,
    /// Template to instantiate.
    pub template_id: Option<Uuid>,
    /// Values for the template's named parameters.
    pub template_params: Option<Map<String, Value>>,
}

/// Request to run a workflow with a task graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunWorkflowRequest {
    /// The spec document, `{"workflow": <node>, ...}`.
    pub workflow_spec: Value,
}

/// A workflow with its tasks, inputs and derived status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowView {
    /// The workflow row.
    #[serde(flatten)]
    pub workflow: Workflow,
    /// Registered tasks, in registration order.
    pub tasks: Vec<Task>,
    /// Input files.
    pub files: Vec<File>,
    /// Aggregate of the task statuses.
    pub status: WorkflowStatus,
}

/// Result of submitting a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    /// The workflow that was run.
    pub workflow_id: Uuid,
    /// Runtime acknowledgement.
    pub submission: Submission,
    /// Number of executable units submitted.
    pub units: usize,
}

/// Orchestrates workflow use cases.
#[derive(Debug, Clone)]
pub struct WorkflowService {
    stores: Stores,
    guard: Arc<AccessGuard>,
    folders: Arc<FolderService>,
    compiler: SignatureCompiler,
    runtime: Arc<dyn TaskRuntime>,
    ids: Arc<dyn IdGenerator>,
    config: WorkflowConfig,
}

impl WorkflowService {
    /// Creates a new workflow service.
    pub fn new(
        stores: Stores,
        guard: Arc<AccessGuard>,
        folders: Arc<FolderService>,
        runtime: Arc<dyn TaskRuntime>,
        ids: Arc<dyn IdGenerator>,
        config: WorkflowConfig,
    ) -> Self {
        let compiler = SignatureCompiler::new(stores.tasks.clone(), ids.clone());
        Self {
            stores,
            guard,
            folders,
            compiler,
            runtime,
            ids,
            config,
        }
    }

    /// Create a workflow and its results folder under `folder_id`.
    ///
    /// A template spec is instantiated with fresh identifiers, then any
    /// `template_params` are applied.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        req: CreateWorkflowRequest,
    ) -> AppResult<Workflow> {
        self.guard
            .authorize(ctx.user_id, &Role::WRITERS, AccessTarget::folder(folder_id))
            .await?;

        for file_id in &req.file_ids {
            self.live_file(*file_id).await?;
        }

        let mut display_name = req.display_name.filter(|n| !n.trim().is_empty());
        let mut description = req.description;
        let mut spec_json = None;

        if let Some(template_id) = req.template_id {
            let template = self
                .stores
                .templates
                .find_template(template_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Template {template_id} not found")))?;

            let mut spec = rewrite_identifiers(&template.spec_json, None, self.ids.as_ref());
            if let Some(params) = &req.template_params {
                spec = apply_parameters(&spec, params);
            }
            display_name = display_name.or(Some(template.display_name));
            description = description.or(template.description);
            spec_json = Some(spec);
        }

        let display_name =
            display_name.unwrap_or_else(|| self.config.default_display_name.clone());
        let results = self
            .folders
            .create_subfolder(folder_id, &display_name, ctx.user_id)
            .await?;

        let workflow = self
            .stores
            .workflows
            .create_workflow(&CreateWorkflow {
                display_name,
                description,
                spec_json,
                user_id: ctx.user_id,
                folder_id: results.id,
                file_ids: req.file_ids,
            })
            .await?;

        info!(
            workflow_id = %workflow.id,
            folder_id = %workflow.folder_id,
            user_id = %ctx.user_id,
            template_id = ?req.template_id,
            "Workflow created"
        );
        Ok(workflow)
    }

    /// Get a workflow with its tasks, input files and derived status.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        workflow_id: Uuid,
    ) -> AppResult<WorkflowView> {
        self.guard
            .authorize(ctx.user_id, &Role::READERS, AccessTarget::folder(folder_id))
            .await?;
        let workflow = self.load_scoped(folder_id, workflow_id).await?;

        let tasks = self.stores.tasks.tasks_for_workflow(workflow.id).await?;
        let files = self.stores.workflows.workflow_files(workflow.id).await?;
        let status = WorkflowStatus::from_tasks(&tasks);

        Ok(WorkflowView {
            workflow,
            tasks,
            files,
            status,
        })
    }

    /// Duplicate a workflow into a sibling results folder.
    ///
    /// The copy gets fresh identifiers and keeps only non-deleted inputs.
    pub async fn copy(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        workflow_id: Uuid,
    ) -> AppResult<Workflow> {
        self.guard
            .authorize(ctx.user_id, &Role::WRITERS, AccessTarget::folder(folder_id))
            .await?;
        let original = self.load_scoped(folder_id, workflow_id).await?;

        let source_folder = self.folder(original.folder_id).await?;
        let parent_id = source_folder.parent_id.unwrap_or(source_folder.id);
        if parent_id != folder_id {
            self.guard
                .authorize(ctx.user_id, &Role::WRITERS, AccessTarget::folder(parent_id))
                .await?;
        }

        let file_ids = self
            .stores
            .workflows
            .workflow_files(original.id)
            .await?
            .into_iter()
            .filter(|f| !f.is_deleted)
            .map(|f| f.id)
            .collect();
        let spec_json = original
            .spec_json
            .as_ref()
            .map(|spec| rewrite_identifiers(spec, None, self.ids.as_ref()));

        let display_name = format!("Copy of {}", original.display_name);
        let results = self
            .folders
            .create_subfolder(parent_id, &display_name, ctx.user_id)
            .await?;

        let copy = self
            .stores
            .workflows
            .create_workflow(&CreateWorkflow {
                display_name,
                description: original.description.clone(),
                spec_json,
                user_id: ctx.user_id,
                folder_id: results.id,
                file_ids,
            })
            .await?;

        info!(
            workflow_id = %copy.id,
            source_workflow_id = %original.id,
            user_id = %ctx.user_id,
            "Workflow copied"
        );
        Ok(copy)
    }

    /// Store `req.workflow_spec`, compile it and submit the graph.
    pub async fn run(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        workflow_id: Uuid,
        req: RunWorkflowRequest,
    ) -> AppResult<RunOutcome> {
        self.guard
            .authorize(ctx.user_id, &Role::WRITERS, AccessTarget::folder(folder_id))
            .await?;
        let workflow = self.load_scoped(folder_id, workflow_id).await?;

        let spec = WorkflowSpec::from_value(&req.workflow_spec)?;
        let workflow = self
            .stores
            .workflows
            .update_spec(workflow.id, &req.workflow_spec)
            .await?;

        let input_files = self
            .stores
            .workflows
            .workflow_files(workflow.id)
            .await?
            .iter()
            .filter(|f| !f.is_deleted)
            .map(|f| InputFile::from_file(f, &self.folders.path_of(f.folder_id)))
            .collect();
        let output_path = self.folders.ensure_dir(workflow.folder_id).await?;

        let compile_ctx = CompileContext {
            user_id: ctx.user_id,
            workflow_id: workflow.id,
            input_files,
            output_path: output_path.to_string_lossy().into_owned(),
        };
        let canvas = self.compiler.compile_spec(&spec, &compile_ctx).await?;
        let submission = self
            .runtime
            .submit(
                &canvas,
                SubmitContext {
                    workflow_id: workflow.id,
                    user_id: ctx.user_id,
                },
            )
            .await?;

        let units = canvas.signatures().len();
        info!(
            workflow_id = %workflow.id,
            user_id = %ctx.user_id,
            runtime = self.runtime.name(),
            submission_id = %submission.id,
            units,
            "Workflow submitted"
        );
        Ok(RunOutcome {
            workflow_id: workflow.id,
            submission,
            units,
        })
    }

    /// Load a workflow that lives in `folder_id` or one of its direct children.
    async fn load_scoped(&self, folder_id: Uuid, workflow_id: Uuid) -> AppResult<Workflow> {
        let not_found = || AppError::not_found(format!("Workflow {workflow_id} not found"));
        let workflow = self
            .stores
            .workflows
            .find_workflow(workflow_id)
            .await?
            .ok_or_else(not_found)?;

        if workflow.folder_id == folder_id {
            return Ok(workflow);
        }
        match self.stores.folders.find_folder(workflow.folder_id).await? {
            Some(folder) if folder.parent_id == Some(folder_id) => Ok(workflow),
            _ => Err(not_found()),
        }
    }

    async fn folder(&self, folder_id: Uuid) -> AppResult<Folder> {
        self.stores
            .folders
            .find_folder(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    async fn live_file(&self, file_id: Uuid) -> AppResult<File> {
        self.stores
            .files
            .find_file(file_id)
            .await?
            .filter(|f| !f.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }
}
