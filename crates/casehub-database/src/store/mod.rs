//! Store traits consumed by the auth, workflow, worker and service crates.
//!
//! Every lookup returns `Ok(None)` for a missing row so callers can tell
//! "not found" apart from an empty result set. Two backends exist:
//! [`postgres`] (the repositories in [`crate::repositories`]) and
//! [`memory`]. [`Stores`] bundles one backend behind trait objects.

pub mod memory;
pub mod postgres;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use casehub_core::config::database::DatabaseConfig;
use casehub_core::{AppError, AppResult};
use casehub_entity::file::{CreateFile, File};
use casehub_entity::folder::{CreateFolder, Folder};
use casehub_entity::job::{CreateJob, Job};
use casehub_entity::role::{CreateGroupRole, CreateUserRole, GroupRole, ResourceRef, UserRole};
use casehub_entity::user::{CreateGroup, CreateUser, Group, User};
use casehub_entity::workflow::{
    CreateTask, CreateWorkflow, CreateWorkflowTemplate, Task, Workflow, WorkflowTemplate,
};

use crate::connection::DatabasePool;

pub use memory::MemoryStore;

/// Folder persistence.
#[async_trait]
pub trait FolderStore: Send + Sync + fmt::Debug + 'static {
    /// Find a folder by ID, including soft-deleted ones.
    async fn find_folder(&self, id: Uuid) -> AppResult<Option<Folder>>;

    /// Create a folder.
    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder>;
}

/// File persistence.
#[async_trait]
pub trait FileStore: Send + Sync + fmt::Debug + 'static {
    /// Find a file by ID, including soft-deleted ones.
    async fn find_file(&self, id: Uuid) -> AppResult<Option<File>>;

    /// Create a file record.
    async fn create_file(&self, data: &CreateFile) -> AppResult<File>;
}

/// Users, groups and group membership.
#[async_trait]
pub trait PrincipalStore: Send + Sync + fmt::Debug + 'static {
    /// Find a user by ID.
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by login name.
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Create a user.
    async fn create_user(&self, data: &CreateUser) -> AppResult<User>;

    /// Find a group by ID.
    async fn find_group(&self, id: Uuid) -> AppResult<Option<Group>>;

    /// Find a group by name.
    async fn find_group_by_name(&self, name: &str) -> AppResult<Option<Group>>;

    /// Create a group.
    async fn create_group(&self, data: &CreateGroup) -> AppResult<Group>;

    /// Add a user to a group. Adding an existing member is a no-op.
    async fn add_group_member(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()>;

    /// Groups the user belongs to, in membership order.
    async fn groups_for_user(&self, user_id: Uuid) -> AppResult<Vec<Group>>;
}

/// User and group grants.
#[async_trait]
pub trait GrantStore: Send + Sync + fmt::Debug + 'static {
    /// Grants held directly by `user_id` on `resource`, oldest first.
    async fn user_roles_for(&self, user_id: Uuid, resource: ResourceRef)
    -> AppResult<Vec<UserRole>>;

    /// Grants held by `group_id` on `resource`, oldest first.
    async fn group_roles_for(
        &self,
        group_id: Uuid,
        resource: ResourceRef,
    ) -> AppResult<Vec<GroupRole>>;

    /// Insert a user grant. Callers check for duplicates first.
    async fn create_user_role(&self, data: &CreateUserRole) -> AppResult<UserRole>;

    /// Insert a group grant. Callers check for duplicates first.
    async fn create_group_role(&self, data: &CreateGroupRole) -> AppResult<GroupRole>;

    /// Find a user grant by ID.
    async fn find_user_role(&self, id: Uuid) -> AppResult<Option<UserRole>>;

    /// Find a group grant by ID.
    async fn find_group_role(&self, id: Uuid) -> AppResult<Option<GroupRole>>;

    /// Delete a user grant. Returns `true` if a row was removed.
    async fn delete_user_role(&self, id: Uuid) -> AppResult<bool>;

    /// Delete a group grant. Returns `true` if a row was removed.
    async fn delete_group_role(&self, id: Uuid) -> AppResult<bool>;
}

/// Workflows and their input files.
#[async_trait]
pub trait WorkflowStore: Send + Sync + fmt::Debug + 'static {
    /// Find a workflow by ID.
    async fn find_workflow(&self, id: Uuid) -> AppResult<Option<Workflow>>;

    /// Create a workflow and attach its input files.
    async fn create_workflow(&self, data: &CreateWorkflow) -> AppResult<Workflow>;

    /// Replace the stored task graph.
    async fn update_spec(&self, id: Uuid, spec_json: &serde_json::Value) -> AppResult<Workflow>;

    /// Input files of a workflow, in attachment order.
    async fn workflow_files(&self, workflow_id: Uuid) -> AppResult<Vec<File>>;
}

/// Persisted task rows.
#[async_trait]
pub trait TaskStore: Send + Sync + fmt::Debug + 'static {
    /// Find the task registered for a node identity within a workflow.
    async fn find_task_by_uuid(&self, workflow_id: Uuid, uuid: &str) -> AppResult<Option<Task>>;

    /// Register a task row in `PENDING` state.
    async fn create_task(&self, data: &CreateTask) -> AppResult<Task>;

    /// Put an existing row back to `PENDING` for a new run: overwrite its
    /// name, description, config and runner, and clear the previous outcome.
    async fn reset_task(&self, task_id: Uuid, data: &CreateTask) -> AppResult<Task>;

    /// Tasks of a workflow, in registration order.
    async fn tasks_for_workflow(&self, workflow_id: Uuid) -> AppResult<Vec<Task>>;
}

/// Saved workflow templates.
#[async_trait]
pub trait TemplateStore: Send + Sync + fmt::Debug + 'static {
    /// Find a template by ID.
    async fn find_template(&self, id: Uuid) -> AppResult<Option<WorkflowTemplate>>;

    /// List all templates, newest first.
    async fn list_templates(&self) -> AppResult<Vec<WorkflowTemplate>>;

    /// Save a template.
    async fn create_template(&self, data: &CreateWorkflowTemplate) -> AppResult<WorkflowTemplate>;
}

/// Queued task-graph submissions.
#[async_trait]
pub trait JobStore: Send + Sync + fmt::Debug + 'static {
    /// Enqueue a job in `pending` state.
    async fn create_job(&self, data: &CreateJob) -> AppResult<Job>;

    /// Jobs submitted for a workflow, oldest first.
    async fn jobs_for_workflow(&self, workflow_id: Uuid) -> AppResult<Vec<Job>>;
}

/// One persistence backend, exposed through every store trait.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Folder persistence.
    pub folders: Arc<dyn FolderStore>,
    /// File persistence.
    pub files: Arc<dyn FileStore>,
    /// Users and groups.
    pub principals: Arc<dyn PrincipalStore>,
    /// Grants.
    pub grants: Arc<dyn GrantStore>,
    /// Workflows.
    pub workflows: Arc<dyn WorkflowStore>,
    /// Task rows.
    pub tasks: Arc<dyn TaskStore>,
    /// Templates.
    pub templates: Arc<dyn TemplateStore>,
    /// Job queue.
    pub jobs: Arc<dyn JobStore>,
}

impl Stores {
    /// Back every store with one shared in-memory store.
    pub fn memory() -> Self {
        Self::from_memory(Arc::new(MemoryStore::new()))
    }

    /// Back every store with the given in-memory store.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            folders: store.clone(),
            files: store.clone(),
            principals: store.clone(),
            grants: store.clone(),
            workflows: store.clone(),
            tasks: store.clone(),
            templates: store.clone(),
            jobs: store,
        }
    }

    /// Back every store with PostgreSQL repositories sharing one pool.
    pub fn postgres(pool: &DatabasePool) -> Self {
        postgres::stores(pool.pool().clone())
    }

    /// Build the backend named by `config.provider`.
    ///
    /// The PostgreSQL backend connects and, when enabled, runs migrations.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        info!(provider = %config.provider, "Initializing persistence backend");
        match config.provider.as_str() {
            "memory" => Ok(Self::memory()),
            "postgres" => {
                let pool = DatabasePool::open(config).await?;
                Ok(Self::postgres(&pool))
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'. Expected one of: postgres, memory"
            ))),
        }
    }
}
