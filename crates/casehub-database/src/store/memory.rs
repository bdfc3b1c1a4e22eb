//! In-memory store backed by insertion-ordered tables.
//!
//! Mirrors the PostgreSQL schema's constraints that callers can observe:
//! unique usernames and group names, unique `(workflow_id, uuid)` task
//! identities, and foreign keys on files, memberships and grants.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use casehub_core::{AppError, AppResult};
use casehub_entity::file::{CreateFile, File};
use casehub_entity::folder::{CreateFolder, Folder};
use casehub_entity::job::{CreateJob, Job, JobStatus};
use casehub_entity::role::{CreateGroupRole, CreateUserRole, GroupRole, ResourceRef, UserRole};
use casehub_entity::user::{CreateGroup, CreateUser, Group, User};
use casehub_entity::workflow::{
    CreateTask, CreateWorkflow, CreateWorkflowTemplate, Task, TaskStatus, Workflow,
    WorkflowTemplate,
};

use super::{
    FileStore, FolderStore, GrantStore, JobStore, PrincipalStore, TaskStore, TemplateStore,
    WorkflowStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    /// `(group_id, user_id)` in insertion order.
    memberships: Vec<(Uuid, Uuid)>,
    folders: Vec<Folder>,
    files: Vec<File>,
    user_roles: Vec<UserRole>,
    group_roles: Vec<GroupRole>,
    workflows: Vec<Workflow>,
    /// `(workflow_id, file_id)` in attachment order.
    workflow_files: Vec<(Uuid, Uuid)>,
    tasks: Vec<Task>,
    templates: Vec<WorkflowTemplate>,
    jobs: Vec<Job>,
}

impl Tables {
    fn has_resource(&self, resource: &ResourceRef) -> bool {
        match *resource {
            ResourceRef::Folder(id) => self.folders.iter().any(|f| f.id == id),
            ResourceRef::File(id) => self.files.iter().any(|f| f.id == id),
        }
    }
}

/// Process-local store implementing every store trait.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the status of a task row, as the execution monitor would.
    pub async fn set_task_status(&self, task_id: Uuid, status: TaskStatus) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(())
    }

    /// Mark a file as soft-deleted.
    pub async fn soft_delete_file(&self, file_id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let file = tables
            .files
            .iter_mut()
            .find(|f| f.id == file_id)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        file.is_deleted = true;
        Ok(())
    }
}

fn matches_resource(folder_id: Option<Uuid>, file_id: Option<Uuid>, resource: &ResourceRef) -> bool {
    match *resource {
        ResourceRef::Folder(id) => folder_id == Some(id),
        ResourceRef::File(id) => file_id == Some(id),
    }
}

#[async_trait]
impl FolderStore for MemoryStore {
    async fn find_folder(&self, id: Uuid) -> AppResult<Option<Folder>> {
        let tables = self.tables.read().await;
        Ok(tables.folders.iter().find(|f| f.id == id).cloned())
    }

    async fn create_folder(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        if let Some(parent_id) = data.parent_id {
            if !tables.folders.iter().any(|f| f.id == parent_id) {
                return Err(AppError::not_found(format!("Folder {parent_id} not found")));
            }
        }
        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            display_name: data.display_name.clone(),
            parent_id: data.parent_id,
            user_id: data.user_id,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        tables.folders.push(folder.clone());
        Ok(folder)
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn find_file(&self, id: Uuid) -> AppResult<Option<File>> {
        let tables = self.tables.read().await;
        Ok(tables.files.iter().find(|f| f.id == id).cloned())
    }

    async fn create_file(&self, data: &CreateFile) -> AppResult<File> {
        let mut tables = self.tables.write().await;
        if !tables.folders.iter().any(|f| f.id == data.folder_id) {
            return Err(AppError::not_found(format!(
                "Folder {} not found",
                data.folder_id
            )));
        }
        let file = File {
            id: Uuid::new_v4(),
            display_name: data.display_name.clone(),
            folder_id: data.folder_id,
            user_id: data.user_id,
            extension: data.extension(),
            data_type: data.data_type.clone(),
            magic_mime: data.magic_mime.clone(),
            is_deleted: false,
            created_at: Utc::now(),
        };
        tables.files.push(file.clone());
        Ok(file)
    }
}

#[async_trait]
impl PrincipalStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, data: &CreateUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == data.username) {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: data.username.clone(),
            display_name: data.display_name.clone(),
            is_active: true,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_group(&self, id: Uuid) -> AppResult<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_group_by_name(&self, name: &str) -> AppResult<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables.groups.iter().find(|g| g.name == name).cloned())
    }

    async fn create_group(&self, data: &CreateGroup) -> AppResult<Group> {
        let mut tables = self.tables.write().await;
        if tables.groups.iter().any(|g| g.name == data.name) {
            return Err(AppError::conflict(format!(
                "Group '{}' already exists",
                data.name
            )));
        }
        let group = Group {
            id: Uuid::new_v4(),
            name: data.name.clone(),
            description: data.description.clone(),
            created_at: Utc::now(),
        };
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn add_group_member(&self, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.groups.iter().any(|g| g.id == group_id) {
            return Err(AppError::not_found(format!("Group {group_id} not found")));
        }
        if !tables.users.iter().any(|u| u.id == user_id) {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
        if !tables.memberships.contains(&(group_id, user_id)) {
            tables.memberships.push((group_id, user_id));
        }
        Ok(())
    }

    async fn groups_for_user(&self, user_id: Uuid) -> AppResult<Vec<Group>> {
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|(_, member)| *member == user_id)
            .filter_map(|(group_id, _)| tables.groups.iter().find(|g| g.id == *group_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GrantStore for MemoryStore {
    async fn user_roles_for(
        &self,
        user_id: Uuid,
        resource: ResourceRef,
    ) -> AppResult<Vec<UserRole>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_roles
            .iter()
            .filter(|r| r.user_id == user_id && matches_resource(r.folder_id, r.file_id, &resource))
            .cloned()
            .collect())
    }

    async fn group_roles_for(
        &self,
        group_id: Uuid,
        resource: ResourceRef,
    ) -> AppResult<Vec<GroupRole>> {
        let tables = self.tables.read().await;
        Ok(tables
            .group_roles
            .iter()
            .filter(|r| {
                r.group_id == group_id && matches_resource(r.folder_id, r.file_id, &resource)
            })
            .cloned()
            .collect())
    }

    async fn create_user_role(&self, data: &CreateUserRole) -> AppResult<UserRole> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == data.user_id) {
            return Err(AppError::not_found(format!("User {} not found", data.user_id)));
        }
        if !tables.has_resource(&data.resource) {
            return Err(AppError::not_found(format!("{} not found", data.resource)));
        }
        let (folder_id, file_id) = data.resource.columns();
        let grant = UserRole {
            id: Uuid::new_v4(),
            role: data.role,
            user_id: data.user_id,
            folder_id,
            file_id,
            created_at: Utc::now(),
        };
        tables.user_roles.push(grant.clone());
        Ok(grant)
    }

    async fn create_group_role(&self, data: &CreateGroupRole) -> AppResult<GroupRole> {
        let mut tables = self.tables.write().await;
        if !tables.groups.iter().any(|g| g.id == data.group_id) {
            return Err(AppError::not_found(format!(
                "Group {} not found",
                data.group_id
            )));
        }
        if !tables.has_resource(&data.resource) {
            return Err(AppError::not_found(format!("{} not found", data.resource)));
        }
        let (folder_id, file_id) = data.resource.columns();
        let grant = GroupRole {
            id: Uuid::new_v4(),
            role: data.role,
            group_id: data.group_id,
            folder_id,
            file_id,
            created_at: Utc::now(),
        };
        tables.group_roles.push(grant.clone());
        Ok(grant)
    }

    async fn find_user_role(&self, id: Uuid) -> AppResult<Option<UserRole>> {
        let tables = self.tables.read().await;
        Ok(tables.user_roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_group_role(&self, id: Uuid) -> AppResult<Option<GroupRole>> {
        let tables = self.tables.read().await;
        Ok(tables.group_roles.iter().find(|r| r.id == id).cloned())
    }

    async fn delete_user_role(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.user_roles.len();
        tables.user_roles.retain(|r| r.id != id);
        Ok(tables.user_roles.len() < before)
    }

    async fn delete_group_role(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.group_roles.len();
        tables.group_roles.retain(|r| r.id != id);
        Ok(tables.group_roles.len() < before)
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn find_workflow(&self, id: Uuid) -> AppResult<Option<Workflow>> {
        let tables = self.tables.read().await;
        Ok(tables.workflows.iter().find(|w| w.id == id).cloned())
    }

    async fn create_workflow(&self, data: &CreateWorkflow) -> AppResult<Workflow> {
        let mut tables = self.tables.write().await;
        if !tables.folders.iter().any(|f| f.id == data.folder_id) {
            return Err(AppError::not_found(format!(
                "Folder {} not found",
                data.folder_id
            )));
        }
        if let Some(missing) = data
            .file_ids
            .iter()
            .find(|id| !tables.files.iter().any(|f| f.id == **id))
        {
            return Err(AppError::not_found(format!("File {missing} not found")));
        }
        let now = Utc::now();
        let workflow = Workflow {
            id: Uuid::new_v4(),
            display_name: data.display_name.clone(),
            description: data.description.clone(),
            spec_json: data.spec_json.clone(),
            user_id: data.user_id,
            folder_id: data.folder_id,
            created_at: now,
            updated_at: now,
        };
        for file_id in &data.file_ids {
            if !tables.workflow_files.contains(&(workflow.id, *file_id)) {
                tables.workflow_files.push((workflow.id, *file_id));
            }
        }
        tables.workflows.push(workflow.clone());
        Ok(workflow)
    }

    async fn update_spec(&self, id: Uuid, spec_json: &serde_json::Value) -> AppResult<Workflow> {
        let mut tables = self.tables.write().await;
        let workflow = tables
            .workflows
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| AppError::not_found(format!("Workflow {id} not found")))?;
        workflow.spec_json = Some(spec_json.clone());
        workflow.updated_at = Utc::now();
        Ok(workflow.clone())
    }

    async fn workflow_files(&self, workflow_id: Uuid) -> AppResult<Vec<File>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workflow_files
            .iter()
            .filter(|(wf, _)| *wf == workflow_id)
            .filter_map(|(_, file_id)| tables.files.iter().find(|f| f.id == *file_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn find_task_by_uuid(&self, workflow_id: Uuid, uuid: &str) -> AppResult<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .find(|t| t.workflow_id == workflow_id && t.uuid == uuid)
            .cloned())
    }

    async fn create_task(&self, data: &CreateTask) -> AppResult<Task> {
        let mut tables = self.tables.write().await;
        if tables
            .tasks
            .iter()
            .any(|t| t.workflow_id == data.workflow_id && t.uuid == data.uuid)
        {
            return Err(AppError::conflict(format!(
                "Task '{}' already registered",
                data.uuid
            )));
        }
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            uuid: data.uuid.clone(),
            display_name: data.display_name.clone(),
            description: data.description.clone(),
            config: data.config.clone(),
            status: TaskStatus::Pending,
            status_detail: None,
            status_progress: None,
            result: None,
            runtime: None,
            error_exception: None,
            error_traceback: None,
            user_id: data.user_id,
            workflow_id: data.workflow_id,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.push(task.clone());
        Ok(task)
    }

    async fn reset_task(&self, task_id: Uuid, data: &CreateTask) -> AppResult<Task> {
        let mut tables = self.tables.write().await;
        let task = tables
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))?;
        task.display_name = data.display_name.clone();
        task.description = data.description.clone();
        task.config = data.config.clone();
        task.user_id = data.user_id;
        task.status = TaskStatus::Pending;
        task.status_detail = None;
        task.status_progress = None;
        task.result = None;
        task.runtime = None;
        task.error_exception = None;
        task.error_traceback = None;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    async fn tasks_for_workflow(&self, workflow_id: Uuid) -> AppResult<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .iter()
            .filter(|t| t.workflow_id == workflow_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn find_template(&self, id: Uuid) -> AppResult<Option<WorkflowTemplate>> {
        let tables = self.tables.read().await;
        Ok(tables.templates.iter().find(|t| t.id == id).cloned())
    }

    async fn list_templates(&self) -> AppResult<Vec<WorkflowTemplate>> {
        let tables = self.tables.read().await;
        Ok(tables.templates.iter().rev().cloned().collect())
    }

    async fn create_template(&self, data: &CreateWorkflowTemplate) -> AppResult<WorkflowTemplate> {
        let mut tables = self.tables.write().await;
        let template = WorkflowTemplate {
            id: Uuid::new_v4(),
            display_name: data.display_name.clone(),
            description: data.description.clone(),
            spec_json: data.spec_json.clone(),
            user_id: data.user_id,
            created_at: Utc::now(),
        };
        tables.templates.push(template.clone());
        Ok(template)
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create_job(&self, data: &CreateJob) -> AppResult<Job> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            job_type: data.job_type.clone(),
            queue: data.queue.clone(),
            priority: data.priority,
            payload: data.payload.clone(),
            status: JobStatus::Pending,
            workflow_id: data.workflow_id,
            created_by: data.created_by,
            created_at: now,
            updated_at: now,
        };
        tables.jobs.push(job.clone());
        Ok(job)
    }

    async fn jobs_for_workflow(&self, workflow_id: Uuid) -> AppResult<Vec<Job>> {
        let tables = self.tables.read().await;
        Ok(tables
            .jobs
            .iter()
            .filter(|j| j.workflow_id == Some(workflow_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casehub_entity::role::Role;

    async fn seed_user(store: &MemoryStore, name: &str) -> User {
        store
            .create_user(&CreateUser {
                username: name.to_string(),
                display_name: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_rows_are_none() {
        let store = MemoryStore::new();
        assert!(store.find_folder(Uuid::new_v4()).await.unwrap().is_none());
        assert!(store.find_file(Uuid::new_v4()).await.unwrap().is_none());
        assert!(
            store
                .find_task_by_uuid(Uuid::new_v4(), "x")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        seed_user(&store, "alice").await;
        let err = store
            .create_user(&CreateUser {
                username: "alice".to_string(),
                display_name: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_groups_for_user_keep_membership_order() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let mut ids = Vec::new();
        for name in ["zeta", "alpha", "mid"] {
            let group = store
                .create_group(&CreateGroup {
                    name: name.to_string(),
                    description: None,
                })
                .await
                .unwrap();
            store.add_group_member(group.id, alice.id).await.unwrap();
            ids.push(group.id);
        }
        store.add_group_member(ids[0], alice.id).await.unwrap();

        let groups = store.groups_for_user(alice.id).await.unwrap();
        let got: Vec<Uuid> = groups.iter().map(|g| g.id).collect();
        assert_eq!(got, ids);
    }

    #[tokio::test]
    async fn test_grants_filter_by_resource_kind() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let folder = store
            .create_folder(&CreateFolder {
                display_name: "case".to_string(),
                parent_id: None,
                user_id: alice.id,
            })
            .await
            .unwrap();
        store
            .create_user_role(&CreateUserRole {
                role: Role::Viewer,
                user_id: alice.id,
                resource: ResourceRef::Folder(folder.id),
            })
            .await
            .unwrap();

        let on_folder = store
            .user_roles_for(alice.id, ResourceRef::Folder(folder.id))
            .await
            .unwrap();
        let on_file = store
            .user_roles_for(alice.id, ResourceRef::File(folder.id))
            .await
            .unwrap();
        assert_eq!(on_folder.len(), 1);
        assert!(on_file.is_empty());
    }

    #[tokio::test]
    async fn test_task_identity_is_unique_per_workflow() {
        let store = MemoryStore::new();
        let create = |workflow_id| CreateTask {
            uuid: "u1".to_string(),
            display_name: None,
            description: None,
            config: serde_json::json!({}),
            user_id: Uuid::nil(),
            workflow_id,
        };
        let wf_a = Uuid::new_v4();
        let wf_b = Uuid::new_v4();
        store.create_task(&create(wf_a)).await.unwrap();
        store.create_task(&create(wf_b)).await.unwrap();
        assert!(store.create_task(&create(wf_a)).await.is_err());
        assert_eq!(store.tasks_for_workflow(wf_a).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_grant_reports_removal() {
        let store = MemoryStore::new();
        let alice = seed_user(&store, "alice").await;
        let folder = store
            .create_folder(&CreateFolder {
                display_name: "case".to_string(),
                parent_id: None,
                user_id: alice.id,
            })
            .await
            .unwrap();
        let grant = store
            .create_user_role(&CreateUserRole {
                role: Role::Owner,
                user_id: alice.id,
                resource: ResourceRef::Folder(folder.id),
            })
            .await
            .unwrap();
        assert!(store.delete_user_role(grant.id).await.unwrap());
        assert!(!store.delete_user_role(grant.id).await.unwrap());
    }
}
