//! Shared fixtures for service tests.

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use uuid::Uuid;

use casehub_auth::{AccessGuard, AccessResolver};
use casehub_core::config::workflow::WorkflowConfig;
use casehub_core::traits::SequentialIdGenerator;
use casehub_database::store::{MemoryStore, Stores};
use casehub_entity::file::{CreateFile, File};
use casehub_entity::folder::{CreateFolder, Folder};
use casehub_entity::role::{CreateUserRole, ResourceRef, Role, UserRole};
use casehub_entity::user::{CreateUser, User};
use casehub_worker::MemoryRuntime;

use crate::context::RequestContext;
use crate::folder::FolderService;
use crate::permission::PermissionService;
use crate::workflow::{TemplateService, WorkflowService};

/// An owner with a root case folder holding one evidence file.
pub(crate) struct Harness {
    pub store: Arc<MemoryStore>,
    pub stores: Stores,
    pub guard: Arc<AccessGuard>,
    pub folder_service: Arc<FolderService>,
    pub runtime: Arc<MemoryRuntime>,
    pub config: WorkflowConfig,
    pub owner: User,
    pub case: Folder,
    pub evidence: File,
    ids: Arc<SequentialIdGenerator>,
    root: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        let root = TempDir::new().unwrap();
        let store = Arc::new(MemoryStore::new());
        let stores = Stores::from_memory(store.clone());
        let resolver = Arc::new(AccessResolver::new(
            stores.folders.clone(),
            stores.principals.clone(),
            stores.grants.clone(),
        ));
        let guard = Arc::new(AccessGuard::new(
            resolver,
            stores.folders.clone(),
            stores.files.clone(),
        ));
        let config = WorkflowConfig {
            data_root: root.path().to_string_lossy().into_owned(),
            ..WorkflowConfig::default()
        };
        let folder_service = Arc::new(FolderService::new(
            stores.folders.clone(),
            stores.grants.clone(),
            root.path(),
        ));

        let owner = stores
            .principals
            .create_user(&CreateUser {
                username: "owner".to_string(),
                display_name: Some("Case Owner".to_string()),
            })
            .await
            .unwrap();
        let case = stores
            .folders
            .create_folder(&CreateFolder {
                display_name: "case-42".to_string(),
                parent_id: None,
                user_id: owner.id,
            })
            .await
            .unwrap();
        stores
            .grants
            .create_user_role(&CreateUserRole {
                role: Role::Owner,
                user_id: owner.id,
                resource: ResourceRef::Folder(case.id),
            })
            .await
            .unwrap();
        let evidence = stores
            .files
            .create_file(&CreateFile {
                display_name: "disk.E01".to_string(),
                folder_id: case.id,
                user_id: owner.id,
                data_type: Some("ewf".to_string()),
                magic_mime: None,
            })
            .await
            .unwrap();

        Self {
            store,
            stores,
            guard,
            folder_service,
            runtime: Arc::new(MemoryRuntime::new("default")),
            config,
            owner,
            case,
            evidence,
            ids: Arc::new(SequentialIdGenerator::new("id")),
            root,
        }
    }

    pub fn data_root(&self) -> &Path {
        self.root.path()
    }

    pub fn ctx(&self, user: &User) -> RequestContext {
        RequestContext::new(user.id, Some(user.username.clone()))
    }

    /// A root folder owned by the harness owner.
    pub async fn root_folder(&self, name: &str) -> Folder {
        let folder = self
            .stores
            .folders
            .create_folder(&CreateFolder {
                display_name: name.to_string(),
                parent_id: None,
                user_id: self.owner.id,
            })
            .await
            .unwrap();
        self.grant(self.owner.id, folder.id, Role::Owner).await;
        folder
    }

    pub async fn user(&self, username: &str) -> User {
        self.stores
            .principals
            .create_user(&CreateUser {
                username: username.to_string(),
                display_name: None,
            })
            .await
            .unwrap()
    }

    pub async fn grant(&self, user_id: Uuid, folder_id: Uuid, role: Role) -> UserRole {
        self.stores
            .grants
            .create_user_role(&CreateUserRole {
                role,
                user_id,
                resource: ResourceRef::Folder(folder_id),
            })
            .await
            .unwrap()
    }

    pub fn permission_service(&self) -> PermissionService {
        PermissionService::new(
            self.guard.clone(),
            self.stores.principals.clone(),
            self.stores.grants.clone(),
        )
    }

    pub fn workflow_service(&self) -> WorkflowService {
        WorkflowService::new(
            self.stores.clone(),
            self.guard.clone(),
            self.folder_service.clone(),
            self.runtime.clone(),
            self.ids.clone(),
            self.config.clone(),
        )
    }

    pub fn template_service(&self) -> TemplateService {
        TemplateService::new(
            self.stores.templates.clone(),
            self.stores.workflows.clone(),
            self.guard.clone(),
            self.ids.clone(),
            &self.config,
        )
    }
}
