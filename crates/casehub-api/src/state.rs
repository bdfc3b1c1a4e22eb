//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use casehub_auth::{AccessGuard, AccessResolver, JwtDecoder};
use casehub_core::config::AppConfig;
use casehub_core::traits::{IdGenerator, UuidGenerator};
use casehub_database::store::{PrincipalStore, Stores};
use casehub_service::{FileService, FolderService, PermissionService, TemplateService, WorkflowService};
use casehub_worker::TaskRuntime;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Bearer token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// User lookups for authenticated requests
    pub principals: Arc<dyn PrincipalStore>,

    // ── Runtime ──────────────────────────────────────────────
    /// Task graph submission backend
    pub runtime: Arc<dyn TaskRuntime>,

    // ── Services ─────────────────────────────────────────────
    /// Folder sharing and grants
    pub permission_service: Arc<PermissionService>,
    /// File metadata
    pub file_service: Arc<FileService>,
    /// Workflow lifecycle
    pub workflow_service: Arc<WorkflowService>,
    /// Workflow templates
    pub template_service: Arc<TemplateService>,
}

impl AppState {
    /// Wire every service over `stores` and `runtime`.
    pub fn new(config: AppConfig, stores: Stores, runtime: Arc<dyn TaskRuntime>) -> Self {
        Self::with_ids(config, stores, runtime, Arc::new(UuidGenerator))
    }

    /// Like [`AppState::new`], with an explicit identifier generator.
    pub fn with_ids(
        config: AppConfig,
        stores: Stores,
        runtime: Arc<dyn TaskRuntime>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let resolver = Arc::new(AccessResolver::new(
            Arc::clone(&stores.folders),
            Arc::clone(&stores.principals),
            Arc::clone(&stores.grants),
        ));
        let guard = Arc::new(AccessGuard::new(
            resolver,
            Arc::clone(&stores.folders),
            Arc::clone(&stores.files),
        ));
        let folder_service = Arc::new(FolderService::new(
            Arc::clone(&stores.folders),
            Arc::clone(&stores.grants),
            &config.workflow.data_root,
        ));

        let permission_service = Arc::new(PermissionService::new(
            Arc::clone(&guard),
            Arc::clone(&stores.principals),
            Arc::clone(&stores.grants),
        ));
        let file_service = Arc::new(FileService::new(Arc::clone(&guard)));
        let template_service = Arc::new(TemplateService::new(
            Arc::clone(&stores.templates),
            Arc::clone(&stores.workflows),
            Arc::clone(&guard),
            Arc::clone(&ids),
            &config.workflow,
        ));
        let workflow_service = Arc::new(WorkflowService::new(
            stores.clone(),
            guard,
            folder_service,
            Arc::clone(&runtime),
            ids,
            config.workflow.clone(),
        ));

        Self {
            jwt_decoder: Arc::new(JwtDecoder::new(&config.auth)),
            principals: stores.principals,
            runtime,
            permission_service,
            file_service,
            workflow_service,
            template_service,
            config: Arc::new(config),
        }
    }
}
