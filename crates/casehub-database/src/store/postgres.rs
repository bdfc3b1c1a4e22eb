//! PostgreSQL backend wiring.

use std::sync::Arc;

use sqlx::PgPool;

use crate::repositories::{
    FileRepository, FolderRepository, JobRepository, RoleRepository, TaskRepository,
    TemplateRepository, UserRepository, WorkflowRepository,
};

use super::Stores;

/// Build a [`Stores`] bundle where each store is its repository.
pub fn stores(pool: PgPool) -> Stores {
    Stores {
        folders: Arc::new(FolderRepository::new(pool.clone())),
        files: Arc::new(FileRepository::new(pool.clone())),
        principals: Arc::new(UserRepository::new(pool.clone())),
        grants: Arc::new(RoleRepository::new(pool.clone())),
        workflows: Arc::new(WorkflowRepository::new(pool.clone())),
        tasks: Arc::new(TaskRepository::new(pool.clone())),
        templates: Arc::new(TemplateRepository::new(pool.clone())),
        jobs: Arc::new(JobRepository::new(pool)),
    }
}
