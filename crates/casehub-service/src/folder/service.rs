//! Results folders: creation, ownership and on-disk directories.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use casehub_core::error::ErrorKind;
use casehub_core::{AppError, AppResult};
use casehub_database::store::{FolderStore, GrantStore};
use casehub_entity::folder::{CreateFolder, Folder};
use casehub_entity::role::{CreateUserRole, ResourceRef, Role};

/// Creates folders for workflow results and maps them to disk.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder persistence.
    folders: Arc<dyn FolderStore>,
    /// Grant persistence.
    grants: Arc<dyn GrantStore>,
    /// Directory under which every folder's artifacts live.
    data_root: PathBuf,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        grants: Arc<dyn GrantStore>,
        data_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            folders,
            grants,
            data_root: data_root.into(),
        }
    }

    /// Create a subfolder owned by `user_id` and its directory on disk.
    pub async fn create_subfolder(
        &self,
        parent_id: Uuid,
        display_name: &str,
        user_id: Uuid,
    ) -> AppResult<Folder> {
        let folder = self
            .folders
            .create_folder(&CreateFolder {
                display_name: display_name.to_string(),
                parent_id: Some(parent_id),
                user_id,
            })
            .await?;

        self.grants
            .create_user_role(&CreateUserRole {
                role: Role::Owner,
                user_id,
                resource: ResourceRef::Folder(folder.id),
            })
            .await?;

        self.ensure_dir(folder.id).await?;

        info!(
            folder_id = %folder.id,
            parent_id = %parent_id,
            user_id = %user_id,
            "Created results folder"
        );
        Ok(folder)
    }

    /// On-disk directory of `folder_id`.
    pub fn path_of(&self, folder_id: Uuid) -> PathBuf {
        Folder::path_for(&self.data_root, folder_id)
    }

    /// Create the directory of `folder_id` if missing and return its path.
    pub async fn ensure_dir(&self, folder_id: Uuid) -> AppResult<PathBuf> {
        let path = self.path_of(folder_id);
        tokio::fs::create_dir_all(&path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create directory {}", path.display()),
                e,
            )
        })?;
        debug!(folder_id = %folder_id, path = %path.display(), "Folder directory ready");
        Ok(path)
    }
}
