//! Folder entity model.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A folder in the case hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: Uuid,
    /// Folder display name.
    pub display_name: String,
    /// Parent folder ID (null for root folders).
    pub parent_id: Option<Uuid>,
    /// The user who created the folder.
    pub user_id: Uuid,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// On-disk directory for this folder's artifacts under `data_root`.
    pub fn storage_path(&self, data_root: impl AsRef<Path>) -> PathBuf {
        Self::path_for(data_root, self.id)
    }

    /// On-disk directory for the folder `id` under `data_root`.
    pub fn path_for(data_root: impl AsRef<Path>, id: Uuid) -> PathBuf {
        data_root.as_ref().join(id.simple().to_string())
    }
}

/// Data required to create a new folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder display name.
    pub display_name: String,
    /// Parent folder (None for root).
    pub parent_id: Option<Uuid>,
    /// The creating user.
    pub user_id: Uuid,
}
