//! File entity model.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An uploaded artifact. Belongs to exactly one folder.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier.
    pub id: Uuid,
    /// Original file name.
    pub display_name: String,
    /// The folder containing this file.
    pub folder_id: Uuid,
    /// The uploading user.
    pub user_id: Uuid,
    /// Extension without the leading dot, if any.
    pub extension: Option<String>,
    /// Data type label assigned by the producing task (e.g. `"worker:plaso:file:plaso_storage"`).
    pub data_type: Option<String>,
    /// MIME type detected from content.
    pub magic_mime: Option<String>,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// When the file was created.
    pub created_at: DateTime<Utc>,
}

impl File {
    /// On-disk location of the file, given its folder's storage path.
    pub fn storage_path(&self, folder_path: impl AsRef<Path>) -> PathBuf {
        let name = match &self.extension {
            Some(ext) if !ext.is_empty() => format!("{}.{}", self.id.simple(), ext),
            _ => self.id.simple().to_string(),
        };
        folder_path.as_ref().join(name)
    }
}

/// Data required to create a new file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Original file name.
    pub display_name: String,
    /// The folder to place the file in.
    pub folder_id: Uuid,
    /// The uploading user.
    pub user_id: Uuid,
    /// Data type label.
    pub data_type: Option<String>,
    /// MIME type.
    pub magic_mime: Option<String>,
}

impl CreateFile {
    /// Lowercased extension derived from the display name.
    pub fn extension(&self) -> Option<String> {
        self.display_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_display_name() {
        let create = CreateFile {
            display_name: "Memory.RAW".to_string(),
            folder_id: Uuid::nil(),
            user_id: Uuid::nil(),
            data_type: None,
            magic_mime: None,
        };
        assert_eq!(create.extension().as_deref(), Some("raw"));
    }

    #[test]
    fn test_storage_path_uses_hex_id() {
        let file = File {
            id: Uuid::nil(),
            display_name: "disk.img".to_string(),
            folder_id: Uuid::nil(),
            user_id: Uuid::nil(),
            extension: Some("img".to_string()),
            data_type: None,
            magic_mime: None,
            is_deleted: false,
            created_at: Utc::now(),
        };
        let path = file.storage_path("/data/f");
        assert_eq!(
            path,
            PathBuf::from("/data/f/00000000000000000000000000000000.img")
        );
    }
}
