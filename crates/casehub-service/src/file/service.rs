//! File metadata lookups.

use std::sync::Arc;

use uuid::Uuid;

use casehub_auth::{AccessGuard, AccessTarget};
use casehub_core::{AppError, AppResult};
use casehub_entity::file::File;
use casehub_entity::role::Role;

use crate::context::RequestContext;

/// Serves file metadata to readers of the file.
#[derive(Debug, Clone)]
pub struct FileService {
    guard: Arc<AccessGuard>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(guard: Arc<AccessGuard>) -> Self {
        Self { guard }
    }

    /// Get a file the caller can read.
    pub async fn get(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<File> {
        self.guard
            .run_sync(
                ctx.user_id,
                &Role::READERS,
                AccessTarget::file(file_id),
                |decision| {
                    decision
                        .file
                        .map(|(file, _)| file)
                        .ok_or_else(|| AppError::internal("File decision missing"))
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use casehub_core::error::ErrorKind;

    use crate::testing::Harness;

    #[tokio::test]
    async fn test_get_inherits_folder_access() {
        let h = Harness::new().await;
        let service = FileService::new(h.guard.clone());

        let file = service.get(&h.ctx(&h.owner), h.evidence.id).await.unwrap();
        assert_eq!(file.display_name, "disk.E01");

        let outsider = h.user("outsider").await;
        let err = service.get(&h.ctx(&outsider), h.evidence.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
    }

    #[tokio::test]
    async fn test_deleted_file_is_not_found() {
        let h = Harness::new().await;
        h.store.soft_delete_file(h.evidence.id).await.unwrap();
        let err = FileService::new(h.guard.clone())
            .get(&h.ctx(&h.owner), h.evidence.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
