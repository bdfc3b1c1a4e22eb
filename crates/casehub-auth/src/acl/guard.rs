//! Request-level authorization gate.
//!
//! The guard loads the folder and/or file a call targets, resolves access
//! for the acting user, and only then runs the wrapped operation. A missing
//! resource is `NotFound`, an insufficient role is `Authorization`; the
//! operation body never starts in either case.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use casehub_core::{AppError, AppResult};
use casehub_database::store::{FileStore, FolderStore};
use casehub_entity::file::File;
use casehub_entity::folder::Folder;
use casehub_entity::role::{Grant, Role};

use super::resolver::{AccessResolver, Resource};

/// Resource identifiers extracted from a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTarget {
    /// Folder the call acts on.
    pub folder_id: Option<Uuid>,
    /// File the call acts on.
    pub file_id: Option<Uuid>,
}

impl AccessTarget {
    /// Target a folder.
    pub fn folder(folder_id: Uuid) -> Self {
        Self {
            folder_id: Some(folder_id),
            file_id: None,
        }
    }

    /// Target a file.
    pub fn file(file_id: Uuid) -> Self {
        Self {
            folder_id: None,
            file_id: Some(file_id),
        }
    }
}

/// The loaded resources and the grants that authorized them.
#[derive(Debug, Clone)]
pub struct AccessDecision {
    /// The folder and its authorizing grant, when a folder was targeted.
    pub folder: Option<(Folder, Grant)>,
    /// The file and its authorizing grant, when a file was targeted.
    pub file: Option<(File, Grant)>,
}

impl AccessDecision {
    /// The most specific grant: the file's when present, else the folder's.
    pub fn grant(&self) -> Option<&Grant> {
        self.file
            .as_ref()
            .map(|(_, g)| g)
            .or_else(|| self.folder.as_ref().map(|(_, g)| g))
    }
}

/// Authorizes calls before they run.
#[derive(Debug, Clone)]
pub struct AccessGuard {
    resolver: Arc<AccessResolver>,
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
}

impl AccessGuard {
    /// Creates a new guard.
    pub fn new(
        resolver: Arc<AccessResolver>,
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            resolver,
            folders,
            files,
        }
    }

    /// The underlying resolver.
    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    /// Load every targeted resource and check `allowed` on each.
    ///
    /// The folder is checked before the file when both are targeted.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        allowed: &[Role],
        target: AccessTarget,
    ) -> AppResult<AccessDecision> {
        if target.folder_id.is_none() && target.file_id.is_none() {
            return Err(AppError::validation(
                "Either a folder or a file must be provided",
            ));
        }

        let folder = match target.folder_id {
            Some(folder_id) => {
                let folder = self.load_folder(folder_id).await?;
                let grant = self
                    .resolver
                    .resolve(user_id, allowed, Resource::Folder(&folder))
                    .await?
                    .ok_or_else(|| {
                        info!(user_id = %user_id, folder_id = %folder_id, "Folder access denied");
                        AppError::authorization("No access to folder")
                    })?;
                Some((folder, grant))
            }
            None => None,
        };

        let file = match target.file_id {
            Some(file_id) => {
                let file = self.load_file(file_id).await?;
                let grant = self
                    .resolver
                    .resolve(user_id, allowed, Resource::File(&file))
                    .await?
                    .ok_or_else(|| {
                        info!(user_id = %user_id, file_id = %file_id, "File access denied");
                        AppError::authorization("No access to file")
                    })?;
                Some((file, grant))
            }
            None => None,
        };

        Ok(AccessDecision { folder, file })
    }

    /// Authorize, then await `op`.
    pub async fn run<T, F, Fut>(
        &self,
        user_id: Uuid,
        allowed: &[Role],
        target: AccessTarget,
        op: F,
    ) -> AppResult<T>
    where
        F: FnOnce(AccessDecision) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let decision = self.authorize(user_id, allowed, target).await?;
        op(decision).await
    }

    /// Authorize, then call `op` directly.
    pub async fn run_sync<T, F>(
        &self,
        user_id: Uuid,
        allowed: &[Role],
        target: AccessTarget,
        op: F,
    ) -> AppResult<T>
    where
        F: FnOnce(AccessDecision) -> AppResult<T>,
    {
        let decision = self.authorize(user_id, allowed, target).await?;
        op(decision)
    }

    async fn load_folder(&self, folder_id: Uuid) -> AppResult<Folder> {
        self.folders
            .find_folder(folder_id)
            .await?
            .filter(|f| !f.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))
    }

    async fn load_file(&self, file_id: Uuid) -> AppResult<File> {
        self.files
            .find_file(file_id)
            .await?
            .filter(|f| !f.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};

    use casehub_core::error::ErrorKind;
    use casehub_database::store::{GrantStore, MemoryStore, PrincipalStore};
    use casehub_entity::file::CreateFile;
    use casehub_entity::folder::CreateFolder;
    use casehub_entity::role::{CreateUserRole, ResourceRef};
    use casehub_entity::user::CreateUser;

    struct Fixture {
        store: Arc<MemoryStore>,
        guard: AccessGuard,
        user_id: Uuid,
        folder: Folder,
        file: File,
    }

    async fn fixture(role: Option<Role>) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let resolver = Arc::new(AccessResolver::new(store.clone(), store.clone(), store.clone()));
        let guard = AccessGuard::new(resolver, store.clone(), store.clone());
        let user = store
            .create_user(&CreateUser {
                username: "examiner".to_string(),
                display_name: None,
            })
            .await
            .unwrap();
        let folder = store
            .create_folder(&CreateFolder {
                display_name: "case-42".to_string(),
                parent_id: None,
                user_id: user.id,
            })
            .await
            .unwrap();
        let file = store
            .create_file(&CreateFile {
                display_name: "disk.E01".to_string(),
                folder_id: folder.id,
                user_id: user.id,
                data_type: None,
                magic_mime: None,
            })
            .await
            .unwrap();
        if let Some(role) = role {
            store
                .create_user_role(&CreateUserRole {
                    role,
                    user_id: user.id,
                    resource: ResourceRef::Folder(folder.id),
                })
                .await
                .unwrap();
        }
        Fixture {
            store,
            guard,
            user_id: user.id,
            folder,
            file,
        }
    }

    #[tokio::test]
    async fn test_authorized_call_runs_with_loaded_folder() {
        let f = fixture(Some(Role::Editor)).await;
        let name = f
            .guard
            .run(
                f.user_id,
                &Role::WRITERS,
                AccessTarget::folder(f.folder.id),
                |decision| async move {
                    let (folder, grant) = decision.folder.unwrap();
                    assert_eq!(grant.role(), Role::Editor);
                    Ok(folder.display_name)
                },
            )
            .await
            .unwrap();
        assert_eq!(name, "case-42");
    }

    #[tokio::test]
    async fn test_denied_call_never_runs() {
        let f = fixture(Some(Role::Viewer)).await;
        let ran = AtomicBool::new(false);
        let err = f
            .guard
            .run(
                f.user_id,
                &Role::WRITERS,
                AccessTarget::folder(f.folder.id),
                |_| async {
                    ran.store(true, Ordering::SeqCst);
                    Ok(())
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);
        assert!(!ran.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_missing_resource_is_not_found_not_forbidden() {
        let f = fixture(None).await;
        let err = f
            .guard
            .authorize(f.user_id, &Role::READERS, AccessTarget::folder(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = f
            .guard
            .authorize(f.user_id, &Role::READERS, AccessTarget::file(Uuid::new_v4()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_soft_deleted_file_is_not_found() {
        let f = fixture(Some(Role::Owner)).await;
        f.store.soft_delete_file(f.file.id).await.unwrap();
        let err = f
            .guard
            .authorize(f.user_id, &Role::READERS, AccessTarget::file(f.file.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_file_inherits_folder_grant() {
        let f = fixture(Some(Role::Viewer)).await;
        let decision = f
            .guard
            .authorize(f.user_id, &Role::READERS, AccessTarget::file(f.file.id))
            .await
            .unwrap();
        assert!(decision.folder.is_none());
        assert_eq!(decision.grant().map(Grant::role), Some(Role::Viewer));
    }

    #[tokio::test]
    async fn test_sync_operation_is_gated() {
        let f = fixture(None).await;
        let err = f
            .guard
            .run_sync(
                f.user_id,
                &Role::READERS,
                AccessTarget::file(f.file.id),
                |_| -> AppResult<()> { panic!("must not run") },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let g = fixture(Some(Role::Owner)).await;
        let id = g
            .guard
            .run_sync(
                g.user_id,
                &Role::READERS,
                AccessTarget::file(g.file.id),
                |decision| Ok(decision.file.map(|(file, _)| file.id)),
            )
            .await
            .unwrap();
        assert_eq!(id, Some(g.file.id));
    }

    #[tokio::test]
    async fn test_empty_target_is_validation_error() {
        let f = fixture(Some(Role::Owner)).await;
        let err = f
            .guard
            .authorize(f.user_id, &Role::READERS, AccessTarget::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }
}
