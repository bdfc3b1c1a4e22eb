//! Access resolution over folder ancestry and group membership.
//!
//! Resolution order for a principal and a set of allowed roles:
//!
//! 1. For a file: the user's direct grant on the file, then each of the
//!    user's groups' grants on the file, if in the allowed set. Anything
//!    else, including a `No Access` on the file, falls through to the
//!    file's folder.
//! 2. For each folder from the target up to the root:
//!    a. A direct `No Access` grant ends the walk with no access.
//!    b. A direct grant in the allowed set is returned.
//!    c. Each group grant in the allowed set, in membership order.
//! 3. No access.
//!
//! A direct `No Access` only masks grants further up the tree. A more
//! specific grant found before it is returned first.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use casehub_core::{AppError, AppResult};
use casehub_database::store::{FolderStore, GrantStore, PrincipalStore};
use casehub_entity::file::File;
use casehub_entity::folder::Folder;
use casehub_entity::role::{Grant, ResourceRef, Role};
use casehub_entity::user::Group;

/// The resource an access check targets. Exactly one of folder or file.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    /// A loaded folder.
    Folder(&'a Folder),
    /// A loaded file.
    File(&'a File),
}

impl<'a> Resource<'a> {
    /// Pick the resource from an optional folder and file.
    ///
    /// Fails with a validation error unless exactly one is given.
    pub fn from_options(folder: Option<&'a Folder>, file: Option<&'a File>) -> AppResult<Self> {
        match (folder, file) {
            (Some(folder), None) => Ok(Self::Folder(folder)),
            (None, Some(file)) => Ok(Self::File(file)),
            (None, None) => Err(AppError::validation(
                "Either a folder or a file must be provided",
            )),
            (Some(_), Some(_)) => Err(AppError::validation(
                "Provide either a folder or a file, not both",
            )),
        }
    }

    fn resource_ref(&self) -> ResourceRef {
        match self {
            Self::Folder(folder) => ResourceRef::Folder(folder.id),
            Self::File(file) => ResourceRef::File(file.id),
        }
    }
}

/// Outcome of checking a single level of the hierarchy.
enum Level {
    Granted(Grant),
    Revoked,
    Continue,
}

/// Answers "does this user hold one of these roles on this resource".
#[derive(Debug, Clone)]
pub struct AccessResolver {
    folders: Arc<dyn FolderStore>,
    principals: Arc<dyn PrincipalStore>,
    grants: Arc<dyn GrantStore>,
}

impl AccessResolver {
    /// Creates a new resolver.
    pub fn new(
        folders: Arc<dyn FolderStore>,
        principals: Arc<dyn PrincipalStore>,
        grants: Arc<dyn GrantStore>,
    ) -> Self {
        Self {
            folders,
            principals,
            grants,
        }
    }

    /// Return the grant that gives `user_id` one of `allowed` on `resource`,
    /// or `None` when access is not granted.
    ///
    /// `allowed` must be non-empty and must not contain [`Role::NoAccess`];
    /// either is a validation error.
    pub async fn resolve(
        &self,
        user_id: Uuid,
        allowed: &[Role],
        resource: Resource<'_>,
    ) -> AppResult<Option<Grant>> {
        if allowed.is_empty() {
            return Err(AppError::validation("At least one allowed role is required"));
        }
        if allowed.iter().any(|r| r.is_revocation()) {
            return Err(AppError::validation(
                "'No Access' cannot be used as an allowed role",
            ));
        }

        let groups = self.principals.groups_for_user(user_id).await?;

        let start = match resource {
            Resource::Folder(folder) => folder.clone(),
            Resource::File(file) => {
                // File grants only grant; a `No Access` on the file defers to the folder walk.
                if let Level::Granted(grant) = self
                    .check_level(user_id, &groups, allowed, resource.resource_ref(), false)
                    .await?
                {
                    return Ok(Some(grant));
                }
                match self.folders.find_folder(file.folder_id).await? {
                    Some(folder) => folder,
                    None => {
                        warn!(
                            file_id = %file.id,
                            folder_id = %file.folder_id,
                            "File references a missing folder"
                        );
                        return Ok(None);
                    }
                }
            }
        };

        self.walk_folders(user_id, &groups, allowed, start).await
    }

    /// Shorthand for `resolve(..).is_some()`.
    pub async fn has_access(
        &self,
        user_id: Uuid,
        allowed: &[Role],
        resource: Resource<'_>,
    ) -> AppResult<bool> {
        Ok(self.resolve(user_id, allowed, resource).await?.is_some())
    }

    async fn walk_folders(
        &self,
        user_id: Uuid,
        groups: &[Group],
        allowed: &[Role],
        start: Folder,
    ) -> AppResult<Option<Grant>> {
        let mut visited = HashSet::new();
        let mut current = Some(start);

        while let Some(folder) = current {
            if !visited.insert(folder.id) {
                warn!(folder_id = %folder.id, "Cycle detected in folder ancestry");
                return Ok(None);
            }

            match self
                .check_level(user_id, groups, allowed, ResourceRef::Folder(folder.id), true)
                .await?
            {
                Level::Granted(grant) => return Ok(Some(grant)),
                Level::Revoked => {
                    debug!(user_id = %user_id, folder_id = %folder.id, "Access revoked on folder");
                    return Ok(None);
                }
                Level::Continue => {}
            }

            current = match folder.parent_id {
                Some(parent_id) => {
                    let parent = self.folders.find_folder(parent_id).await?;
                    if parent.is_none() {
                        warn!(
                            folder_id = %folder.id,
                            parent_id = %parent_id,
                            "Folder references a missing parent"
                        );
                    }
                    parent
                }
                None => None,
            };
        }

        debug!(user_id = %user_id, "No matching grant in folder ancestry");
        Ok(None)
    }

    async fn check_level(
        &self,
        user_id: Uuid,
        groups: &[Group],
        allowed: &[Role],
        resource: ResourceRef,
        revocable: bool,
    ) -> AppResult<Level> {
        let direct = self.grants.user_roles_for(user_id, resource).await?;
        if let Some(grant) = direct.into_iter().next() {
            if revocable && grant.role.is_revocation() {
                return Ok(Level::Revoked);
            }
            if allowed.contains(&grant.role) {
                return Ok(Level::Granted(Grant::User(grant)));
            }
        }

        for group in groups {
            let found = self
                .grants
                .group_roles_for(group.id, resource)
                .await?
                .into_iter()
                .find(|g| allowed.contains(&g.role));
            if let Some(grant) = found {
                return Ok(Level::Granted(Grant::Group(grant)));
            }
        }

        Ok(Level::Continue)
    }
}
