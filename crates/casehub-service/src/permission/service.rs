//! Folder sharing: granting, inspecting and revoking roles.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use casehub_auth::{AccessGuard, AccessTarget};
use casehub_core::{AppError, AppResult};
use casehub_database::store::{GrantStore, PrincipalStore};
use casehub_entity::role::{CreateGroupRole, CreateUserRole, Grant, GroupRole, ResourceRef, Role, UserRole};
use casehub_entity::user::{Group, User};

use crate::context::RequestContext;

/// Principals to share a folder with, and the roles they receive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareFolderRequest {
    /// Users addressed by ID.
    pub user_ids: Vec<Uuid>,
    /// Groups addressed by ID.
    pub group_ids: Vec<Uuid>,
    /// Users addressed by username.
    pub user_names: Vec<String>,
    /// Groups addressed by name.
    pub group_names: Vec<String>,
    /// Role granted to every listed user.
    pub user_role: Option<String>,
    /// Role granted to every listed group.
    pub group_role: Option<String>,
}

/// Grants created by a share operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareResult {
    /// New user grants.
    pub user_roles: Vec<UserRole>,
    /// New group grants.
    pub group_roles: Vec<GroupRole>,
}

/// Manages user and group grants on folders.
#[derive(Debug, Clone)]
pub struct PermissionService {
    /// Authorization guard.
    guard: Arc<AccessGuard>,
    /// User and group lookups.
    principals: Arc<dyn PrincipalStore>,
    /// Grant persistence.
    grants: Arc<dyn GrantStore>,
}

impl PermissionService {
    /// Creates a new permission service.
    pub fn new(
        guard: Arc<AccessGuard>,
        principals: Arc<dyn PrincipalStore>,
        grants: Arc<dyn GrantStore>,
    ) -> Self {
        Self {
            guard,
            principals,
            grants,
        }
    }

    /// Grant roles on `folder_id` to the requested users and groups.
    ///
    /// Every principal is resolved and checked for an existing grant before
    /// anything is written, so a rejected request leaves no partial grants.
    pub async fn share_folder(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        req: ShareFolderRequest,
    ) -> AppResult<ShareResult> {
        self.guard
            .authorize(ctx.user_id, &Role::WRITERS, AccessTarget::folder(folder_id))
            .await?;

        let users = self.resolve_users(&req).await?;
        let groups = self.resolve_groups(&req).await?;
        if users.is_empty() && groups.is_empty() {
            return Err(AppError::validation(
                "At least one user or group must be provided",
            ));
        }

        let user_role = required_role(&users, req.user_role.as_deref(), "user_role")?;
        let group_role = required_role(&groups, req.group_role.as_deref(), "group_role")?;
        let resource = ResourceRef::Folder(folder_id);

        for user in &users {
            if !self.grants.user_roles_for(user.id, resource).await?.is_empty() {
                return Err(AppError::conflict(format!(
                    "User '{}' already has a role on this folder",
                    user.username
                )));
            }
        }
        for group in &groups {
            if !self.grants.group_roles_for(group.id, resource).await?.is_empty() {
                return Err(AppError::conflict(format!(
                    "Group '{}' already has a role on this folder",
                    group.name
                )));
            }
        }

        let mut result = ShareResult::default();
        if let Some(role) = user_role {
            for user in &users {
                result.user_roles.push(
                    self.grants
                        .create_user_role(&CreateUserRole {
                            role,
                            user_id: user.id,
                            resource,
                        })
                        .await?,
                );
            }
        }
        if let Some(role) = group_role {
            for group in &groups {
                result.group_roles.push(
                    self.grants
                        .create_group_role(&CreateGroupRole {
                            role,
                            group_id: group.id,
                            resource,
                        })
                        .await?,
                );
            }
        }

        info!(
            folder_id = %folder_id,
            shared_by = %ctx.user_id,
            users = result.user_roles.len(),
            groups = result.group_roles.len(),
            "Folder shared"
        );
        Ok(result)
    }

    /// The grant through which the caller can read `folder_id`.
    pub async fn my_role(&self, ctx: &RequestContext, folder_id: Uuid) -> AppResult<Grant> {
        self.guard
            .run_sync(
                ctx.user_id,
                &Role::READERS,
                AccessTarget::folder(folder_id),
                |decision| {
                    decision
                        .folder
                        .map(|(_, grant)| grant)
                        .ok_or_else(|| AppError::internal("Folder decision missing"))
                },
            )
            .await
    }

    /// Remove a user grant from `folder_id`.
    pub async fn delete_user_role(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        role_id: Uuid,
    ) -> AppResult<()> {
        self.guard
            .authorize(ctx.user_id, &Role::WRITERS, AccessTarget::folder(folder_id))
            .await?;

        let grant = self
            .grants
            .find_user_role(role_id)
            .await?
            .filter(|g| g.folder_id == Some(folder_id))
            .ok_or_else(|| AppError::not_found(format!("User role {role_id} not found")))?;

        if !self.grants.delete_user_role(grant.id).await? {
            return Err(AppError::not_found(format!("User role {role_id} not found")));
        }
        info!(folder_id = %folder_id, role_id = %role_id, removed_by = %ctx.user_id, "User role removed");
        Ok(())
    }

    /// Remove a group grant from `folder_id`.
    pub async fn delete_group_role(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
        role_id: Uuid,
    ) -> AppResult<()> {
        self.guard
            .authorize(ctx.user_id, &Role::WRITERS, AccessTarget::folder(folder_id))
            .await?;

        let grant = self
            .grants
            .find_group_role(role_id)
            .await?
            .filter(|g| g.folder_id == Some(folder_id))
            .ok_or_else(|| AppError::not_found(format!("Group role {role_id} not found")))?;

        if !self.grants.delete_group_role(grant.id).await? {
            return Err(AppError::not_found(format!("Group role {role_id} not found")));
        }
        info!(folder_id = %folder_id, role_id = %role_id, removed_by = %ctx.user_id, "Group role removed");
        Ok(())
    }

    async fn resolve_users(&self, req: &ShareFolderRequest) -> AppResult<Vec<User>> {
        let mut users: Vec<User> = Vec::new();
        for id in &req.user_ids {
            let user = self
                .principals
                .find_user(*id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;
            push_unique(&mut users, user, |u| u.id);
        }
        for name in &req.user_names {
            let user = self
                .principals
                .find_user_by_username(name)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{name}' not found")))?;
            push_unique(&mut users, user, |u| u.id);
        }
        Ok(users)
    }

    async fn resolve_groups(&self, req: &ShareFolderRequest) -> AppResult<Vec<Group>> {
        let mut groups: Vec<Group> = Vec::new();
        for id in &req.group_ids {
            let group = self
                .principals
                .find_group(*id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Group {id} not found")))?;
            push_unique(&mut groups, group, |g| g.id);
        }
        for name in &req.group_names {
            let group = self
                .principals
                .find_group_by_name(name)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Group '{name}' not found")))?;
            push_unique(&mut groups, group, |g| g.id);
        }
        Ok(groups)
    }
}

fn push_unique<T>(items: &mut Vec<T>, item: T, key: impl Fn(&T) -> Uuid) {
    let id = key(&item);
    if !items.iter().any(|existing| key(existing) == id) {
        items.push(item);
    }
}

/// Parse `raw` when `principals` is non-empty.
fn required_role<T>(principals: &[T], raw: Option<&str>, field: &str) -> AppResult<Option<Role>> {
    if principals.is_empty() {
        return Ok(None);
    }
    let raw = raw.ok_or_else(|| AppError::validation(format!("{field} is required")))?;
    raw.parse::<Role>().map(Some)
}
