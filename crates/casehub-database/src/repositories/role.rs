//! Grant repository implementation (user and group roles).

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use casehub_core::error::{AppError, ErrorKind};
use casehub_core::result::AppResult;
use casehub_entity::role::{CreateGroupRole, CreateUserRole, GroupRole, ResourceRef, UserRole};

use crate::store::GrantStore;

/// Repository for `user_roles` and `group_roles`.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Column that holds the resource id for a given reference.
fn resource_column(resource: &ResourceRef) -> &'static str {
    match resource {
        ResourceRef::Folder(_) => "folder_id",
        ResourceRef::File(_) => "file_id",
    }
}

#[async_trait]
impl GrantStore for RoleRepository {
    async fn user_roles_for(
        &self,
        user_id: Uuid,
        resource: ResourceRef,
    ) -> AppResult<Vec<UserRole>> {
        let sql = format!(
            "SELECT * FROM user_roles WHERE user_id = $1 AND {} = $2 ORDER BY created_at ASC",
            resource_column(&resource)
        );
        sqlx::query_as::<_, UserRole>(&sql)
            .bind(user_id)
            .bind(resource.id())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load user roles", e))
    }

    async fn group_roles_for(
        &self,
        group_id: Uuid,
        resource: ResourceRef,
    ) -> AppResult<Vec<GroupRole>> {
        let sql = format!(
            "SELECT * FROM group_roles WHERE group_id = $1 AND {} = $2 ORDER BY created_at ASC",
            resource_column(&resource)
        );
        sqlx::query_as::<_, GroupRole>(&sql)
            .bind(group_id)
            .bind(resource.id())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load group roles", e)
            })
    }

    async fn create_user_role(&self, data: &CreateUserRole) -> AppResult<UserRole> {
        let (folder_id, file_id) = data.resource.columns();
        sqlx::query_as::<_, UserRole>(
            "INSERT INTO user_roles (role, user_id, folder_id, file_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.role)
        .bind(data.user_id)
        .bind(folder_id)
        .bind(file_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create user role", e))
    }

    async fn create_group_role(&self, data: &CreateGroupRole) -> AppResult<GroupRole> {
        let (folder_id, file_id) = data.resource.columns();
        sqlx::query_as::<_, GroupRole>(
            "INSERT INTO group_roles (role, group_id, folder_id, file_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(data.role)
        .bind(data.group_id)
        .bind(folder_id)
        .bind(file_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create group role", e))
    }

    async fn find_user_role(&self, id: Uuid) -> AppResult<Option<UserRole>> {
        sqlx::query_as::<_, UserRole>("SELECT * FROM user_roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user role", e))
    }

    async fn find_group_role(&self, id: Uuid) -> AppResult<Option<GroupRole>> {
        sqlx::query_as::<_, GroupRole>("SELECT * FROM group_roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find group role", e)
            })
    }

    async fn delete_user_role(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM user_roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete user role", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_group_role(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM group_roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete group role", e)
            })?;
        Ok(result.rows_affected() > 0)
    }
}
