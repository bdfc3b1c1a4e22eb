//! Grant entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use casehub_core::{AppError, AppResult};

use super::model::Role;

/// The resource a grant targets. Exactly one of folder or file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum ResourceRef {
    /// A folder.
    Folder(Uuid),
    /// A file.
    File(Uuid),
}

impl ResourceRef {
    /// Build a reference from the nullable column pair used in storage.
    ///
    /// Fails with a validation error when neither or both are set.
    pub fn from_columns(folder_id: Option<Uuid>, file_id: Option<Uuid>) -> AppResult<Self> {
        match (folder_id, file_id) {
            (Some(folder), None) => Ok(Self::Folder(folder)),
            (None, Some(file)) => Ok(Self::File(file)),
            (None, None) => Err(AppError::validation(
                "A grant must reference a folder or a file",
            )),
            (Some(_), Some(_)) => Err(AppError::validation(
                "A grant cannot reference both a folder and a file",
            )),
        }
    }

    /// Split into the `(folder_id, file_id)` column pair.
    pub fn columns(&self) -> (Option<Uuid>, Option<Uuid>) {
        match *self {
            Self::Folder(id) => (Some(id), None),
            Self::File(id) => (None, Some(id)),
        }
    }

    /// The referenced id, regardless of kind.
    pub fn id(&self) -> Uuid {
        match *self {
            Self::Folder(id) | Self::File(id) => id,
        }
    }
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Folder(id) => write!(f, "folder:{id}"),
            Self::File(id) => write!(f, "file:{id}"),
        }
    }
}

/// A role held by a single user on a folder or file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRole {
    /// Unique grant identifier.
    pub id: Uuid,
    /// The granted role.
    pub role: Role,
    /// The user holding the role.
    pub user_id: Uuid,
    /// Target folder (mutually exclusive with `file_id`).
    pub folder_id: Option<Uuid>,
    /// Target file (mutually exclusive with `folder_id`).
    pub file_id: Option<Uuid>,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
}

impl UserRole {
    /// The resource this grant targets.
    pub fn resource(&self) -> AppResult<ResourceRef> {
        ResourceRef::from_columns(self.folder_id, self.file_id)
    }
}

/// A role held by a group on a folder or file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupRole {
    /// Unique grant identifier.
    pub id: Uuid,
    /// The granted role.
    pub role: Role,
    /// The group holding the role.
    pub group_id: Uuid,
    /// Target folder (mutually exclusive with `file_id`).
    pub folder_id: Option<Uuid>,
    /// Target file (mutually exclusive with `folder_id`).
    pub file_id: Option<Uuid>,
    /// When the grant was created.
    pub created_at: DateTime<Utc>,
}

impl GroupRole {
    /// The resource this grant targets.
    pub fn resource(&self) -> AppResult<ResourceRef> {
        ResourceRef::from_columns(self.folder_id, self.file_id)
    }
}

/// The grant that satisfied an access check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "principal", rename_all = "lowercase")]
pub enum Grant {
    /// Held directly by the user.
    User(UserRole),
    /// Held by a group the user belongs to.
    Group(GroupRole),
}

impl Grant {
    /// The role carried by the grant.
    pub fn role(&self) -> Role {
        match self {
            Self::User(g) => g.role,
            Self::Group(g) => g.role,
        }
    }

    /// The grant row id.
    pub fn id(&self) -> Uuid {
        match self {
            Self::User(g) => g.id,
            Self::Group(g) => g.id,
        }
    }

    /// Whether the grant is held directly by the user.
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// Data required to grant a role to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRole {
    /// The role to grant.
    pub role: Role,
    /// The receiving user.
    pub user_id: Uuid,
    /// The target resource.
    pub resource: ResourceRef,
}

/// Data required to grant a role to a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRole {
    /// The role to grant.
    pub role: Role,
    /// The receiving group.
    pub group_id: Uuid,
    /// The target resource.
    pub resource: ResourceRef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_ref_requires_exactly_one() {
        let id = Uuid::new_v4();
        assert_eq!(
            ResourceRef::from_columns(Some(id), None).unwrap(),
            ResourceRef::Folder(id)
        );
        assert_eq!(
            ResourceRef::from_columns(None, Some(id)).unwrap(),
            ResourceRef::File(id)
        );
        assert!(ResourceRef::from_columns(None, None).is_err());
        assert!(ResourceRef::from_columns(Some(id), Some(id)).is_err());
    }

    #[test]
    fn test_columns_round_trip() {
        let id = Uuid::new_v4();
        assert_eq!(ResourceRef::File(id).columns(), (None, Some(id)));
    }
}
