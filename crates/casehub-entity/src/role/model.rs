//! Role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Permission levels a principal can hold on a folder or file.
///
/// `Owner > Editor > Viewer` in privilege, but access checks compare by
/// set membership against an allowed list. `NoAccess` is a revocation
/// marker: a direct `NoAccess` grant on a folder stops inheritance from
/// everything above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "role", rename_all = "snake_case")]
pub enum Role {
    /// Full control, including sharing.
    Owner,
    /// Read and write, including sharing.
    Editor,
    /// Read-only.
    Viewer,
    /// Explicit revocation of inherited access.
    #[serde(rename = "No Access")]
    NoAccess,
}

impl Role {
    /// Every declared role, in privilege order.
    pub const ALL: [Role; 4] = [Self::Owner, Self::Editor, Self::Viewer, Self::NoAccess];

    /// Roles that may read a resource.
    pub const READERS: [Role; 3] = [Self::Viewer, Self::Editor, Self::Owner];

    /// Roles that may modify a resource or share it.
    pub const WRITERS: [Role; 2] = [Self::Editor, Self::Owner];

    /// Return the display value of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "Owner",
            Self::Editor => "Editor",
            Self::Viewer => "Viewer",
            Self::NoAccess => "No Access",
        }
    }

    /// Whether this grant revokes inherited access.
    pub fn is_revocation(&self) -> bool {
        matches!(self, Self::NoAccess)
    }

    fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|r| format!("'{}'", r.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = casehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                casehub_core::AppError::validation(format!(
                    "Invalid role: '{s}'. Valid values are: {}",
                    Self::valid_values()
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("Owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!("viewer".parse::<Role>().unwrap(), Role::Viewer);
        assert_eq!("No Access".parse::<Role>().unwrap(), Role::NoAccess);
    }

    #[test]
    fn test_invalid_role_lists_valid_values() {
        let err = "Admin".parse::<Role>().unwrap_err();
        assert_eq!(err.kind, casehub_core::error::ErrorKind::Validation);
        assert!(err.message.contains("'Owner', 'Editor', 'Viewer', 'No Access'"));
    }

    #[test]
    fn test_serde_uses_display_values() {
        let json = serde_json::to_string(&Role::NoAccess).unwrap();
        assert_eq!(json, "\"No Access\"");
        let role: Role = serde_json::from_str("\"Editor\"").unwrap();
        assert_eq!(role, Role::Editor);
    }

    #[test]
    fn test_role_sets() {
        assert!(Role::READERS.contains(&Role::Viewer));
        assert!(!Role::WRITERS.contains(&Role::Viewer));
        assert!(!Role::READERS.contains(&Role::NoAccess));
        assert!(Role::NoAccess.is_revocation());
    }
}
