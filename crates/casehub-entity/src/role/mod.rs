//! Role vocabulary and the grants that bind a role to a principal and a
//! resource.

pub mod grant;
pub mod model;

pub use grant::{CreateGroupRole, CreateUserRole, Grant, GroupRole, ResourceRef, UserRole};
pub use model::Role;
