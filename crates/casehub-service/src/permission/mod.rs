//! Folder sharing and grant management.

pub mod service;

pub use service::{PermissionService, ShareFolderRequest, ShareResult};
