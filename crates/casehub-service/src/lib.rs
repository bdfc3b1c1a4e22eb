//! # casehub-service
//!
//! Business logic service layer for CaseHub. Each service orchestrates
//! stores, the access guard, the signature compiler and the task runtime
//! to implement application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod folder;
pub mod permission;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use file::FileService;
pub use folder::FolderService;
pub use permission::PermissionService;
pub use workflow::{TemplateService, WorkflowService};
