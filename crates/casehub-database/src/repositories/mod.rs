//! PostgreSQL repository implementations for all CaseHub entities.

pub mod file;
pub mod folder;
pub mod job;
pub mod role;
pub mod task;
pub mod template;
pub mod user;
pub mod workflow;

pub use file::FileRepository;
pub use folder::FolderRepository;
pub use job::JobRepository;
pub use role::RoleRepository;
pub use task::TaskRepository;
pub use template::TemplateRepository;
pub use user::UserRepository;
pub use workflow::WorkflowRepository;
