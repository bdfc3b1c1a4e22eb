//! Workflow, task and template entities.

pub mod model;
pub mod status;
pub mod task;
pub mod template;

pub use model::{CreateWorkflow, Workflow};
pub use status::WorkflowStatus;
pub use task::{CreateTask, Task, TaskStatus};
pub use template::{CreateWorkflowTemplate, WorkflowTemplate};
