//! Workflow lifecycle and templates.

pub mod service;
pub mod template;

pub use service::{CreateWorkflowRequest, RunOutcome, RunWorkflowRequest, WorkflowService, WorkflowView};
pub use template::{CreateTemplateRequest, TemplateService};
