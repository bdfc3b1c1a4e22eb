//! Queued task-graph submissions.

pub mod model;
pub mod status;

pub use model::{CreateJob, Job};
pub use status::JobStatus;
