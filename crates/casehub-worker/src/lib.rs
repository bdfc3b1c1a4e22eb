//! Task runtime for compiled workflow graphs.
//!
//! This crate provides:
//! - The [`TaskRuntime`] submission interface
//! - A queue runtime that persists each graph as a pending job row for
//!   external workers
//! - An in-memory runtime that records submissions

pub mod memory;
pub mod queue;
pub mod runtime;

pub use memory::MemoryRuntime;
pub use queue::QueueRuntime;
pub use runtime::{SubmitContext, Submission, TaskRuntime, from_config};
