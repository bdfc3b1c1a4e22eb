//! HTTP request handlers organized by domain.

pub mod file;
pub mod health;
pub mod permission;
pub mod template;
pub mod workflow;
