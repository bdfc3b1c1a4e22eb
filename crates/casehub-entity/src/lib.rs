//! # casehub-entity
//!
//! Domain entity models for CaseHub. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod file;
pub mod folder;
pub mod job;
pub mod role;
pub mod user;
pub mod workflow;
