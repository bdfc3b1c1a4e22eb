//! # casehub-database
//!
//! Persistence for CaseHub: the store traits the rest of the workspace
//! programs against, PostgreSQL repositories implementing them, and an
//! in-memory store used by tests and single-process deployments.

pub mod connection;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::Stores;
