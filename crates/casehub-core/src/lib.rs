//! # casehub-core
//!
//! Core crate for CaseHub. Contains the unified error system, the
//! configuration schema, and the small set of collaborator traits that
//! every other crate agrees on (identifier generation).
//!
//! This crate has **no** internal dependencies on other CaseHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
