//! Folder and file access control with inheritance through folder ancestry.

pub mod guard;
pub mod resolver;

pub use guard::{AccessDecision, AccessGuard, AccessTarget};
pub use resolver::{AccessResolver, Resource};
