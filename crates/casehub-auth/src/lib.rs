//! # casehub-auth
//!
//! Authorization and authentication for CaseHub.
//!
//! ## Modules
//!
//! - `acl` — access resolution over folder ancestry and group membership,
//!   and the guard that gates operations on it
//! - `jwt` — bearer token validation

pub mod acl;
pub mod jwt;

pub use acl::{AccessDecision, AccessGuard, AccessResolver, AccessTarget, Resource};
pub use jwt::{Claims, JwtDecoder};
