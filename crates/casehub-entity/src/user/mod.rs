//! User and group principals.

pub mod group;
pub mod model;

pub use group::{CreateGroup, Group};
pub use model::{CreateUser, User};
