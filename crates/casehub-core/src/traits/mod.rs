//! Core traits defined in `casehub-core` and implemented by other crates.

pub mod id_generator;

pub use id_generator::{IdGenerator, SequentialIdGenerator, UuidGenerator};
