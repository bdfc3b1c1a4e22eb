//! Guarded file metadata access.

pub mod service;

pub use service::FileService;
