//! Folder creation for workflow results.

pub mod service;

pub use service::FolderService;
