//! # casehub-api
//!
//! HTTP API layer for CaseHub built on Axum.
//!
//! Provides the REST endpoints for folder sharing, file metadata,
//! workflows and templates, plus middleware (CORS, logging), the
//! bearer-token extractor, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use state::AppState;
