//! Submission interface to the distributed task runtime.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use casehub_core::config::worker::WorkerConfig;
use casehub_core::{AppError, AppResult};
use casehub_database::store::JobStore;
use casehub_workflow::Canvas;

use crate::memory::MemoryRuntime;
use crate::queue::QueueRuntime;

/// Who submitted a graph, and for which workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitContext {
    /// Workflow the graph was compiled for.
    pub workflow_id: Uuid,
    /// User running the workflow.
    pub user_id: Uuid,
}

/// Acknowledgement of an accepted graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Runtime-assigned id for the submitted graph.
    pub id: Uuid,
    /// Queue of the graph's entry unit.
    pub queue: String,
}

/// Accepts compiled graphs for execution.
///
/// Submission is fire-and-forget: once `submit` returns, progress is
/// reported through the task rows, not through this interface.
#[async_trait]
pub trait TaskRuntime: Send + Sync + fmt::Debug + 'static {
    /// Backend name, for logging.
    fn name(&self) -> &str;

    /// Hand `canvas` to the runtime.
    async fn submit(&self, canvas: &Canvas, ctx: SubmitContext) -> AppResult<Submission>;
}

/// Build the runtime named by `config.runtime`.
pub fn from_config(config: &WorkerConfig, jobs: Arc<dyn JobStore>) -> AppResult<Arc<dyn TaskRuntime>> {
    let runtime: Arc<dyn TaskRuntime> = match config.runtime.as_str() {
        "queue" => Arc::new(QueueRuntime::new(
            jobs,
            config.default_queue.clone(),
            config.priority,
        )),
        "memory" => Arc::new(MemoryRuntime::new(config.default_queue.clone())),
        other => {
            return Err(AppError::configuration(format!(
                "Unknown worker runtime: '{other}'. Expected one of: queue, memory"
            )));
        }
    };
    info!(runtime = runtime.name(), default_queue = %config.default_queue, "Task runtime ready");
    Ok(runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use casehub_core::error::ErrorKind;
    use casehub_database::store::MemoryStore;

    #[test]
    fn test_from_config_selects_backend() {
        let jobs: Arc<dyn JobStore> = Arc::new(MemoryStore::new());
        let mut config = WorkerConfig::default();
        assert_eq!(from_config(&config, jobs.clone()).unwrap().name(), "queue");

        config.runtime = "memory".to_string();
        assert_eq!(from_config(&config, jobs.clone()).unwrap().name(), "memory");

        config.runtime = "celery".to_string();
        let err = from_config(&config, jobs).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
