//! Queue-table runtime: each submitted graph becomes a pending job row.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use casehub_core::AppResult;
use casehub_database::store::JobStore;
use casehub_entity::job::CreateJob;
use casehub_workflow::Canvas;

use crate::runtime::{SubmitContext, Submission, TaskRuntime};

/// Job type stamped on workflow graph submissions.
pub const WORKFLOW_JOB_TYPE: &str = "workflow.run";

/// Persists graphs to the jobs table for external workers to claim.
#[derive(Debug, Clone)]
pub struct QueueRuntime {
    /// Job persistence.
    jobs: Arc<dyn JobStore>,
    /// Queue for units without a routing key.
    default_queue: String,
    /// Priority stamped on every job.
    priority: i32,
}

impl QueueRuntime {
    /// Create a new queue runtime.
    pub fn new(jobs: Arc<dyn JobStore>, default_queue: String, priority: i32) -> Self {
        Self {
            jobs,
            default_queue,
            priority,
        }
    }
}

#[async_trait]
impl TaskRuntime for QueueRuntime {
    fn name(&self) -> &str {
        "queue"
    }

    async fn submit(&self, canvas: &Canvas, ctx: SubmitContext) -> AppResult<Submission> {
        let routed = canvas.clone().with_default_queue(&self.default_queue);
        let queue = routed
            .entry_queue()
            .unwrap_or(&self.default_queue)
            .to_string();
        let units = routed.signatures().len();

        let job = self
            .jobs
            .create_job(&CreateJob {
                job_type: WORKFLOW_JOB_TYPE.to_string(),
                queue: queue.clone(),
                priority: self.priority,
                payload: serde_json::to_value(&routed)?,
                workflow_id: Some(ctx.workflow_id),
                created_by: Some(ctx.user_id),
            })
            .await?;

        info!(
            job_id = %job.id,
            workflow_id = %ctx.workflow_id,
            queue = %queue,
            units,
            "Enqueued workflow graph"
        );

        Ok(Submission { id: job.id, queue })
    }
}
