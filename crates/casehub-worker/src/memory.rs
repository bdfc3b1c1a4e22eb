//! In-process runtime that records submitted graphs.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

use casehub_core::AppResult;
use casehub_workflow::Canvas;

use crate::runtime::{SubmitContext, Submission, TaskRuntime};

/// Records every submitted graph per workflow instead of executing it.
#[derive(Debug)]
pub struct MemoryRuntime {
    default_queue: String,
    submitted: DashMap<Uuid, Vec<Canvas>>,
}

impl MemoryRuntime {
    /// Create an empty runtime.
    pub fn new(default_queue: impl Into<String>) -> Self {
        Self {
            default_queue: default_queue.into(),
            submitted: DashMap::new(),
        }
    }

    /// Graphs submitted for `workflow_id`, oldest first.
    pub fn submitted(&self, workflow_id: Uuid) -> Vec<Canvas> {
        self.submitted
            .get(&workflow_id)
            .map(|graphs| graphs.clone())
            .unwrap_or_default()
    }

    /// Total number of graphs submitted.
    pub fn len(&self) -> usize {
        self.submitted.iter().map(|entry| entry.value().len()).sum()
    }

    /// Whether nothing has been submitted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TaskRuntime for MemoryRuntime {
    fn name(&self) -> &str {
        "memory"
    }

    async fn submit(&self, canvas: &Canvas, ctx: SubmitContext) -> AppResult<Submission> {
        let routed = canvas.clone().with_default_queue(&self.default_queue);
        let queue = routed
            .entry_queue()
            .unwrap_or(&self.default_queue)
            .to_string();
        self.submitted
            .entry(ctx.workflow_id)
            .or_default()
            .push(routed);

        info!(workflow_id = %ctx.workflow_id, queue = %queue, "Recorded workflow graph");
        Ok(Submission {
            id: Uuid::new_v4(),
            queue,
        })
    }
}
