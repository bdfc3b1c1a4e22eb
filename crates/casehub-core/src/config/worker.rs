//! Task runtime configuration.

use serde::{Deserialize, Serialize};

/// Distributed task runtime configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Runtime backend: `"queue"` (jobs table) or `"memory"`.
    #[serde(default = "default_runtime")]
    pub runtime: String,
    /// Queue used for units whose spec node carries no `queue_name`.
    #[serde(default = "default_queue")]
    pub default_queue: String,
    /// Priority stamped on submitted jobs.
    #[serde(default)]
    pub priority: i32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            runtime: default_runtime(),
            default_queue: default_queue(),
            priority: 0,
        }
    }
}

fn default_runtime() -> String {
    "queue".to_string()
}

fn default_queue() -> String {
    "default".to_string()
}
