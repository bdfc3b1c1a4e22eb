//! Workflow status, derived from task rows rather than stored.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::task::{Task, TaskStatus};

/// Aggregate status of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkflowStatus {
    /// Nothing has started yet.
    Pending,
    /// At least one task is being handled by a worker.
    Running,
    /// Every task succeeded.
    Complete,
    /// At least one task failed.
    Failure,
}

impl WorkflowStatus {
    /// Aggregate the statuses of a workflow's tasks.
    pub fn from_statuses(statuses: impl IntoIterator<Item = TaskStatus>) -> Self {
        let mut seen_any = false;
        let mut all_success = true;
        let mut any_started = false;

        for status in statuses {
            seen_any = true;
            match status {
                TaskStatus::Failure => return Self::Failure,
                TaskStatus::Success => any_started = true,
                s if s.is_active() => {
                    any_started = true;
                    all_success = false;
                }
                _ => all_success = false,
            }
        }

        if !seen_any {
            Self::Pending
        } else if all_success {
            Self::Complete
        } else if any_started {
            Self::Running
        } else {
            Self::Pending
        }
    }

    /// Aggregate directly over task rows.
    pub fn from_tasks(tasks: &[Task]) -> Self {
        Self::from_statuses(tasks.iter().map(|t| t.status))
    }

    /// Return the status as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Complete => "COMPLETE",
            Self::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TaskStatus::*;

    #[test]
    fn test_no_tasks_is_pending() {
        assert_eq!(WorkflowStatus::from_statuses([]), WorkflowStatus::Pending);
    }

    #[test]
    fn test_any_failure_wins() {
        assert_eq!(
            WorkflowStatus::from_statuses([Success, Failure, Started]),
            WorkflowStatus::Failure
        );
    }

    #[test]
    fn test_all_success_is_complete() {
        assert_eq!(
            WorkflowStatus::from_statuses([Success, Success]),
            WorkflowStatus::Complete
        );
    }

    #[test]
    fn test_partial_progress_is_running() {
        assert_eq!(
            WorkflowStatus::from_statuses([Success, Pending]),
            WorkflowStatus::Running
        );
        assert_eq!(
            WorkflowStatus::from_statuses([Pending, Progress]),
            WorkflowStatus::Running
        );
    }

    #[test]
    fn test_only_pending_is_pending() {
        assert_eq!(
            WorkflowStatus::from_statuses([Pending, Pending]),
            WorkflowStatus::Pending
        );
    }
}
