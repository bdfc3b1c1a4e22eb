//! Lifecycle of a submitted graph in the jobs table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a submitted graph sits between enqueue and worker hand-off.
///
/// CaseHub only ever writes `Pending`; workers move rows forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    /// A worker took the row and is dispatching the graph.
    Claimed,
    /// The graph was handed to the broker.
    Dispatched,
    /// Dispatch failed; the worker recorded the error on the row.
    Rejected,
}

impl JobStatus {
    /// Whether a worker may still claim the row.
    pub fn is_claimable(self) -> bool {
        self == Self::Pending
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Claimed => "claimed",
            Self::Dispatched => "dispatched",
            Self::Rejected => "rejected",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_is_claimable() {
        assert!(JobStatus::Pending.is_claimable());
        assert!(!JobStatus::Claimed.is_claimable());
        assert!(!JobStatus::Dispatched.is_claimable());
        assert!(!JobStatus::Rejected.is_claimable());
    }

    #[test]
    fn test_wire_names_match_display() {
        for status in [JobStatus::Pending, JobStatus::Claimed, JobStatus::Rejected] {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.to_string());
        }
    }
}
