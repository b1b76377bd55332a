//! Execution status of a task.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The outcome status of an agent execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Queued but not yet admitted.
    Pending,
    /// Currently executing.
    Running,
    /// Completed successfully.
    Success,
    /// Completed with a domain-level failure.
    Failure,
    /// Completed with an internal or handler error.
    Error,
    /// Aborted because the execution deadline elapsed.
    Timeout,
    /// Aborted because the caller canceled.
    Canceled,
}

impl Status {
    /// True exactly for the final states: success, failure, error, timeout,
    /// and canceled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Status::Success | Status::Failure | Status::Error | Status::Timeout | Status::Canceled
        )
    }

    /// The lowercase wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Success => "success",
            Status::Failure => "failure",
            Status::Error => "error",
            Status::Timeout => "timeout",
            Status::Canceled => "canceled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
