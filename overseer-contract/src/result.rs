//! The typed output of an agent execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::DurationMs;
use crate::error::ExecError;
use crate::id::TaskId;
use crate::status::Status;

/// The terminal outcome of one execution.
///
/// Produced exactly once per execute call and never mutated afterward. A
/// non-success outcome carries an [`ExecError`] describing what happened;
/// metrics are populated by the runtime regardless of outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecResult {
    /// Matches the request's task ID.
    pub task_id: TaskId,

    /// The execution outcome.
    pub status: Status,

    /// Structured execution output, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,

    /// Error details if `status` is not success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ExecError>,

    /// Timing and retry data for this execution.
    pub metrics: ExecMetrics,
}

impl ExecResult {
    /// A successful result with optional output.
    pub fn success(task_id: impl Into<TaskId>, output: Option<serde_json::Value>) -> Self {
        Self {
            task_id: task_id.into(),
            status: Status::Success,
            output,
            error: None,
            metrics: ExecMetrics::default(),
        }
    }

    /// A terminal non-success result carrying an error.
    pub fn failure(task_id: impl Into<TaskId>, status: Status, error: ExecError) -> Self {
        Self {
            task_id: task_id.into(),
            status,
            output: None,
            error: Some(error),
            metrics: ExecMetrics::default(),
        }
    }
}

/// Timing and cost data for an execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecMetrics {
    /// When execution began.
    pub started_at: DateTime<Utc>,

    /// When execution finished.
    pub completed_at: DateTime<Utc>,

    /// Wall-clock execution time.
    pub duration: DurationMs,

    /// Number of retries performed (attempts beyond the first).
    #[serde(default)]
    pub retry_count: usize,

    /// Estimated cost in USD, when a handler reports one.
    #[serde(default, skip_serializing_if = "cost_is_zero")]
    pub cost_usd: f64,
}

fn cost_is_zero(cost: &f64) -> bool {
    *cost == 0.0
}

impl Default for ExecMetrics {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            completed_at: now,
            duration: DurationMs::ZERO,
            retry_count: 0,
            cost_usd: 0.0,
        }
    }
}
