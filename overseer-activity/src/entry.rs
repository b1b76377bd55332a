//! Activity entries and their deterministic identifiers.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use overseer_contract::{AgentId, DurationMs, RunId, Status, TaskId, TenantId};

/// Classifies activity log entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    /// A request entered the pipeline.
    #[serde(rename = "request.received")]
    RequestReceived,
    /// Request validation passed. Reserved for collaborators that record
    /// validation explicitly; the runtime folds it into `request.received`.
    #[serde(rename = "validation.passed")]
    ValidationPassed,
    /// Request validation failed.
    #[serde(rename = "validation.failed")]
    ValidationFailed,
    /// The handler was invoked for the first attempt.
    #[serde(rename = "execution.started")]
    ExecStarted,
    /// Execution completed successfully.
    #[serde(rename = "execution.completed")]
    ExecCompleted,
    /// Execution ended in a terminal failure.
    #[serde(rename = "execution.failed")]
    ExecFailed,
    /// Execution exceeded its deadline.
    #[serde(rename = "execution.timeout")]
    ExecTimeout,
    /// A retry attempt is about to run.
    #[serde(rename = "execution.retry")]
    ExecRetry,
    /// A pre-admission guard rejected the request.
    #[serde(rename = "guard.triggered")]
    GuardTriggered,
    /// A spawn was blocked by the fan-out guard.
    #[serde(rename = "spawn.blocked")]
    SpawnBlocked,
    /// A child task was spawned. Reserved for spawn-tracking collaborators.
    #[serde(rename = "spawn.created")]
    SpawnCreated,
}

impl ActivityKind {
    /// The dotted wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::RequestReceived => "request.received",
            ActivityKind::ValidationPassed => "validation.passed",
            ActivityKind::ValidationFailed => "validation.failed",
            ActivityKind::ExecStarted => "execution.started",
            ActivityKind::ExecCompleted => "execution.completed",
            ActivityKind::ExecFailed => "execution.failed",
            ActivityKind::ExecTimeout => "execution.timeout",
            ActivityKind::ExecRetry => "execution.retry",
            ActivityKind::GuardTriggered => "guard.triggered",
            ActivityKind::SpawnBlocked => "spawn.blocked",
            ActivityKind::SpawnCreated => "spawn.created",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structured log entry for agent execution.
///
/// Every field is typed — no unstructured console noise. Entries are owned
/// exclusively by the [`ActivityLog`] once recorded.
///
/// [`ActivityLog`]: crate::ActivityLog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Deterministic identifier derived from the entry content.
    /// Assigned by the log at record time.
    #[serde(default)]
    pub id: String,

    /// UTC time the entry was created.
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,

    /// What kind of transition this entry records.
    #[serde(rename = "type")]
    pub kind: ActivityKind,

    /// The top-level run.
    pub run_id: RunId,

    /// The specific task.
    pub task_id: TaskId,

    /// The agent that produced this entry.
    pub agent_id: AgentId,

    /// The owning tenant, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,

    /// The execution status at this transition, if applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,

    /// Elapsed time, if applicable.
    #[serde(default, rename = "duration_ms", skip_serializing_if = "Option::is_none")]
    pub duration: Option<DurationMs>,

    /// Short human-readable description.
    #[serde(default, rename = "msg", skip_serializing_if = "String::is_empty")]
    pub message: String,

    /// Machine-readable error code, if applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    /// Additional structured data.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
}

impl ActivityEntry {
    /// Create an entry for the given transition, timestamped now.
    pub fn new(
        kind: ActivityKind,
        run_id: impl Into<RunId>,
        task_id: impl Into<TaskId>,
        agent_id: impl Into<AgentId>,
    ) -> Self {
        Self {
            id: String::new(),
            timestamp: Utc::now(),
            kind,
            run_id: run_id.into(),
            task_id: task_id.into(),
            agent_id: agent_id.into(),
            tenant_id: None,
            status: None,
            duration: None,
            message: String::new(),
            error_code: None,
            fields: HashMap::new(),
        }
    }

    /// Override the creation timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Tag the owning tenant.
    #[must_use]
    pub fn with_tenant(mut self, tenant_id: impl Into<TenantId>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Record the execution status at this transition.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Record the elapsed time at this transition.
    #[must_use]
    pub fn with_duration(mut self, duration: impl Into<DurationMs>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Attach a short human-readable description.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a machine-readable error code.
    #[must_use]
    pub fn with_error_code(mut self, code: impl Into<String>) -> Self {
        self.error_code = Some(code.into());
        self
    }

    /// Attach one structured key/value field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Compute the deterministic ID for an entry: a truncated SHA-256 of
/// `(timestamp, kind, run, task, agent)`, rendered as 16 hex characters.
///
/// Useful for correlation and dedup across tailing consumers. Not a
/// uniqueness guarantee: two distinct entries agreeing on all five inputs
/// within the same nanosecond are indistinguishable by ID. Consumers that
/// need a total order should use the log's append order.
pub(crate) fn deterministic_id(
    timestamp: DateTime<Utc>,
    kind: ActivityKind,
    run_id: &RunId,
    task_id: &TaskId,
    agent_id: &AgentId,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!(
        "{}|{}|{}|{}|{}",
        timestamp.timestamp_nanos_opt().unwrap_or_default(),
        kind,
        run_id,
        task_id,
        agent_id,
    ));
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}
