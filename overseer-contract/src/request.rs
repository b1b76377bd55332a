//! The typed input to an agent execution.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::duration::DurationMs;
use crate::error::ValidationError;
use crate::id::{AgentId, RunId, TaskId, TenantId};

/// One unit of invocation.
///
/// A request is built per call and discarded after execution returns. The
/// `run_id` groups related invocations; `task_id` uniquely identifies this
/// call; `parent_task_id` plus `depth` form the spawn tree that the
/// runtime's guards bound.
///
/// `arguments` is an opaque structured payload — being a
/// [`serde_json::Value`], it is syntactically well-formed by construction,
/// and an absent payload is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// The top-level run this request belongs to.
    pub run_id: RunId,

    /// Unique identifier for this specific task.
    pub task_id: TaskId,

    /// Which agent should handle this request.
    pub agent_id: AgentId,

    /// The task that spawned this one (`None` for root tasks).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_task_id: Option<TaskId>,

    /// Current spawn depth (0 = root).
    #[serde(default)]
    pub depth: usize,

    /// The owning tenant.
    pub tenant_id: TenantId,

    /// The tool to invoke.
    pub tool: String,

    /// Opaque tool arguments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,

    /// The set of permissions granted to this invocation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,

    /// Per-request timeout override. Clamped by the runtime ceiling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<DurationMs>,

    /// Opaque caller metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl Request {
    /// Create a request with the required fields.
    pub fn new(
        run_id: impl Into<RunId>,
        task_id: impl Into<TaskId>,
        agent_id: impl Into<AgentId>,
        tenant_id: impl Into<TenantId>,
        tool: impl Into<String>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            task_id: task_id.into(),
            agent_id: agent_id.into(),
            parent_task_id: None,
            depth: 0,
            tenant_id: tenant_id.into(),
            tool: tool.into(),
            arguments: None,
            permissions: Vec::new(),
            timeout: None,
            metadata: HashMap::new(),
        }
    }

    /// Attach tool arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: serde_json::Value) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Mark this request as spawned by `parent` at the given depth.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<TaskId>, depth: usize) -> Self {
        self.parent_task_id = Some(parent.into());
        self.depth = depth;
        self
    }

    /// Grant permissions to this invocation.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Override the execution timeout for this request.
    #[must_use]
    pub fn with_timeout(mut self, timeout: impl Into<DurationMs>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Attach opaque caller metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Check that the request is well-formed: run, task, agent, tenant, and
    /// tool must all be non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.run_id.is_empty() {
            return Err(ValidationError::RequestField("run_id"));
        }
        if self.task_id.is_empty() {
            return Err(ValidationError::RequestField("task_id"));
        }
        if self.agent_id.is_empty() {
            return Err(ValidationError::RequestField("agent_id"));
        }
        if self.tenant_id.is_empty() {
            return Err(ValidationError::RequestField("tenant_id"));
        }
        if self.tool.is_empty() {
            return Err(ValidationError::RequestField("tool"));
        }
        Ok(())
    }
}
