#![deny(missing_docs)]
//! Simplified invocation facade over the overseer runtime.
//!
//! A [`Bridge`] translates a minimal `(agent, tool, arguments, options)`
//! call into a fully-formed request with a freshly generated task ID, then
//! submits it to the runtime. [`Bridge::invoke_batch`] fires N invocations
//! concurrently — unbounded at this layer, bounded by the runtime's own
//! admission semaphore — and collects results preserving input order.
//!
//! Front-ends own argument parsing, authentication, and transport; the
//! bridge assumes already-authenticated, already-parsed input.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use overseer_contract::{
    AgentId, DurationMs, ExecError, ExecResult, Request, RunId, Status, TaskId, TenantId, codes,
};
use overseer_runtime::Runtime;

/// Identity configuration for a bridge: which tenant and run the requests
/// it builds belong to.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// The tenant stamped on every built request.
    pub tenant_id: TenantId,
    /// The default run; override per call with
    /// [`InvokeOptions::with_run_id`].
    pub run_id: RunId,
}

/// The simplified entry point for invoking agents from CLI, API, or tests.
#[derive(Clone)]
pub struct Bridge {
    runtime: Arc<Runtime>,
    config: BridgeConfig,
}

impl Bridge {
    /// Create a bridge over a runtime.
    pub fn new(runtime: Arc<Runtime>, config: BridgeConfig) -> Self {
        Self { runtime, config }
    }

    /// Execute an agent with the given tool and arguments.
    ///
    /// Builds a request with a fresh UUID task ID and submits it to the
    /// runtime; the outcome — success or any pipeline rejection — is the
    /// returned terminal result.
    pub async fn invoke(
        &self,
        cancel: &CancellationToken,
        agent_id: impl Into<AgentId>,
        tool: impl Into<String>,
        arguments: Option<serde_json::Value>,
        options: InvokeOptions,
    ) -> ExecResult {
        let req = self.build_request(agent_id.into(), tool.into(), arguments, options);
        self.runtime.execute(cancel, req).await
    }

    /// Execute multiple invocations concurrently, one spawned task per
    /// request, and collect results in input order (not completion order).
    pub async fn invoke_batch(
        &self,
        cancel: &CancellationToken,
        requests: Vec<BatchRequest>,
    ) -> Vec<ExecResult> {
        let mut handles = Vec::with_capacity(requests.len());
        for batch_req in requests {
            let req = self.build_request(
                batch_req.agent_id,
                batch_req.tool,
                batch_req.arguments,
                batch_req.options,
            );
            let task_id = req.task_id.clone();
            let runtime = Arc::clone(&self.runtime);
            let cancel = cancel.clone();
            handles.push((
                task_id,
                tokio::spawn(async move { runtime.execute(&cancel, req).await }),
            ));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (task_id, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(err) => results.push(ExecResult::failure(
                    task_id,
                    Status::Error,
                    ExecError::new(codes::HANDLER_ERROR, format!("batch task failed: {err}"), false),
                )),
            }
        }
        results
    }

    fn build_request(
        &self,
        agent_id: AgentId,
        tool: String,
        arguments: Option<serde_json::Value>,
        options: InvokeOptions,
    ) -> Request {
        let task_id = TaskId::new(Uuid::new_v4().to_string());
        let run_id = options.run_id.unwrap_or_else(|| self.config.run_id.clone());

        let mut req = Request::new(run_id, task_id, agent_id, self.config.tenant_id.clone(), tool);
        if let Some(arguments) = arguments {
            req = req.with_arguments(arguments);
        }
        if let Some((parent, depth)) = options.parent {
            req = req.with_parent(parent, depth);
        }
        if !options.permissions.is_empty() {
            req = req.with_permissions(options.permissions);
        }
        if let Some(timeout) = options.timeout {
            req = req.with_timeout(timeout);
        }
        if !options.metadata.is_empty() {
            req = req.with_metadata(options.metadata);
        }
        req
    }
}

/// Per-invocation configuration.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    run_id: Option<RunId>,
    parent: Option<(TaskId, usize)>,
    permissions: Vec<String>,
    timeout: Option<Duration>,
    metadata: HashMap<String, String>,
}

impl InvokeOptions {
    /// Start from the bridge defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the bridge's default run ID.
    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<RunId>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    /// Set the parent task and spawn depth for spawn tracking.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<TaskId>, depth: usize) -> Self {
        self.parent = Some((parent.into(), depth));
        self
    }

    /// Grant permissions to the invocation.
    #[must_use]
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }

    /// Set a per-call timeout override.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach opaque metadata to the request.
    #[must_use]
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }
}

/// One request in a batch invocation.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    /// Which agent to invoke.
    pub agent_id: AgentId,
    /// The tool to invoke.
    pub tool: String,
    /// Opaque tool arguments.
    pub arguments: Option<serde_json::Value>,
    /// Per-invocation options.
    pub options: InvokeOptions,
}

impl BatchRequest {
    /// A batch entry with default options.
    pub fn new(agent_id: impl Into<AgentId>, tool: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            tool: tool.into(),
            arguments: None,
            options: InvokeOptions::default(),
        }
    }

    /// Attach tool arguments.
    #[must_use]
    pub fn with_arguments(mut self, arguments: serde_json::Value) -> Self {
        self.arguments = Some(arguments);
        self
    }

    /// Set per-invocation options.
    #[must_use]
    pub fn with_options(mut self, options: InvokeOptions) -> Self {
        self.options = options;
        self
    }
}

/// A minimal printable projection of a result, for CLI output.
#[derive(Debug, Clone, Serialize)]
pub struct CliResult {
    /// Lowercase status name.
    pub status: String,
    /// Execution output, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Formatted error, `[CODE] message`, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable wall-clock duration.
    pub duration: String,
    /// Retries performed.
    #[serde(skip_serializing_if = "is_zero")]
    pub retries: usize,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

impl From<&ExecResult> for CliResult {
    fn from(result: &ExecResult) -> Self {
        Self {
            status: result.status.to_string(),
            output: result.output.clone(),
            error: result
                .error
                .as_ref()
                .map(|e| format!("[{}] {}", e.code, e.message)),
            duration: format_duration(result.metrics.duration),
            retries: result.metrics.retry_count,
        }
    }
}

fn format_duration(duration: DurationMs) -> String {
    format!("{:?}", duration.to_std())
}
