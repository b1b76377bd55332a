//! The execution pipeline.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::time::{Instant, sleep, timeout_at};
use tokio_util::sync::CancellationToken;

use overseer_activity::{ActivityEntry, ActivityKind, ActivityLog};
use overseer_contract::{
    AgentId, AgentSpec, ExecError, ExecMetrics, ExecResult, Handler, Request, Status, TaskId,
    ValidationError, codes,
};

use crate::config::{ConfigError, RuntimeConfig};

/// Exponential backoff base: `100ms * 2^(attempt-1)`.
const BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Backoff is capped here regardless of attempt count.
const BACKOFF_CAP: Duration = Duration::from_secs(10);

struct RegisteredAgent {
    spec: AgentSpec,
    handler: Arc<dyn Handler>,
}

/// The core agent execution engine.
///
/// Manages agent registration, request validation, spawn guards, admission
/// control, deadline enforcement, retry logic, and structured activity
/// logging. Holds no lock across an execute call — only short critical
/// sections — so handler bodies run in true parallel up to
/// `max_concurrency`.
///
/// A `Runtime` owns all of its state per instance: multiple independent
/// runtimes can coexist in one process without cross-contamination.
pub struct Runtime {
    config: RuntimeConfig,
    agents: RwLock<HashMap<AgentId, RegisteredAgent>>,
    activity: ActivityLog,
    semaphore: Semaphore,
    active: AtomicI64,
    total: AtomicI64,
    // Per-parent concurrent-children counters. Entries are pruned when a
    // parent's count returns to zero.
    children: Mutex<HashMap<TaskId, usize>>,
}

impl Runtime {
    /// Create a runtime with the given configuration and a default activity
    /// log (stderr sink, `max_memory_entries` capacity).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config is invalid. No request is ever
    /// accepted by a runtime with a rejected config.
    pub fn new(config: RuntimeConfig) -> Result<Self, ConfigError> {
        let activity = ActivityLog::new().with_max_entries(config.max_memory_entries);
        Self::with_activity_log(config, activity)
    }

    /// Create a runtime with a caller-configured activity log (custom sink
    /// or capacity).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config is invalid.
    pub fn with_activity_log(
        config: RuntimeConfig,
        activity: ActivityLog,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            semaphore: Semaphore::new(config.max_concurrency),
            agents: RwLock::new(HashMap::new()),
            activity,
            active: AtomicI64::new(0),
            total: AtomicI64::new(0),
            children: Mutex::new(HashMap::new()),
            config,
        })
    }

    /// Register an agent handler with its spec.
    ///
    /// A spec is immutable once registered; registering the same ID again
    /// replaces both spec and handler.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if the spec is malformed.
    pub fn register(
        &self,
        spec: AgentSpec,
        handler: Arc<dyn Handler>,
    ) -> Result<(), ValidationError> {
        spec.validate()?;
        tracing::debug!(agent = %spec.id, version = %spec.version, "overseer.agent.registered");
        let id = spec.id.clone();
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        agents.insert(id, RegisteredAgent { spec, handler });
        Ok(())
    }

    /// Remove an agent registration. Unknown IDs are ignored.
    pub fn unregister(&self, id: &AgentId) {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        agents.remove(id);
    }

    /// The spec for a registered agent, if any.
    pub fn spec_of(&self, id: &AgentId) -> Option<AgentSpec> {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        agents.get(id).map(|a| a.spec.clone())
    }

    fn handler_of(&self, id: &AgentId) -> Option<Arc<dyn Handler>> {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        agents.get(id).map(|a| Arc::clone(&a.handler))
    }

    /// Run a request through the full pipeline to a terminal result.
    ///
    /// `cancel` is the caller's cancellation scope: cancellation before
    /// admission aborts with `CONCURRENCY_WAIT_CANCELED` without invoking
    /// the handler; cancellation after admission flows into the handler's
    /// derived scope. Every domain-level failure is encoded in the returned
    /// result — this method never panics on bad input.
    pub async fn execute(&self, cancel: &CancellationToken, req: Request) -> ExecResult {
        let started_at = Utc::now();

        // 1. Validate. No handler invoked, no admission slot consumed.
        if let Err(err) = req.validate() {
            self.activity.record(
                ActivityEntry::new(
                    ActivityKind::ValidationFailed,
                    req.run_id.clone(),
                    req.task_id.clone(),
                    req.agent_id.clone(),
                )
                .with_tenant(req.tenant_id.clone())
                .with_status(Status::Error)
                .with_message(err.to_string())
                .with_error_code(codes::VALIDATION_FAILED),
            );
            return self.terminal_result(
                &req,
                started_at,
                Status::Error,
                codes::VALIDATION_FAILED,
                err.to_string(),
            );
        }

        self.activity.record(
            ActivityEntry::new(
                ActivityKind::RequestReceived,
                req.run_id.clone(),
                req.task_id.clone(),
                req.agent_id.clone(),
            )
            .with_tenant(req.tenant_id.clone())
            .with_message(format!("tool={} depth={}", req.tool, req.depth)),
        );

        // 2. Lookup.
        let Some(handler) = self.handler_of(&req.agent_id) else {
            self.activity.record(
                ActivityEntry::new(
                    ActivityKind::ExecFailed,
                    req.run_id.clone(),
                    req.task_id.clone(),
                    req.agent_id.clone(),
                )
                .with_tenant(req.tenant_id.clone())
                .with_status(Status::Failure)
                .with_message(format!("agent {} is not registered", req.agent_id))
                .with_error_code(codes::AGENT_NOT_FOUND),
            );
            return self.terminal_result(
                &req,
                started_at,
                Status::Failure,
                codes::AGENT_NOT_FOUND,
                format!("agent {} is not registered", req.agent_id),
            );
        };

        // 3. Guard: spawn depth.
        if req.depth > self.config.max_depth {
            self.activity.record(
                ActivityEntry::new(
                    ActivityKind::GuardTriggered,
                    req.run_id.clone(),
                    req.task_id.clone(),
                    req.agent_id.clone(),
                )
                .with_tenant(req.tenant_id.clone())
                .with_message(format!(
                    "depth {} exceeds max {}",
                    req.depth, self.config.max_depth
                ))
                .with_error_code(codes::MAX_DEPTH_EXCEEDED),
            );
            return self.terminal_result(
                &req,
                started_at,
                Status::Failure,
                codes::MAX_DEPTH_EXCEEDED,
                format!(
                    "spawn depth {} exceeds maximum {}",
                    req.depth, self.config.max_depth
                ),
            );
        }

        // 4. Guard: per-parent fan-out. The slot is held for the remainder
        // of the call and released on every exit path.
        let _child_slot = match req.parent_task_id.clone() {
            Some(parent) => {
                if !self.acquire_child_slot(&parent) {
                    self.activity.record(
                        ActivityEntry::new(
                            ActivityKind::SpawnBlocked,
                            req.run_id.clone(),
                            req.task_id.clone(),
                            req.agent_id.clone(),
                        )
                        .with_tenant(req.tenant_id.clone())
                        .with_message(format!("parent {parent} at child limit"))
                        .with_error_code(codes::MAX_CHILDREN_EXCEEDED),
                    );
                    return self.terminal_result(
                        &req,
                        started_at,
                        Status::Failure,
                        codes::MAX_CHILDREN_EXCEEDED,
                        "maximum child agents exceeded for parent task",
                    );
                }
                Some(ChildSlot {
                    runtime: self,
                    parent,
                })
            }
            None => None,
        };

        // 5. Admission: one of `max_concurrency` shared execution slots.
        let _permit = tokio::select! {
            permit = self.semaphore.acquire() => match permit {
                Ok(permit) => permit,
                // The semaphore is never closed; treat it like cancellation.
                Err(_) => {
                    return self.terminal_result(
                        &req,
                        started_at,
                        Status::Failure,
                        codes::CONCURRENCY_WAIT_CANCELED,
                        "execution slot pool closed",
                    );
                }
            },
            _ = cancel.cancelled() => {
                return self.terminal_result(
                    &req,
                    started_at,
                    Status::Failure,
                    codes::CONCURRENCY_WAIT_CANCELED,
                    "canceled while waiting for an execution slot",
                );
            }
        };

        self.active.fetch_add(1, Ordering::SeqCst);
        let _active = CounterGuard(&self.active);
        self.total.fetch_add(1, Ordering::SeqCst);

        // 6. Resolve the effective timeout; the ceiling always wins.
        let timeout = self.resolve_timeout(&req);
        let deadline = Instant::now() + timeout;

        // The handler's scope: fires on caller cancellation, and when this
        // call returns (so a timed-out handler's spawned work is told to
        // stop even though its future was dropped).
        let scope = cancel.child_token();
        let _scope_guard = scope.clone().drop_guard();

        // 7. Execute with retry.
        let spec = self.spec_of(&req.agent_id);
        let max_retries = spec
            .as_ref()
            .and_then(|s| s.max_retries)
            .unwrap_or(self.config.max_retries);

        self.activity.record(
            ActivityEntry::new(
                ActivityKind::ExecStarted,
                req.run_id.clone(),
                req.task_id.clone(),
                req.agent_id.clone(),
            )
            .with_tenant(req.tenant_id.clone())
            .with_message(format!(
                "tool={} retries={} timeout={:?}",
                req.tool, max_retries, timeout
            )),
        );

        let mut last_result: Option<ExecResult> = None;
        let mut last_err: Option<String> = None;
        let mut retries_used = 0;

        for attempt in 0..=max_retries {
            retries_used = attempt;

            if attempt > 0 {
                let delay = backoff_delay(attempt);
                self.activity.record(
                    ActivityEntry::new(
                        ActivityKind::ExecRetry,
                        req.run_id.clone(),
                        req.task_id.clone(),
                        req.agent_id.clone(),
                    )
                    .with_tenant(req.tenant_id.clone())
                    .with_message(format!("attempt={} delay={:?}", attempt + 1, delay))
                    .with_field("attempt", (attempt + 1).to_string()),
                );

                // Backoff is bounded by the execution deadline: if the
                // deadline elapses mid-wait, no further attempt is made.
                tokio::select! {
                    waited = timeout_at(deadline, sleep(delay)) => {
                        if waited.is_err() {
                            return self.timeout_result(&req, started_at);
                        }
                    }
                    _ = scope.cancelled() => {
                        return self.timeout_result(&req, started_at);
                    }
                }
            }

            let outcome = tokio::select! {
                outcome = timeout_at(deadline, handler.handle(scope.clone(), req.clone())) => outcome,
                _ = scope.cancelled() => {
                    return self.timeout_result(&req, started_at);
                }
            };

            let attempt_result = match outcome {
                // Deadline elapsed mid-attempt: classified as timeout,
                // never retried.
                Err(_) => return self.timeout_result(&req, started_at),
                Ok(result) => result,
            };

            match attempt_result {
                Ok(mut result) if result.status == Status::Success && result.error.is_none() => {
                    result.metrics = metrics_since(started_at, attempt);
                    self.activity.record(
                        ActivityEntry::new(
                            ActivityKind::ExecCompleted,
                            req.run_id.clone(),
                            req.task_id.clone(),
                            req.agent_id.clone(),
                        )
                        .with_tenant(req.tenant_id.clone())
                        .with_status(Status::Success)
                        .with_duration(result.metrics.duration)
                        .with_message(format!("attempt={}", attempt + 1)),
                    );
                    return result;
                }
                Ok(result) => {
                    // The handler declared the failure; it alone knows
                    // whether another attempt might succeed.
                    let retryable = result.error.as_ref().is_none_or(|e| e.retryable);
                    last_result = Some(result);
                    last_err = None;
                    if !retryable {
                        break;
                    }
                }
                Err(err) => {
                    // Raised without a result: HANDLER_ERROR, retried
                    // within the budget.
                    last_err = Some(err.to_string());
                    last_result = None;
                }
            }
        }

        // Retries exhausted (or stopped on a non-retryable failure).
        if let Some(mut result) = last_result {
            result.metrics = metrics_since(started_at, retries_used);
            let mut entry = ActivityEntry::new(
                ActivityKind::ExecFailed,
                req.run_id.clone(),
                req.task_id.clone(),
                req.agent_id.clone(),
            )
            .with_tenant(req.tenant_id.clone())
            .with_status(result.status)
            .with_duration(result.metrics.duration);
            if let Some(err) = &result.error {
                entry = entry
                    .with_error_code(err.code.clone())
                    .with_message(err.message.clone());
            }
            self.activity.record(entry);
            return result;
        }

        let message = last_err.unwrap_or_else(|| "unknown error".to_owned());
        let metrics = metrics_since(started_at, retries_used);
        self.activity.record(
            ActivityEntry::new(
                ActivityKind::ExecFailed,
                req.run_id.clone(),
                req.task_id.clone(),
                req.agent_id.clone(),
            )
            .with_tenant(req.tenant_id.clone())
            .with_status(Status::Error)
            .with_duration(metrics.duration)
            .with_error_code(codes::HANDLER_ERROR)
            .with_message(message.clone()),
        );
        let mut result = ExecResult::failure(
            req.task_id.clone(),
            Status::Error,
            ExecError::new(codes::HANDLER_ERROR, message, false),
        );
        result.metrics = metrics;
        result
    }

    /// Point-in-time runtime counters.
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            active_executions: self.active.load(Ordering::SeqCst),
            total_executions: self.total.load(Ordering::SeqCst),
            max_concurrency: self.config.max_concurrency,
            activity_log_size: self.activity.len(),
        }
    }

    /// Runtime counters as a JSON value, for health/metrics collaborators.
    pub fn stats_json(&self) -> serde_json::Value {
        serde_json::to_value(self.stats()).unwrap_or(serde_json::Value::Null)
    }

    /// Read access to the activity log.
    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// The effective timeout: request override, else spec override, else
    /// the default — always clamped to the `max_timeout` ceiling.
    fn resolve_timeout(&self, req: &Request) -> Duration {
        let requested = req
            .timeout
            .map(|t| t.to_std())
            .or_else(|| self.spec_of(&req.agent_id).and_then(|s| s.timeout).map(|t| t.to_std()))
            .unwrap_or(self.config.default_timeout);
        requested.min(self.config.max_timeout)
    }

    /// Try to take one child slot under `parent`. False when the parent is
    /// at its fan-out limit.
    fn acquire_child_slot(&self, parent: &TaskId) -> bool {
        let mut children = self.children.lock().unwrap_or_else(|e| e.into_inner());
        let count = children.entry(parent.clone()).or_insert(0);
        if *count >= self.config.max_children {
            return false;
        }
        *count += 1;
        true
    }

    fn release_child_slot(&self, parent: &TaskId) {
        let mut children = self.children.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = children.get_mut(parent) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                children.remove(parent);
            }
        }
    }

    /// A terminal failure result for a pipeline rejection.
    fn terminal_result(
        &self,
        req: &Request,
        started_at: DateTime<Utc>,
        status: Status,
        code: &str,
        message: impl Into<String>,
    ) -> ExecResult {
        let mut result = ExecResult::failure(
            req.task_id.clone(),
            status,
            ExecError::new(code, message, false),
        );
        result.metrics = metrics_since(started_at, 0);
        result
    }

    /// A timeout result, recorded in the activity log.
    fn timeout_result(&self, req: &Request, started_at: DateTime<Utc>) -> ExecResult {
        let metrics = metrics_since(started_at, 0);
        self.activity.record(
            ActivityEntry::new(
                ActivityKind::ExecTimeout,
                req.run_id.clone(),
                req.task_id.clone(),
                req.agent_id.clone(),
            )
            .with_tenant(req.tenant_id.clone())
            .with_status(Status::Timeout)
            .with_duration(metrics.duration)
            .with_error_code(codes::TIMEOUT)
            .with_message("execution exceeded timeout"),
        );
        let mut result = ExecResult::failure(
            req.task_id.clone(),
            Status::Timeout,
            ExecError::new(codes::TIMEOUT, "execution exceeded timeout", true),
        );
        result.metrics = metrics;
        result
    }
}

/// Point-in-time runtime counters.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeStats {
    /// Executions currently holding an admission slot.
    pub active_executions: i64,
    /// Executions admitted since the runtime was created.
    pub total_executions: i64,
    /// The admission semaphore's capacity.
    pub max_concurrency: usize,
    /// Entries currently retained by the activity log.
    pub activity_log_size: usize,
}

/// Exponential backoff before retry `attempt` (1-based beyond the first
/// attempt): `100ms * 2^(attempt-1)`, capped at 10s.
fn backoff_delay(attempt: usize) -> Duration {
    let shift = (attempt - 1).min(16) as u32;
    let delay = BACKOFF_BASE.saturating_mul(1u32 << shift);
    delay.min(BACKOFF_CAP)
}

fn metrics_since(started_at: DateTime<Utc>, retry_count: usize) -> ExecMetrics {
    let completed_at = Utc::now();
    let duration = completed_at
        .signed_duration_since(started_at)
        .to_std()
        .unwrap_or_default();
    ExecMetrics {
        started_at,
        completed_at,
        duration: duration.into(),
        retry_count,
        cost_usd: 0.0,
    }
}

/// Releases a fan-out slot when dropped, on every exit path.
struct ChildSlot<'rt> {
    runtime: &'rt Runtime,
    parent: TaskId,
}

impl Drop for ChildSlot<'_> {
    fn drop(&mut self) {
        self.runtime.release_child_slot(&self.parent);
    }
}

/// Decrements a counter when dropped.
struct CounterGuard<'rt>(&'rt AtomicI64);

impl Drop for CounterGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
