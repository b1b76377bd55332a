//! Failure classification: validation errors, handler-raised errors, and
//! the machine-readable [`ExecError`] carried inside results.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The pipeline's machine-readable error codes.
///
/// Handlers are free to declare their own codes for domain failures; these
/// constants cover the codes produced by the runtime itself.
pub mod codes {
    /// The request failed validation. Never retried, no handler invoked.
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    /// No handler is registered for the requested agent.
    pub const AGENT_NOT_FOUND: &str = "AGENT_NOT_FOUND";
    /// The request's spawn depth exceeds the runtime maximum.
    pub const MAX_DEPTH_EXCEEDED: &str = "MAX_DEPTH_EXCEEDED";
    /// The parent task is already at its concurrent-children limit.
    pub const MAX_CHILDREN_EXCEEDED: &str = "MAX_CHILDREN_EXCEEDED";
    /// The caller canceled while waiting for an execution slot.
    pub const CONCURRENCY_WAIT_CANCELED: &str = "CONCURRENCY_WAIT_CANCELED";
    /// The execution deadline elapsed.
    pub const TIMEOUT: &str = "TIMEOUT";
    /// The handler raised an error without producing a result.
    pub const HANDLER_ERROR: &str = "HANDLER_ERROR";
}

/// A typed execution error carried inside an [`ExecResult`].
///
/// Formats as `CODE: message`. The `retryable` flag is declared by whoever
/// produced the error; the runtime alone decides whether another attempt is
/// affordable within the retry budget and the remaining deadline.
///
/// [`ExecResult`]: crate::ExecResult
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecError {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error description.
    pub message: String,
    /// Whether a further attempt might succeed.
    #[serde(default)]
    pub retryable: bool,
}

impl ExecError {
    /// Create a new error with the given code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            retryable,
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ExecError {}

/// A contract validation failure.
///
/// Produced by [`AgentSpec::validate`] and [`Request::validate`] when a
/// required field is empty.
///
/// [`AgentSpec::validate`]: crate::AgentSpec::validate
/// [`Request::validate`]: crate::Request::validate
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field on an agent spec is empty.
    #[error("spec {0} is required")]
    SpecField(&'static str),

    /// A required field on a request is empty.
    #[error("request {0} is required")]
    RequestField(&'static str),
}

/// A failure raised by a handler without producing a result.
///
/// The runtime classifies these as `HANDLER_ERROR` and retries them up to
/// the retry budget. A handler that wants to control retry behavior should
/// instead return an [`ExecResult`] carrying an [`ExecError`] with the
/// `retryable` flag set appropriately.
///
/// [`ExecResult`]: crate::ExecResult
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A plain message describing the failure.
    #[error("{0}")]
    Message(String),

    /// Catch-all. Include context.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Create a message-only handler error.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
