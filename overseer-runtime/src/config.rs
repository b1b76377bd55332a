//! Operational limits and defaults for the runtime.

use std::time::Duration;

use thiserror::Error;

/// Operational limits and defaults for a [`Runtime`](crate::Runtime).
///
/// Per-agent and per-request values may override the defaults but never the
/// ceilings: an effective timeout is always clamped to `max_timeout`.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Applied when neither the request nor the agent spec sets a timeout.
    pub default_timeout: Duration,

    /// Absolute ceiling on any execution timeout.
    pub max_timeout: Duration,

    /// Maximum spawn depth for agent hierarchies.
    pub max_depth: usize,

    /// Maximum concurrent child tasks per parent.
    pub max_children: usize,

    /// Maximum concurrent executions across the runtime.
    pub max_concurrency: usize,

    /// Default retry limit for retryable failures.
    pub max_retries: usize,

    /// Maximum activity log entries held in memory.
    pub max_memory_entries: usize,
}

impl Default for RuntimeConfig {
    /// Production-safe defaults.
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(5 * 60),
            max_timeout: Duration::from_secs(30 * 60),
            max_depth: 5,
            max_children: 10,
            max_concurrency: 50,
            max_retries: 3,
            max_memory_entries: 10_000,
        }
    }
}

impl RuntimeConfig {
    /// Check that the config has no dangerous values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout.is_zero() {
            return Err(ConfigError::ZeroDefaultTimeout);
        }
        if self.max_timeout.is_zero() {
            return Err(ConfigError::ZeroMaxTimeout);
        }
        if self.max_timeout < self.default_timeout {
            return Err(ConfigError::CeilingBelowDefault);
        }
        if self.max_depth == 0 {
            return Err(ConfigError::ZeroMaxDepth);
        }
        if self.max_children == 0 {
            return Err(ConfigError::ZeroMaxChildren);
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroMaxConcurrency);
        }
        Ok(())
    }
}

/// An invalid [`RuntimeConfig`].
///
/// These are wiring-time bugs, not runtime conditions, and are raised by
/// [`Runtime::new`](crate::Runtime::new) before any request is accepted.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `default_timeout` must be greater than zero.
    #[error("default_timeout must be greater than zero")]
    ZeroDefaultTimeout,

    /// `max_timeout` must be greater than zero.
    #[error("max_timeout must be greater than zero")]
    ZeroMaxTimeout,

    /// `max_timeout` must be at least `default_timeout`.
    #[error("max_timeout must be at least default_timeout")]
    CeilingBelowDefault,

    /// `max_depth` must be greater than zero.
    #[error("max_depth must be greater than zero")]
    ZeroMaxDepth,

    /// `max_children` must be greater than zero.
    #[error("max_children must be greater than zero")]
    ZeroMaxChildren,

    /// `max_concurrency` must be greater than zero.
    #[error("max_concurrency must be greater than zero")]
    ZeroMaxConcurrency,
}
