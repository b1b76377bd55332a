//! Agent specifications: what a capability is and what limits it carries.

use serde::{Deserialize, Serialize};

use crate::duration::DurationMs;
use crate::error::ValidationError;
use crate::id::AgentId;

/// The static specification of an agent — what it can do and its
/// operational constraints.
///
/// A spec is immutable once registered; replace it by unregistering and
/// registering again. Per-agent limits override the runtime defaults but
/// never the runtime's global ceilings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique identifier for this agent type.
    pub id: AgentId,

    /// Human-readable agent name.
    pub name: String,

    /// Semantic version of this agent spec.
    pub version: String,

    /// What this agent is allowed to do. Informational; enforcement lives
    /// in the policy layer, not in the runtime.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capabilities: Vec<String>,

    /// Maximum concurrent executions for this agent.
    /// `None` means use the runtime default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<usize>,

    /// Default per-execution timeout.
    /// `None` means use the runtime default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<DurationMs>,

    /// Maximum retries on retryable failure.
    /// `None` means use the runtime default; `Some(0)` means execute
    /// exactly once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<usize>,

    /// Maximum spawn depth for child agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Maximum number of child agents that can be spawned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_children: Option<usize>,
}

impl AgentSpec {
    /// Create a spec with the required identity fields and no overrides.
    pub fn new(
        id: impl Into<AgentId>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: version.into(),
            capabilities: Vec::new(),
            max_concurrency: None,
            timeout: None,
            max_retries: None,
            max_depth: None,
            max_children: None,
        }
    }

    /// Declare the capabilities of this agent.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the per-execution timeout override.
    #[must_use]
    pub fn with_timeout(mut self, timeout: impl Into<DurationMs>) -> Self {
        self.timeout = Some(timeout.into());
        self
    }

    /// Set the retry budget override.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the spawn depth override.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Set the fan-out override.
    #[must_use]
    pub fn with_max_children(mut self, max_children: usize) -> Self {
        self.max_children = Some(max_children);
        self
    }

    /// Set the per-agent concurrency override.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = Some(max_concurrency);
        self
    }

    /// Check that the spec is well-formed: id, name, and version must be
    /// non-empty. Numeric limits are unsigned, so the non-negativity rule
    /// holds by construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::SpecField("id"));
        }
        if self.name.is_empty() {
            return Err(ValidationError::SpecField("name"));
        }
        if self.version.is_empty() {
            return Err(ValidationError::SpecField("version"));
        }
        Ok(())
    }
}
