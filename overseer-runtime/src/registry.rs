//! Named-lookup convenience over runtime registration.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use thiserror::Error;

use overseer_contract::{AgentId, AgentSpec, Handler, ValidationError};

use crate::runtime::Runtime;

/// A concurrent registry of agent specs bound to a [`Runtime`].
///
/// Lets call sites manage a named agent set — duplicate rejection,
/// enumeration, existence checks — without reaching into runtime internals.
pub struct Registry {
    runtime: Arc<Runtime>,
    agents: RwLock<HashMap<AgentId, AgentSpec>>,
}

impl Registry {
    /// Create a registry bound to a runtime.
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self {
            runtime,
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Register an agent in the registry and the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyRegistered`] for a duplicate ID, or
    /// the spec's [`ValidationError`] if it is malformed.
    pub fn register(&self, spec: AgentSpec, handler: Arc<dyn Handler>) -> Result<(), RegistryError> {
        spec.validate()?;

        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        if agents.contains_key(&spec.id) {
            return Err(RegistryError::AlreadyRegistered(spec.id.clone()));
        }

        self.runtime.register(spec.clone(), handler)?;
        agents.insert(spec.id.clone(), spec);
        Ok(())
    }

    /// Remove an agent from the registry and the runtime.
    pub fn unregister(&self, id: &AgentId) {
        let mut agents = self.agents.write().unwrap_or_else(|e| e.into_inner());
        agents.remove(id);
        self.runtime.unregister(id);
    }

    /// The spec for a registered agent, if any.
    pub fn get(&self, id: &AgentId) -> Option<AgentSpec> {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        agents.get(id).cloned()
    }

    /// All registered agent specs, in no particular order.
    pub fn list(&self) -> Vec<AgentSpec> {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        agents.values().cloned().collect()
    }

    /// Number of registered agents.
    pub fn count(&self) -> usize {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        agents.len()
    }

    /// True if an agent is registered under this ID.
    pub fn has(&self, id: &AgentId) -> bool {
        let agents = self.agents.read().unwrap_or_else(|e| e.into_inner());
        agents.contains_key(id)
    }
}

/// A registry registration failure.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The agent ID is already registered; unregister it first.
    #[error("agent {0} is already registered")]
    AlreadyRegistered(AgentId),

    /// The spec failed validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}
