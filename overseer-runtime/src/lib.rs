#![deny(missing_docs)]
//! # overseer-runtime — the agent work-unit execution engine
//!
//! Runs one [`Request`](overseer_contract::Request) through an ordered
//! pipeline to a terminal [`ExecResult`](overseer_contract::ExecResult):
//!
//! ```text
//! validate → lookup → depth guard → fan-out guard → admission
//!          → deadline → execute with retry → activity logging
//! ```
//!
//! Operational guarantees:
//!
//! - **Bounded concurrency** — a counting semaphore admits at most
//!   `max_concurrency` handler bodies at once.
//! - **Bounded spawning** — spawn depth and per-parent fan-out are capped
//!   before any execution resource is consumed.
//! - **Deadline ceiling** — per-request and per-agent timeouts are always
//!   clamped to the runtime's `max_timeout`.
//! - **Centralized retry** — exponential backoff within the deadline;
//!   handlers only declare whether a failure is retryable.
//! - **Deterministic observability** — every lifecycle transition lands in
//!   the bounded activity log.
//!
//! Domain-level failures never raise: they are encoded in the returned
//! result. Construction-time misuse (an invalid [`RuntimeConfig`]) is
//! rejected by [`Runtime::new`] before any request is accepted.

pub mod config;
pub mod registry;
pub mod runtime;

pub use config::{ConfigError, RuntimeConfig};
pub use registry::{Registry, RegistryError};
pub use runtime::{Runtime, RuntimeStats};
