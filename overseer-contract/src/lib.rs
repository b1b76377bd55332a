//! # overseer-contract — execution contracts for the overseer runtime
//!
//! This crate defines the typed boundary between the execution engine and
//! everything around it: agent specifications, requests, results, statuses,
//! error classification, and the pluggable [`Handler`] capability.
//!
//! | Concept | Type | What it is |
//! |---------|------|------------|
//! | Capability | [`AgentSpec`] | A registered agent and its operational limits |
//! | Invocation | [`Request`] | One validated unit of work |
//! | Outcome | [`ExecResult`] | The terminal result of one execution |
//! | Classification | [`ExecError`] | Machine-readable failure with a retryable flag |
//! | Boundary | [`Handler`] | The single-method tool-execution capability |
//!
//! ## Design invariants
//!
//! - All inputs are validated before execution begins.
//! - Every domain-level failure is encoded in an [`ExecResult`], never raised.
//! - Retry policy is owned by the runtime; a handler only declares whether a
//!   given failure is retryable.
//!
//! Tool semantics (shell, HTTP, filesystem) are deliberately out of scope —
//! they live in the caller-supplied [`Handler`] implementation.

#![deny(missing_docs)]

pub mod duration;
pub mod error;
pub mod handler;
pub mod id;
pub mod request;
pub mod result;
pub mod spec;
pub mod status;

pub use duration::DurationMs;
pub use error::{ExecError, HandlerError, ValidationError, codes};
pub use handler::{FnHandler, Handler, handler_fn};
pub use id::{AgentId, RunId, TaskId, TenantId};
pub use request::Request;
pub use result::{ExecMetrics, ExecResult};
pub use spec::AgentSpec;
pub use status::Status;
