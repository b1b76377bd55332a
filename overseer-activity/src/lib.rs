#![deny(missing_docs)]
//! Structured, append-only activity logging for the overseer runtime.
//!
//! Every execution lifecycle transition — request received, guard
//! triggered, attempt started, retry, completion, timeout — is recorded as
//! one [`ActivityEntry`] with a deterministic content-derived ID. The log
//! is bounded (ring buffer), safe under concurrent writers, and mirrors
//! each entry to a pluggable [`ActivitySink`] for external tailing.
//!
//! The sink emission is advisory: it happens outside the append's critical
//! section and is not transactional with the in-memory buffer.

pub mod entry;
pub mod log;
pub mod sink;

pub use entry::{ActivityEntry, ActivityKind};
pub use log::ActivityLog;
pub use sink::{ActivitySink, MemorySink, StderrSink, TracingSink};
