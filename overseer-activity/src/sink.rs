//! Pluggable sinks for tailing activity entries outside the in-memory log.

use std::sync::{Arc, Mutex};

use crate::entry::{ActivityEntry, ActivityKind};

/// Receives every recorded entry, after the in-memory append.
///
/// Emission is advisory: a slow or failing sink never blocks or poisons the
/// log's critical section, and a sink failure does not undo the append.
pub trait ActivitySink: Send + Sync {
    /// Emit one recorded entry.
    fn emit(&self, entry: &ActivityEntry);
}

/// Writes entries as JSON lines to standard error. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl ActivitySink for StderrSink {
    fn emit(&self, entry: &ActivityEntry) {
        if let Ok(line) = serde_json::to_string(entry) {
            eprintln!("{line}");
        }
    }
}

/// Emits entries as structured [`tracing`] events under the
/// `overseer.activity` message.
///
/// Failures, timeouts, and guard rejections emit at `WARN`; everything else
/// at `DEBUG`. Wire to any `tracing`-compatible subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ActivitySink for TracingSink {
    fn emit(&self, entry: &ActivityEntry) {
        match entry.kind {
            ActivityKind::ValidationFailed
            | ActivityKind::ExecFailed
            | ActivityKind::ExecTimeout
            | ActivityKind::GuardTriggered
            | ActivityKind::SpawnBlocked => {
                tracing::warn!(
                    id = %entry.id,
                    kind = %entry.kind,
                    run = %entry.run_id,
                    task = %entry.task_id,
                    agent = %entry.agent_id,
                    error_code = entry.error_code.as_deref().unwrap_or(""),
                    msg = %entry.message,
                    "overseer.activity"
                );
            }
            _ => {
                tracing::debug!(
                    id = %entry.id,
                    kind = %entry.kind,
                    run = %entry.run_id,
                    task = %entry.task_id,
                    agent = %entry.agent_id,
                    msg = %entry.message,
                    "overseer.activity"
                );
            }
        }
    }
}

/// Collects emitted entries in memory. Intended for tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<ActivityEntry>>>,
}

impl MemorySink {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn collected(&self) -> Vec<ActivityEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl ActivitySink for MemorySink {
    fn emit(&self, entry: &ActivityEntry) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
    }
}
