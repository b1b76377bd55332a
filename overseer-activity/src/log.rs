//! The bounded, concurrency-safe activity log.

use std::collections::VecDeque;
use std::sync::Mutex;

use overseer_contract::{RunId, TaskId};

use crate::entry::{ActivityEntry, deterministic_id};
use crate::sink::{ActivitySink, StderrSink};

/// Default maximum entries retained in memory.
const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// Append-only, bounded, structured activity log. Safe for concurrent use.
///
/// Retains at most `max_entries` entries in memory as a ring buffer: at
/// capacity, the oldest entry is evicted first. Each recorded entry is also
/// mirrored to the configured [`ActivitySink`] (standard error by default)
/// for external tailing.
pub struct ActivityLog {
    entries: Mutex<VecDeque<ActivityEntry>>,
    max_entries: usize,
    sink: Box<dyn ActivitySink>,
}

impl ActivityLog {
    /// Create a log with the default capacity and stderr sink.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            max_entries: DEFAULT_MAX_ENTRIES,
            sink: Box::new(StderrSink),
        }
    }

    /// Set the maximum number of entries kept in memory.
    /// Zero is ignored and leaves the default in place.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        if max_entries > 0 {
            self.max_entries = max_entries;
        }
        self
    }

    /// Replace the sink that mirrors recorded entries.
    #[must_use]
    pub fn with_sink(mut self, sink: impl ActivitySink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Append an entry to the log.
    ///
    /// Assigns the deterministic content-derived ID, appends under a single
    /// critical section (evicting the oldest entry at capacity), then emits
    /// the entry to the sink outside the lock.
    pub fn record(&self, mut entry: ActivityEntry) {
        entry.id = deterministic_id(
            entry.timestamp,
            entry.kind,
            &entry.run_id,
            &entry.task_id,
            &entry.agent_id,
        );

        {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            if entries.len() >= self.max_entries {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }

        self.sink.emit(&entry);
    }

    /// A copy of all entries, in append order.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    /// A copy of the entries for one run, in append order.
    pub fn entries_for_run(&self, run_id: &RunId) -> Vec<ActivityEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().filter(|e| &e.run_id == run_id).cloned().collect()
    }

    /// A copy of the entries for one task, in append order.
    pub fn entries_for_task(&self, task_id: &TaskId) -> Vec<ActivityEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().filter(|e| &e.task_id == task_id).cloned().collect()
    }

    /// Number of entries currently retained.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True if nothing has been recorded (or everything was evicted).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
