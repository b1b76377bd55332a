use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};

use overseer_activity::{ActivityEntry, ActivityKind, ActivityLog, MemorySink};
use overseer_contract::{RunId, Status, TaskId};

fn entry(kind: ActivityKind, task: &str) -> ActivityEntry {
    ActivityEntry::new(kind, "run-1", task, "echo")
}

// --- recording ---

#[test]
fn record_assigns_a_sixteen_hex_id() {
    let log = ActivityLog::new();
    log.record(entry(ActivityKind::RequestReceived, "task-1"));

    let entries = log.entries();
    assert_eq!(entries.len(), 1);
    let id = &entries[0].id;
    assert_eq!(id.len(), 16);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn identical_content_gets_identical_ids() {
    let log = ActivityLog::new();
    let ts = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
    log.record(entry(ActivityKind::RequestReceived, "task-1").with_timestamp(ts));
    log.record(entry(ActivityKind::RequestReceived, "task-1").with_timestamp(ts));

    let entries = log.entries();
    assert_eq!(entries[0].id, entries[1].id);
}

#[test]
fn different_kinds_get_different_ids() {
    let log = ActivityLog::new();
    let ts = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
    log.record(entry(ActivityKind::RequestReceived, "task-1").with_timestamp(ts));
    log.record(entry(ActivityKind::ExecStarted, "task-1").with_timestamp(ts));

    let entries = log.entries();
    assert_ne!(entries[0].id, entries[1].id);
}

#[test]
fn entries_are_returned_in_append_order() {
    let log = ActivityLog::new();
    log.record(entry(ActivityKind::RequestReceived, "task-1"));
    log.record(entry(ActivityKind::ExecStarted, "task-1"));
    log.record(entry(ActivityKind::ExecCompleted, "task-1"));

    let kinds: Vec<_> = log.entries().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ActivityKind::RequestReceived,
            ActivityKind::ExecStarted,
            ActivityKind::ExecCompleted,
        ]
    );
}

// --- bounded retention ---

#[test]
fn capacity_evicts_oldest_first() {
    let log = ActivityLog::new().with_max_entries(3);
    for i in 0..5 {
        log.record(entry(ActivityKind::RequestReceived, &format!("task-{i}")));
    }

    let entries = log.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].task_id, TaskId::new("task-2"));
    assert_eq!(entries[2].task_id, TaskId::new("task-4"));
}

#[test]
fn zero_capacity_is_ignored() {
    let log = ActivityLog::new().with_max_entries(0);
    log.record(entry(ActivityKind::RequestReceived, "task-1"));
    assert_eq!(log.len(), 1);
}

// --- filtering ---

#[test]
fn filters_by_run_and_task() {
    let log = ActivityLog::new();
    log.record(ActivityEntry::new(ActivityKind::RequestReceived, "run-a", "t1", "echo"));
    log.record(ActivityEntry::new(ActivityKind::RequestReceived, "run-a", "t2", "echo"));
    log.record(ActivityEntry::new(ActivityKind::RequestReceived, "run-b", "t3", "echo"));

    assert_eq!(log.entries_for_run(&RunId::new("run-a")).len(), 2);
    assert_eq!(log.entries_for_run(&RunId::new("run-b")).len(), 1);
    assert_eq!(log.entries_for_run(&RunId::new("run-c")).len(), 0);
    assert_eq!(log.entries_for_task(&TaskId::new("t2")).len(), 1);
}

// --- sinks ---

#[test]
fn memory_sink_sees_every_entry_with_its_id() {
    let sink = MemorySink::new();
    let log = ActivityLog::new().with_sink(sink.clone());
    log.record(entry(ActivityKind::ExecFailed, "task-1").with_status(Status::Error));

    let collected = sink.collected();
    assert_eq!(collected.len(), 1);
    assert_eq!(collected[0].id.len(), 16);
    assert_eq!(collected[0].status, Some(Status::Error));
}

#[test]
fn sink_sees_entries_evicted_from_memory() {
    let sink = MemorySink::new();
    let log = ActivityLog::new().with_max_entries(2).with_sink(sink.clone());
    for i in 0..4 {
        log.record(entry(ActivityKind::RequestReceived, &format!("task-{i}")));
    }
    assert_eq!(log.len(), 2);
    assert_eq!(sink.collected().len(), 4);
}

// --- wire format ---

#[test]
fn entry_serializes_with_wire_names_and_skips_empty_fields() {
    let ts = Utc.with_ymd_and_hms(2026, 8, 23, 12, 0, 0).unwrap();
    let e = entry(ActivityKind::ExecTimeout, "task-1")
        .with_timestamp(ts)
        .with_status(Status::Timeout)
        .with_duration(std::time::Duration::from_millis(1500))
        .with_message("execution exceeded timeout")
        .with_error_code("TIMEOUT");

    let value = serde_json::to_value(&e).unwrap();
    assert_eq!(value["type"], "execution.timeout");
    assert_eq!(value["duration_ms"], 1500);
    assert_eq!(value["msg"], "execution exceeded timeout");
    assert_eq!(value["error_code"], "TIMEOUT");
    assert_eq!(value["status"], "timeout");
    // Unset optionals stay off the wire.
    assert!(value.get("tenant_id").is_none());
    assert!(value.get("fields").is_none());
}

#[test]
fn kind_round_trips_through_its_dotted_name() {
    for kind in [
        ActivityKind::RequestReceived,
        ActivityKind::GuardTriggered,
        ActivityKind::SpawnBlocked,
        ActivityKind::ExecRetry,
    ] {
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, format!("\"{}\"", kind.as_str()));
        let back: ActivityKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }
}

// --- concurrency ---

#[test]
fn concurrent_recording_loses_nothing_under_capacity() {
    let log = Arc::new(ActivityLog::new().with_max_entries(1_000));
    let mut handles = Vec::new();
    for t in 0..8 {
        let log = Arc::clone(&log);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                log.record(ActivityEntry::new(
                    ActivityKind::RequestReceived,
                    "run-1",
                    format!("task-{t}-{i}"),
                    "echo",
                ));
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(log.len(), 800);
}
