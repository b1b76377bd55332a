//! End-to-end scenario across all four crates: contract types in, runtime
//! pipeline through the bridge facade, activity trail out.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use overseer_activity::{ActivityKind, ActivityLog, MemorySink};
use overseer_bridge::{BatchRequest, Bridge, BridgeConfig, CliResult, InvokeOptions};
use overseer_contract::{
    AgentSpec, ExecError, ExecResult, Request, Status, codes, handler_fn,
};
use overseer_runtime::{Registry, Runtime, RuntimeConfig};

fn build_runtime(sink: MemorySink) -> Arc<Runtime> {
    let config = RuntimeConfig {
        default_timeout: Duration::from_secs(5),
        max_timeout: Duration::from_secs(30),
        max_depth: 3,
        max_children: 5,
        max_concurrency: 10,
        max_retries: 2,
        max_memory_entries: 1_000,
    };
    let log = ActivityLog::new()
        .with_max_entries(config.max_memory_entries)
        .with_sink(sink);
    Arc::new(Runtime::with_activity_log(config, log).unwrap())
}

#[tokio::test]
async fn full_pipeline_from_registration_to_audit_trail() {
    let sink = MemorySink::new();
    let runtime = build_runtime(sink.clone());
    let registry = Registry::new(Arc::clone(&runtime));

    registry
        .register(
            AgentSpec::new("echo", "Echo", "1.0.0").with_max_retries(1),
            Arc::new(handler_fn(|_scope, req| async move {
                Ok(ExecResult::success(
                    req.task_id,
                    Some(serde_json::json!({"ok": true})),
                ))
            })),
        )
        .unwrap();
    assert!(registry.has(&"echo".into()));

    // Direct runtime execution.
    let cancel = CancellationToken::new();
    let req = Request::new("r1", "t1", "echo", "tn", "noop");
    let result = runtime.execute(&cancel, req).await;

    assert_eq!(result.status, Status::Success);
    assert_eq!(result.output, Some(serde_json::json!({"ok": true})));
    assert_eq!(result.metrics.retry_count, 0);
    assert!(result.metrics.completed_at >= result.metrics.started_at);

    // The audit trail reached both the bounded log and the sink.
    let trail: Vec<_> = runtime
        .activity()
        .entries_for_task(&"t1".into())
        .iter()
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        trail,
        vec![
            ActivityKind::RequestReceived,
            ActivityKind::ExecStarted,
            ActivityKind::ExecCompleted,
        ]
    );
    assert_eq!(sink.collected().len(), 3);

    // Same agent through the bridge facade, with a batch.
    let bridge = Bridge::new(
        Arc::clone(&runtime),
        BridgeConfig {
            tenant_id: "tn".into(),
            run_id: "r1".into(),
        },
    );
    let results = bridge
        .invoke_batch(
            &cancel,
            vec![
                BatchRequest::new("echo", "noop"),
                BatchRequest::new("echo", "noop")
                    .with_arguments(serde_json::json!({"n": 2})),
            ],
        )
        .await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.status == Status::Success));

    let stats = runtime.stats();
    assert_eq!(stats.total_executions, 3);
    assert_eq!(stats.active_executions, 0);
}

#[tokio::test]
async fn guard_rejections_surface_identically_through_both_entry_points() {
    let runtime = build_runtime(MemorySink::new());
    runtime
        .register(
            AgentSpec::new("echo", "Echo", "1.0.0"),
            Arc::new(handler_fn(|_scope, req| async move {
                Ok(ExecResult::success(req.task_id, None))
            })),
        )
        .unwrap();

    let cancel = CancellationToken::new();

    let direct = runtime
        .execute(
            &cancel,
            Request::new("r1", "t-deep", "echo", "tn", "noop").with_parent("p1", 9),
        )
        .await;
    assert_eq!(direct.status, Status::Failure);
    assert_eq!(
        direct.error.as_ref().unwrap().code,
        codes::MAX_DEPTH_EXCEEDED
    );

    let bridge = Bridge::new(
        Arc::clone(&runtime),
        BridgeConfig {
            tenant_id: "tn".into(),
            run_id: "r1".into(),
        },
    );
    let via_bridge = bridge
        .invoke(
            &cancel,
            "echo",
            "noop",
            None,
            InvokeOptions::new().with_parent("p1", 9),
        )
        .await;
    assert_eq!(via_bridge.status, Status::Failure);
    assert_eq!(
        via_bridge.error.as_ref().unwrap().code,
        codes::MAX_DEPTH_EXCEEDED
    );

    // Both rejections render the same CLI projection shape.
    let cli = CliResult::from(&via_bridge);
    assert_eq!(cli.status, "failure");
    assert!(cli.error.unwrap().starts_with("[MAX_DEPTH_EXCEEDED] "));
}

#[tokio::test]
async fn retry_budget_applies_end_to_end() {
    let runtime = build_runtime(MemorySink::new());
    runtime
        .register(
            // Spec budget of 1 overrides the runtime default of 2.
            AgentSpec::new("flaky", "Flaky", "1.0.0").with_max_retries(1),
            Arc::new(handler_fn(|_scope, req| async move {
                Ok(ExecResult::failure(
                    req.task_id,
                    Status::Failure,
                    ExecError::new("FLAKY", "still broken", true),
                ))
            })),
        )
        .unwrap();

    let bridge = Bridge::new(
        Arc::clone(&runtime),
        BridgeConfig {
            tenant_id: "tn".into(),
            run_id: "r1".into(),
        },
    );
    let result = bridge
        .invoke(
            &CancellationToken::new(),
            "flaky",
            "noop",
            None,
            InvokeOptions::new(),
        )
        .await;

    assert_eq!(result.status, Status::Failure);
    assert_eq!(result.error.unwrap().code, "FLAKY");
    assert_eq!(result.metrics.retry_count, 1);

    let retries = runtime
        .activity()
        .entries()
        .iter()
        .filter(|e| e.kind == ActivityKind::ExecRetry)
        .count();
    assert_eq!(retries, 1);
}
