//! Decommission sequencing against scripted collaborators.

use std::sync::Arc;
use std::time::Duration;

use nodecull_core::{
    InstanceId, NodeRef, Orchestrator, OrchestratorOptions, Phase, PhaseCause, ProviderError,
    RemovalError, Victim, VictimSet,
};
use nodecull_test_support::{Call, CallLog, FakeProvider, RecordingRemover};

fn victim(id: &str) -> Victim {
    Victim {
        id: InstanceId::from(id),
        host_name: format!("node-{id}"),
        internal_ip: format!("10.1.0.{}", id.len()),
        creation_time: "2021-01-01T00:00Z".to_string(),
    }
}

fn victims(ids: &[&str]) -> VictimSet {
    VictimSet::new(ids.iter().map(|id| victim(id)).collect())
}

fn ids(raw: &[&str]) -> Vec<InstanceId> {
    raw.iter().map(|id| InstanceId::from(*id)).collect()
}

fn orchestrator(
    provider: FakeProvider,
    remover: RecordingRemover,
    options: OrchestratorOptions,
) -> Orchestrator {
    Orchestrator::new(Arc::new(provider), Arc::new(remover), options)
}

#[tokio::test]
async fn phases_run_in_order() -> anyhow::Result<()> {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()),
        RecordingRemover::new(log.clone()),
        OrchestratorOptions::default(),
    );

    let report = subject.decommission(victims(&["a", "b"]), "token-1").await?;

    assert_eq!(
        log.side_effects(),
        vec![
            Call::RemoveNodes(vec![
                NodeRef {
                    host_name: "node-a".to_string(),
                    internal_ip: "10.1.0.1".to_string(),
                },
                NodeRef {
                    host_name: "node-b".to_string(),
                    internal_ip: "10.1.0.1".to_string(),
                },
            ]),
            Call::Stop {
                id: InstanceId::from("a"),
                dry_run: false,
            },
            Call::Stop {
                id: InstanceId::from("b"),
                dry_run: false,
            },
            Call::Delete {
                ids: ids(&["a", "b"]),
                client_token: "token-1".to_string(),
                dry_run: false,
            },
        ]
    );
    assert_eq!(
        report.phases,
        vec![Phase::ClusterRemoval, Phase::Stop, Phase::Terminate]
    );
    assert_eq!(report.stopped, ids(&["a", "b"]));
    assert_eq!(report.terminated, ids(&["a", "b"]));
    Ok(())
}

#[tokio::test]
async fn removal_failure_touches_no_instance() {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()),
        RecordingRemover::failing(log.clone()),
        OrchestratorOptions::default(),
    );

    let failure = subject
        .decommission(victims(&["a", "b"]), "token-1")
        .await
        .expect_err("removal fails");

    assert_eq!(failure.phase, Phase::ClusterRemoval);
    assert!(!failure.cluster_removed);
    assert!(failure.stopped.is_empty());
    assert!(matches!(failure.cause, PhaseCause::Removal(_)));
    assert_eq!(log.side_effects().len(), 1);
}

#[tokio::test]
async fn stop_failure_reports_progress_and_skips_delete() {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()).failing_stop("b"),
        RecordingRemover::new(log.clone()),
        OrchestratorOptions::default(),
    );

    let failure = subject
        .decommission(victims(&["a", "b", "c"]), "token-1")
        .await
        .expect_err("stop of b fails");

    assert_eq!(failure.phase, Phase::Stop);
    assert!(failure.cluster_removed);
    assert_eq!(failure.stopped, ids(&["a"]));
    assert_eq!(failure.failed_instance, Some(InstanceId::from("b")));
    assert!(
        !log.calls()
            .iter()
            .any(|call| matches!(call, Call::Delete { .. })),
        "no delete after a failed stop"
    );
    assert!(
        !log.calls().contains(&Call::Stop {
            id: InstanceId::from("c"),
            dry_run: false,
        }),
        "stops halt at the first failure"
    );
    let rendered = failure.to_string();
    assert!(rendered.contains("stop"));
    assert!(rendered.contains('b'));
}

#[tokio::test]
async fn delete_failure_keeps_stopped_list() {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()).failing_delete(),
        RecordingRemover::new(log.clone()),
        OrchestratorOptions::default(),
    );

    let failure = subject
        .decommission(victims(&["a", "b"]), "token-1")
        .await
        .expect_err("delete fails");

    assert_eq!(failure.phase, Phase::Terminate);
    assert_eq!(failure.stopped, ids(&["a", "b"]));
    assert!(failure.failed_instance.is_none());
}

#[tokio::test]
async fn empty_set_performs_no_side_effects() -> anyhow::Result<()> {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()),
        RecordingRemover::new(log.clone()),
        OrchestratorOptions::default(),
    );

    let report = subject.decommission(VictimSet::default(), "token-1").await?;

    assert!(log.calls().is_empty());
    assert!(report.phases.is_empty());
    Ok(())
}

#[tokio::test]
async fn dry_run_reaches_every_provider_call() -> anyhow::Result<()> {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()),
        RecordingRemover::new(log.clone()),
        OrchestratorOptions {
            dry_run: true,
            skip_cluster_removal: true,
            ..OrchestratorOptions::default()
        },
    );

    let report = subject.decommission(victims(&["a"]), "token-dry").await?;

    assert!(report.dry_run);
    assert_eq!(report.phases, vec![Phase::Stop, Phase::Terminate]);
    assert_eq!(
        log.side_effects(),
        vec![
            Call::Stop {
                id: InstanceId::from("a"),
                dry_run: true,
            },
            Call::Delete {
                ids: ids(&["a"]),
                client_token: "token-dry".to_string(),
                dry_run: true,
            },
        ]
    );
    Ok(())
}

#[tokio::test]
async fn dry_run_still_removes_from_cluster() -> anyhow::Result<()> {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()),
        RecordingRemover::new(log.clone()),
        OrchestratorOptions {
            dry_run: true,
            skip_cluster_removal: false,
            ..OrchestratorOptions::default()
        },
    );

    let report = subject.decommission(victims(&["a"]), "token-dry").await?;

    let effects = log.side_effects();
    assert_eq!(effects.len(), 3);
    assert!(matches!(effects[0], Call::RemoveNodes(ref nodes) if nodes.len() == 1));
    assert_eq!(
        effects[1],
        Call::Stop {
            id: InstanceId::from("a"),
            dry_run: true,
        }
    );
    assert_eq!(
        report.phases,
        vec![Phase::ClusterRemoval, Phase::Stop, Phase::Terminate]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn hung_removal_fails_cluster_phase() {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()),
        RecordingRemover::hanging(log.clone()),
        OrchestratorOptions {
            removal_timeout: Duration::from_secs(120),
            ..OrchestratorOptions::default()
        },
    );

    let failure = subject
        .decommission(victims(&["a", "b"]), "token-1")
        .await
        .expect_err("removal never finishes");

    assert_eq!(failure.phase, Phase::ClusterRemoval);
    assert!(!failure.cluster_removed);
    assert!(matches!(
        failure.cause,
        PhaseCause::Removal(RemovalError::Timeout { after }) if after == Duration::from_secs(120)
    ));
    assert_eq!(log.side_effects().len(), 1, "no instance touched");
}

#[tokio::test(start_paused = true)]
async fn hung_stop_fails_stop_phase() {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()).hanging_stop("b"),
        RecordingRemover::new(log.clone()),
        OrchestratorOptions::default(),
    );

    let failure = subject
        .decommission(victims(&["a", "b", "c"]), "token-1")
        .await
        .expect_err("stop of b never answers");

    assert_eq!(failure.phase, Phase::Stop);
    assert!(failure.cluster_removed);
    assert_eq!(failure.stopped, ids(&["a"]));
    assert_eq!(failure.failed_instance, Some(InstanceId::from("b")));
    assert!(matches!(
        failure.cause,
        PhaseCause::Provider(ProviderError::Timeout {
            operation: "StopInstance",
            ..
        })
    ));
    assert!(
        !log.calls()
            .iter()
            .any(|call| matches!(call, Call::Delete { .. }))
    );
}

#[tokio::test(start_paused = true)]
async fn hung_delete_fails_terminate_phase() {
    let log = CallLog::default();
    let subject = orchestrator(
        FakeProvider::new(log.clone()).hanging_delete(),
        RecordingRemover::new(log.clone()),
        OrchestratorOptions {
            call_timeout: Duration::from_secs(5),
            ..OrchestratorOptions::default()
        },
    );

    let failure = subject
        .decommission(victims(&["a", "b"]), "token-1")
        .await
        .expect_err("delete never answers");

    assert_eq!(failure.phase, Phase::Terminate);
    assert_eq!(failure.stopped, ids(&["a", "b"]));
    assert!(failure.failed_instance.is_none());
    assert!(matches!(
        failure.cause,
        PhaseCause::Provider(ProviderError::Timeout {
            operation: "DeleteInstances",
            after,
        }) if after == Duration::from_secs(5)
    ));
}
