//! End-to-end runs of the decommission pipeline over scripted collaborators.

use std::sync::Arc;

use nodecull_core::{
    CoreError, Decommissioner, InstanceId, NodeRef, Phase, RunSettings, SelectionPolicy,
};
use nodecull_test_support::fixtures::{attributes, candidate, pay_as_you_go, prepaid};
use nodecull_test_support::{Call, CallLog, DescribeScript, FakeProvider, PageScript, RecordingRemover};

fn three_node_provider(log: &CallLog) -> FakeProvider {
    FakeProvider::new(log.clone())
        .with_pages(vec![PageScript::Items(vec![
            candidate("young"),
            candidate("old"),
            candidate("reserved"),
        ])])
        .with_attributes([
            ("young", pay_as_you_go("young", "2021-06-01T00:00:00Z")),
            ("old", pay_as_you_go("old", "2021-01-01T00:00:00Z")),
            ("reserved", prepaid("reserved", "2020-01-01T00:00:00Z")),
        ])
}

fn decommissioner(provider: FakeProvider, log: &CallLog) -> Decommissioner {
    Decommissioner::new(
        Arc::new(provider),
        Arc::new(RecordingRemover::new(log.clone())),
    )
}

#[tokio::test]
async fn oldest_pay_as_you_go_instance_is_decommissioned() -> anyhow::Result<()> {
    let log = CallLog::default();
    let pipeline = decommissioner(three_node_provider(&log), &log);
    let mut settings = RunSettings::new("vpc-1", 1, "token-1");
    settings.policy = SelectionPolicy::OldestFirst;

    let report = pipeline.run(&settings).await?;

    assert_eq!(report.plan.candidates, 3);
    assert_eq!(report.plan.eligible, 2);
    assert_eq!(report.plan.victims.ids(), vec![InstanceId::from("old")]);

    let expected_node = NodeRef {
        host_name: candidate("old").host_name,
        internal_ip: candidate("old").internal_ip,
    };
    assert_eq!(
        log.side_effects(),
        vec![
            Call::RemoveNodes(vec![expected_node]),
            Call::Stop {
                id: InstanceId::from("old"),
                dry_run: false,
            },
            Call::Delete {
                ids: vec![InstanceId::from("old")],
                client_token: "token-1".to_string(),
                dry_run: false,
            },
        ]
    );
    assert!(
        log.side_effects().iter().all(|call| !format!("{call:?}").contains("reserved")),
        "reserved instance untouched"
    );
    assert_eq!(
        report.decommission.phases,
        vec![Phase::ClusterRemoval, Phase::Stop, Phase::Terminate]
    );
    Ok(())
}

#[tokio::test]
async fn newest_first_flips_the_choice() -> anyhow::Result<()> {
    let log = CallLog::default();
    let pipeline = decommissioner(three_node_provider(&log), &log);
    let mut settings = RunSettings::new("vpc-1", 1, "token-1");
    settings.policy = SelectionPolicy::NewestFirst;

    let plan = pipeline.plan(&settings).await?;

    assert_eq!(plan.victims.ids(), vec![InstanceId::from("young")]);
    assert!(log.side_effects().is_empty(), "planning has no side effects");
    Ok(())
}

#[tokio::test]
async fn nothing_eligible_finishes_without_side_effects() -> anyhow::Result<()> {
    let log = CallLog::default();
    let provider = FakeProvider::new(log.clone())
        .with_pages(vec![PageScript::Items(vec![
            candidate("reserved"),
            candidate("broken"),
        ])])
        .with_attributes([("reserved", attributes("reserved", "PrePaid", "2021-01-01T00:00Z"))])
        .with_describe("broken", DescribeScript::Fail("InvalidInstanceId.NotFound"));
    let pipeline = decommissioner(provider, &log);

    let report = pipeline.run(&RunSettings::new("vpc-1", 2, "token-1")).await?;

    assert!(report.plan.victims.is_empty());
    assert!(report.decommission.phases.is_empty());
    assert!(log.side_effects().is_empty());
    Ok(())
}

#[tokio::test]
async fn bad_timestamp_aborts_before_side_effects() {
    let log = CallLog::default();
    let provider = FakeProvider::new(log.clone())
        .with_pages(vec![PageScript::Items(vec![candidate("a"), candidate("b")])])
        .with_attributes([
            ("a", pay_as_you_go("a", "2021-01-01T00:00Z")),
            ("b", pay_as_you_go("b", "last tuesday")),
        ]);
    let pipeline = decommissioner(provider, &log);

    let err = pipeline
        .run(&RunSettings::new("vpc-1", 1, "token-1"))
        .await
        .expect_err("unparseable timestamp");

    assert!(matches!(err, CoreError::Timestamp { .. }));
    assert!(log.side_effects().is_empty());
}

#[tokio::test]
async fn orchestration_failure_surfaces_through_run() {
    let log = CallLog::default();
    let provider = three_node_provider(&log).failing_stop("old");
    let pipeline = decommissioner(provider, &log);

    let err = pipeline
        .run(&RunSettings::new("vpc-1", 1, "token-1"))
        .await
        .expect_err("stop fails");

    let CoreError::Orchestration(failure) = err else {
        panic!("expected orchestration failure, got {err:?}");
    };
    assert_eq!(failure.phase, Phase::Stop);
    assert!(failure.cluster_removed);
    assert_eq!(failure.failed_instance, Some(InstanceId::from("old")));
}
