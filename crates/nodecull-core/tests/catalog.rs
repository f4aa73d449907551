//! Catalog pagination against a scripted provider.

use std::time::Duration;

use nodecull_core::{CoreError, PAGE_SIZE, fetch_catalog};
use nodecull_test_support::fixtures::candidates;
use nodecull_test_support::{Call, CallLog, FakeProvider, PageScript};

const TIMEOUT: Duration = Duration::from_secs(5);

fn full_page(prefix: &str) -> PageScript {
    PageScript::Items(candidates(prefix, PAGE_SIZE as usize))
}

#[tokio::test]
async fn short_page_terminates_listing() -> anyhow::Result<()> {
    let log = CallLog::default();
    let provider = FakeProvider::new(log.clone()).with_pages(vec![
        full_page("p1"),
        full_page("p2"),
        PageScript::Items(candidates("p3", 37)),
    ]);

    let listed = fetch_catalog(&provider, "vpc-1", TIMEOUT).await?;

    assert_eq!(listed.len(), 237);
    assert_eq!(log.pages_requested(), vec![1, 2, 3]);
    assert_eq!(listed[0].id.as_str(), "p1-1");
    assert_eq!(listed[236].id.as_str(), "p3-37");
    Ok(())
}

#[tokio::test]
async fn exact_multiple_needs_one_empty_page() -> anyhow::Result<()> {
    let log = CallLog::default();
    let provider = FakeProvider::new(log.clone()).with_pages(vec![full_page("p1")]);

    let listed = fetch_catalog(&provider, "vpc-1", TIMEOUT).await?;

    assert_eq!(listed.len(), 100);
    assert_eq!(log.pages_requested(), vec![1, 2]);
    Ok(())
}

#[tokio::test]
async fn requests_carry_scope_and_fixed_page_size() -> anyhow::Result<()> {
    let log = CallLog::default();
    let provider = FakeProvider::new(log.clone());

    assert!(fetch_catalog(&provider, "vpc-xyz", TIMEOUT).await?.is_empty());
    assert_eq!(
        log.calls(),
        vec![Call::ListInstances {
            scope: "vpc-xyz".to_string(),
            page_size: PAGE_SIZE,
            page_number: 1,
        }]
    );
    Ok(())
}

#[tokio::test]
async fn failed_page_discards_earlier_results() {
    let log = CallLog::default();
    let provider = FakeProvider::new(log.clone())
        .with_pages(vec![full_page("p1"), PageScript::Fail("Throttling")]);

    let err = fetch_catalog(&provider, "vpc-1", TIMEOUT)
        .await
        .expect_err("second page fails");

    assert!(matches!(err, CoreError::Fetch { page: 2, .. }));
    assert_eq!(log.pages_requested(), vec![1, 2]);
}

#[tokio::test]
async fn empty_scope_is_rejected_before_any_call() {
    let log = CallLog::default();
    let provider = FakeProvider::new(log.clone());

    let err = fetch_catalog(&provider, "", TIMEOUT)
        .await
        .expect_err("empty scope");

    assert!(matches!(err, CoreError::EmptyScope));
    assert!(log.calls().is_empty());
}
