//! Paginated instance listing for a network scope.

use std::time::Duration;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::model::Candidate;
use crate::provider::{CloudProvider, with_deadline};

/// Fixed page size requested from the provider.
pub const PAGE_SIZE: u32 = 100;

/// Fetch every instance registered in `scope`.
///
/// Pages are requested sequentially from page 1. The first page holding fewer
/// than [`PAGE_SIZE`] instances (including an empty page) is the last one and
/// is kept.
///
/// # Errors
///
/// Returns [`CoreError::EmptyScope`] for an empty scope, and
/// [`CoreError::Fetch`] as soon as any page request fails; instances from
/// earlier pages are discarded. Returns [`CoreError::PageLimit`] when full
/// pages keep arriving past the last representable page number.
pub async fn fetch_catalog(
    provider: &dyn CloudProvider,
    scope: &str,
    call_timeout: Duration,
) -> CoreResult<Vec<Candidate>> {
    if scope.is_empty() {
        return Err(CoreError::EmptyScope);
    }

    let mut candidates = Vec::new();
    let mut page = 1_u32;
    loop {
        let batch = with_deadline(
            "DescribeInstances",
            call_timeout,
            provider.list_instances(scope, PAGE_SIZE, page),
        )
        .await
        .map_err(|source| CoreError::Fetch { page, source })?;

        let received = batch.len();
        debug!(page, received, "catalog page fetched");
        candidates.extend(batch);

        if received < PAGE_SIZE as usize {
            break;
        }
        page = next_page(page)?;
    }

    Ok(candidates)
}

fn next_page(page: u32) -> CoreResult<u32> {
    page.checked_add(1).ok_or(CoreError::PageLimit { last_page: page })
}
