//! Concurrent eligibility probing.
//!
//! # Design
//! - One task per candidate, bounded by a semaphore.
//! - Each task sends its result over an `mpsc` channel to the collecting task; no shared lock.
//! - Results are yielded only after every task has finished, in completion order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::model::{Candidate, ProbeResult};
use crate::provider::{CloudProvider, with_deadline};

/// Default number of describe calls in flight at once.
pub const DEFAULT_PROBE_CONCURRENCY: usize = 32;

/// Tuning for the probe fan-out.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    /// Maximum describe calls in flight.
    pub concurrency: usize,
    /// Deadline applied to each describe call.
    pub call_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_PROBE_CONCURRENCY,
            call_timeout: Duration::from_secs(30),
        }
    }
}

/// Probe every candidate and return one result per candidate.
///
/// Probe failures are recorded in the result rather than raised. The returned
/// order is the order in which probes completed and carries no meaning.
pub async fn probe_candidates(
    provider: Arc<dyn CloudProvider>,
    candidates: &[Candidate],
    options: ProbeOptions,
) -> Vec<ProbeResult> {
    let permits = Arc::new(Semaphore::new(options.concurrency.max(1)));
    let (tx, mut rx) = mpsc::channel(candidates.len().max(1));

    let mut tasks: Vec<(Candidate, JoinHandle<()>)> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let provider = Arc::clone(&provider);
        let permits = Arc::clone(&permits);
        let tx = tx.clone();
        let owned = candidate.clone();
        let handle = tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            let result = probe_one(provider.as_ref(), &owned, options.call_timeout).await;
            if tx.send(result).await.is_err() {
                warn!(instance_id = %owned.id, "probe result dropped; collector closed");
            }
        });
        tasks.push((candidate.clone(), handle));
    }
    drop(tx);

    let mut results = Vec::with_capacity(candidates.len());
    while let Some(result) = rx.recv().await {
        results.push(result);
    }

    for (candidate, handle) in tasks {
        if let Err(err) = handle.await {
            warn!(instance_id = %candidate.id, error = %err, "probe task aborted");
            results.push(ProbeResult::failed(
                &candidate,
                ProviderError::Transport {
                    operation: "DescribeInstanceAttribute",
                    source: Box::new(err),
                },
            ));
        }
    }

    let eligible = results.iter().filter(|result| result.is_eligible()).count();
    debug!(probed = results.len(), eligible, "eligibility probe finished");
    results
}

async fn probe_one(
    provider: &dyn CloudProvider,
    candidate: &Candidate,
    call_timeout: Duration,
) -> ProbeResult {
    match with_deadline(
        "DescribeInstanceAttribute",
        call_timeout,
        provider.describe_instance(&candidate.id),
    )
    .await
    {
        Ok(attributes) => ProbeResult::described(candidate.id.clone(), attributes),
        Err(err) => {
            warn!(instance_id = %candidate.id, error = %err, "instance probe failed; excluding");
            ProbeResult::failed(candidate, err)
        }
    }
}
