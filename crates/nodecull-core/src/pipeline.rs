//! End-to-end pipeline facade: catalog → probe → select → orchestrate.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::catalog::fetch_catalog;
use crate::error::CoreResult;
use crate::model::{SelectionPolicy, VictimSet};
use crate::orchestrate::{DecommissionReport, Orchestrator, OrchestratorOptions};
use crate::probe::{DEFAULT_PROBE_CONCURRENCY, ProbeOptions, probe_candidates};
use crate::provider::{CloudProvider, ClusterRemover};
use crate::select::select_victims;

/// Per-run settings, built once by the driver.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Network scope (VPC) identifier.
    pub scope: String,
    /// Number of nodes to remove.
    pub requested: usize,
    /// Victim ordering rule.
    pub policy: SelectionPolicy,
    /// Idempotency token for the batch delete.
    pub client_token: String,
    /// Maximum describe calls in flight.
    pub probe_concurrency: usize,
    /// Orchestration knobs (dry-run, timeouts, cluster-removal opt-out).
    pub orchestrator: OrchestratorOptions,
}

impl RunSettings {
    /// Settings with default tuning for the given scope and count.
    #[must_use]
    pub fn new(scope: impl Into<String>, requested: usize, client_token: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            requested,
            policy: SelectionPolicy::default(),
            client_token: client_token.into(),
            probe_concurrency: DEFAULT_PROBE_CONCURRENCY,
            orchestrator: OrchestratorOptions::default(),
        }
    }

    const fn call_timeout(&self) -> Duration {
        self.orchestrator.call_timeout
    }
}

/// Side-effect-free selection outcome.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    /// Instances found in the scope.
    pub candidates: usize,
    /// Instances that passed the eligibility probe.
    pub eligible: usize,
    /// Victims chosen, in order.
    pub victims: VictimSet,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Selection that was acted on.
    pub plan: Plan,
    /// Side effects applied.
    pub decommission: DecommissionReport,
}

/// Runs the full decommission pipeline against injected collaborators.
pub struct Decommissioner {
    provider: Arc<dyn CloudProvider>,
    remover: Arc<dyn ClusterRemover>,
}

impl Decommissioner {
    /// Construct a pipeline over a provider and a cluster remover.
    #[must_use]
    pub fn new(provider: Arc<dyn CloudProvider>, remover: Arc<dyn ClusterRemover>) -> Self {
        Self { provider, remover }
    }

    /// Discover, probe, and select victims without side effects.
    ///
    /// # Errors
    ///
    /// Propagates catalog fetch and selection errors unchanged.
    pub async fn plan(&self, settings: &RunSettings) -> CoreResult<Plan> {
        let candidates =
            fetch_catalog(self.provider.as_ref(), &settings.scope, settings.call_timeout()).await?;
        info!(scope = %settings.scope, count = candidates.len(), "catalog fetched");

        let results = probe_candidates(
            Arc::clone(&self.provider),
            &candidates,
            ProbeOptions {
                concurrency: settings.probe_concurrency,
                call_timeout: settings.call_timeout(),
            },
        )
        .await;
        let eligible = results.iter().filter(|result| result.is_eligible()).count();
        info!(
            probed = results.len(),
            eligible, "eligibility probe complete"
        );

        let victims = select_victims(results, settings.requested, settings.policy)?;
        info!(
            policy = %settings.policy,
            requested = settings.requested,
            selected = victims.len(),
            "victims selected"
        );
        Ok(Plan {
            candidates: candidates.len(),
            eligible,
            victims,
        })
    }

    /// Run the whole pipeline including the irreversible phases.
    ///
    /// # Errors
    ///
    /// Propagates catalog, selection, and orchestration errors unchanged.
    pub async fn run(&self, settings: &RunSettings) -> CoreResult<RunReport> {
        let plan = self.plan(settings).await?;
        let orchestrator = Orchestrator::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.remover),
            settings.orchestrator,
        );
        let decommission = orchestrator
            .decommission(plan.victims.clone(), &settings.client_token)
            .await?;
        Ok(RunReport { plan, decommission })
    }
}
