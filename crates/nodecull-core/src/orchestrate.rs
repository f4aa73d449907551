//! Decommission sequencing: cluster removal, stop, terminate.
//!
//! # Design
//! - Phases run strictly in order and abort on the first failure; nothing is retried or rolled back.
//! - Progress is tracked locally so a failure reports exactly which side effects already happened.
//! - Cluster removal has no dry-run mode; callers opt out of it via `skip_cluster_removal`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{OrchestrationFailure, PhaseCause, RemovalError};
use crate::model::{InstanceId, VictimSet};
use crate::provider::{CloudProvider, ClusterRemover, with_deadline};

/// Decommission phase identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Remove nodes from the scheduling pool.
    ClusterRemoval,
    /// Stop each instance.
    Stop,
    /// Delete the instance batch.
    Terminate,
}

impl Phase {
    /// Stable label used in logs and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClusterRemoval => "cluster-removal",
            Self::Stop => "stop",
            Self::Terminate => "terminate",
        }
    }
}

/// Knobs applied to every decommission run.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorOptions {
    /// Ask the provider to validate stop/terminate without applying them.
    pub dry_run: bool,
    /// Skip cluster removal entirely.
    pub skip_cluster_removal: bool,
    /// Deadline for each provider call.
    pub call_timeout: Duration,
    /// Deadline for the cluster-removal invocation.
    pub removal_timeout: Duration,
}

impl Default for OrchestratorOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            skip_cluster_removal: false,
            call_timeout: Duration::from_secs(30),
            removal_timeout: Duration::from_secs(600),
        }
    }
}

/// Summary of a decommission run that completed every phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecommissionReport {
    /// Phases that ran (skipped phases are absent).
    pub phases: Vec<Phase>,
    /// Instances stopped, in order.
    pub stopped: Vec<InstanceId>,
    /// Instances submitted for deletion.
    pub terminated: Vec<InstanceId>,
    /// Whether stop/terminate ran in validation-only mode.
    pub dry_run: bool,
}

/// Applies the irreversible side effects for a victim set.
pub struct Orchestrator {
    provider: Arc<dyn CloudProvider>,
    remover: Arc<dyn ClusterRemover>,
    options: OrchestratorOptions,
}

impl Orchestrator {
    /// Construct an orchestrator over the given collaborators.
    #[must_use]
    pub fn new(
        provider: Arc<dyn CloudProvider>,
        remover: Arc<dyn ClusterRemover>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            provider,
            remover,
            options,
        }
    }

    /// Remove, stop, and terminate every victim, in that order.
    ///
    /// # Errors
    ///
    /// Returns an [`OrchestrationFailure`] naming the failed phase and the
    /// progress made before it.
    pub async fn decommission(
        &self,
        victims: VictimSet,
        client_token: &str,
    ) -> Result<DecommissionReport, OrchestrationFailure> {
        let mut report = DecommissionReport {
            phases: Vec::new(),
            stopped: Vec::new(),
            terminated: Vec::new(),
            dry_run: self.options.dry_run,
        };
        if victims.is_empty() {
            info!("no victims selected; nothing to decommission");
            return Ok(report);
        }

        let mut cluster_removed = false;
        if self.options.skip_cluster_removal {
            warn!(count = victims.len(), "cluster removal skipped by request");
        } else {
            self.remove_from_cluster(&victims).await.map_err(|err| {
                OrchestrationFailure {
                    phase: Phase::ClusterRemoval,
                    cluster_removed: false,
                    stopped: Vec::new(),
                    failed_instance: None,
                    cause: PhaseCause::Removal(err),
                }
            })?;
            cluster_removed = true;
            report.phases.push(Phase::ClusterRemoval);
        }

        let ids = victims.ids();
        for id in &ids {
            info!(instance_id = %id, dry_run = self.options.dry_run, "stopping instance");
            let stopped = with_deadline(
                "StopInstance",
                self.options.call_timeout,
                self.provider.stop_instance(id, self.options.dry_run),
            )
            .await;
            if let Err(err) = stopped {
                return Err(OrchestrationFailure {
                    phase: Phase::Stop,
                    cluster_removed,
                    stopped: report.stopped,
                    failed_instance: Some(id.clone()),
                    cause: PhaseCause::Provider(err),
                });
            }
            report.stopped.push(id.clone());
        }
        report.phases.push(Phase::Stop);

        info!(count = ids.len(), dry_run = self.options.dry_run, "terminating instances");
        with_deadline(
            "DeleteInstances",
            self.options.call_timeout,
            self.provider
                .delete_instances(&ids, client_token, self.options.dry_run),
        )
        .await
        .map_err(|err| OrchestrationFailure {
            phase: Phase::Terminate,
            cluster_removed,
            stopped: report.stopped.clone(),
            failed_instance: None,
            cause: PhaseCause::Provider(err),
        })?;
        report.terminated = ids;
        report.phases.push(Phase::Terminate);

        Ok(report)
    }

    async fn remove_from_cluster(&self, victims: &VictimSet) -> Result<(), RemovalError> {
        let nodes = victims.node_refs();
        info!(count = nodes.len(), "removing nodes from cluster");
        tokio::time::timeout(self.options.removal_timeout, self.remover.remove_nodes(&nodes))
            .await
            .map_err(|_| RemovalError::Timeout {
                after: self.options.removal_timeout,
            })?
    }
}
