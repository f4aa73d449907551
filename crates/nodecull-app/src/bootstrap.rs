//! Configuration to collaborators to pipeline.
//!
//! # Design
//! - Every run gets one identifier, used as the batch-delete idempotency token
//!   and recorded on the run span.
//! - The command-line dry-run flag can only turn dry-run on, never off.
//! - Collaborator construction is separated from execution so runs can be
//!   driven against fakes.

use std::path::PathBuf;
use std::sync::Arc;

use nodecull_config::{ClusterType, TopLevelConfig, load_config};
use nodecull_core::{
    CloudProvider, ClusterRemover, Decommissioner, OrchestratorOptions, RunReport, RunSettings,
};
use nodecull_ecs::{Credentials, EcsClient, EcsSettings};
use nodecull_telemetry::{RunContextGuard, current_run_id, with_run_context};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::fixed::{FixedRunReport, KubectlNodeLister, run_fixed};
use crate::remover::{DEFAULT_DYNAMIC_USER, ScriptClusterRemover};

/// Command-line inputs to a run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Configuration file path.
    pub config_path: PathBuf,
    /// Node count used when the configuration omits `node-count`.
    pub node_count: usize,
    /// Force provider dry-run regardless of configuration.
    pub dry_run: bool,
    /// Skip the cluster-removal phase.
    pub skip_cluster_removal: bool,
}

/// Result of a completed run, per cluster mode.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum RunOutcome {
    /// Fixed-cluster run.
    Fixed(FixedRunReport),
    /// Cloud-backed run.
    Dynamic(RunReport),
}

/// Load configuration and run the decommission it describes.
///
/// # Errors
///
/// Returns [`AppError::Config`] for unreadable or invalid configuration, and
/// the mode-specific error when the run itself fails.
pub async fn run_app(options: &RunOptions) -> AppResult<RunOutcome> {
    let config =
        load_config(&options.config_path).map_err(|err| AppError::config("config.load", err))?;
    let cluster_type = config
        .cluster_type()
        .map_err(|err| AppError::config("config.cluster_type", err))?;
    let requested = config
        .node_count_or(options.node_count)
        .map_err(|err| AppError::config("config.node_count", err))?;

    let run_id = Uuid::new_v4().to_string();
    let context = RunContextGuard::new(cluster_type.as_str());
    context.record_run_id(&run_id);
    info!(
        config = %options.config_path.display(),
        requested,
        "decommission run starting"
    );

    with_run_context(run_id.clone(), async {
        match cluster_type {
            ClusterType::Fixed => run_fixed_mode(&config, requested, options)
                .await
                .map(RunOutcome::Fixed),
            ClusterType::Dynamic => {
                let settings = dynamic_settings(&config, options, requested, run_id.clone())?;
                let (provider, remover) = dynamic_collaborators(&config)?;
                run_dynamic(provider, remover, &settings)
                    .await
                    .map(RunOutcome::Dynamic)
            }
        }
    })
    .await
}

async fn run_fixed_mode(
    config: &TopLevelConfig,
    requested: usize,
    options: &RunOptions,
) -> AppResult<FixedRunReport> {
    let fixed = config
        .fixed_section()
        .map_err(|err| AppError::config("config.fixed", err))?;
    let remover = ScriptClusterRemover::new(
        config.runtime.removal_script(),
        fixed
            .ssh_port()
            .map_err(|err| AppError::config("config.fixed.ssh_port", err))?,
        fixed.user_name(),
        fixed
            .credential()
            .map_err(|err| AppError::config("config.fixed.credential", err))?,
    );
    let directory = KubectlNodeLister::new(config.runtime.worker_label());
    run_fixed(
        &fixed.nodes,
        requested,
        &directory,
        &remover,
        orchestrator_options(config, options, false),
    )
    .await
}

fn orchestrator_options(
    config: &TopLevelConfig,
    options: &RunOptions,
    provider_dry_run: bool,
) -> OrchestratorOptions {
    OrchestratorOptions {
        dry_run: provider_dry_run || options.dry_run,
        skip_cluster_removal: options.skip_cluster_removal,
        call_timeout: config.runtime.call_timeout(),
        removal_timeout: config.runtime.removal_timeout(),
    }
}

/// Pipeline settings for a dynamic-mode run.
///
/// # Errors
///
/// Returns [`AppError::Config`] when the cloud section is missing or its
/// strategy is unknown.
pub fn dynamic_settings(
    config: &TopLevelConfig,
    options: &RunOptions,
    requested: usize,
    run_id: String,
) -> AppResult<RunSettings> {
    let aliyun = config
        .aliyun_section()
        .map_err(|err| AppError::config("config.aliyun", err))?;
    let mut settings = RunSettings::new(aliyun.vpc_id.clone(), requested, run_id);
    settings.policy = aliyun
        .policy()
        .map_err(|err| AppError::config("config.aliyun.delete_strategy", err))?;
    settings.probe_concurrency = config.runtime.probe_concurrency();
    settings.orchestrator = orchestrator_options(config, options, aliyun.dry_run());
    Ok(settings)
}

fn dynamic_collaborators(
    config: &TopLevelConfig,
) -> AppResult<(Arc<dyn CloudProvider>, Arc<dyn ClusterRemover>)> {
    let aliyun = config
        .aliyun_section()
        .map_err(|err| AppError::config("config.aliyun", err))?;
    let client = EcsClient::new(EcsSettings {
        region_id: aliyun.region_id.clone(),
        credentials: Credentials {
            access_key_id: aliyun.access_key_id.clone(),
            access_key_secret: aliyun.access_key_secret.clone(),
        },
        endpoint: aliyun.endpoint().map(str::to_string),
        request_timeout: config.runtime.call_timeout(),
    })
    .map_err(|err| AppError::ecs("ecs.client", err))?;
    let remover = ScriptClusterRemover::new(
        config.runtime.removal_script(),
        aliyun
            .ssh_port()
            .map_err(|err| AppError::config("config.aliyun.ssh_port", err))?,
        DEFAULT_DYNAMIC_USER,
        aliyun
            .credential()
            .map_err(|err| AppError::config("config.aliyun.credential", err))?,
    );
    Ok((Arc::new(client), Arc::new(remover)))
}

/// Run the cloud pipeline against the given collaborators.
///
/// # Errors
///
/// Returns [`AppError::Decommission`] wrapping the pipeline error unchanged.
pub async fn run_dynamic(
    provider: Arc<dyn CloudProvider>,
    remover: Arc<dyn ClusterRemover>,
    settings: &RunSettings,
) -> AppResult<RunReport> {
    let report = Decommissioner::new(provider, remover)
        .run(settings)
        .await
        .map_err(|err| AppError::decommission("pipeline.run", err))?;
    let run_id = current_run_id().unwrap_or_default();
    info!(
        run_id = %run_id,
        victims = report.plan.victims.len(),
        dry_run = report.decommission.dry_run,
        "decommission run finished"
    );
    Ok(report)
}
