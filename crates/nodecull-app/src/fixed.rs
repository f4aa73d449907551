//! Fixed-cluster mode.
//!
//! # Design
//! - The operator lists candidate nodes in removal preference order.
//! - Only nodes still labelled as workers are eligible; the first N in
//!   configured order are removed.
//! - There is no cloud side: removal is the only phase.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use nodecull_config::NodeInfo;
use nodecull_core::{ClusterRemover, NodeRef, OrchestratorOptions, RemovalError};
use serde::Serialize;
use tokio::process::Command;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

/// Default `kubectl` executable.
pub const KUBECTL: &str = "kubectl";

/// Source of the node names currently labelled as workers.
#[async_trait]
pub trait WorkerDirectory: Send + Sync {
    /// Worker node names in any order.
    async fn worker_names(&self) -> AppResult<Vec<String>>;
}

/// Lists worker nodes with `kubectl get nodes -l <label> -o name`.
#[derive(Debug, Clone)]
pub struct KubectlNodeLister {
    program: PathBuf,
    label: String,
}

impl KubectlNodeLister {
    /// Lister for nodes matching `label`.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            program: PathBuf::from(KUBECTL),
            label: label.into(),
        }
    }

    /// Use a different `kubectl` executable.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl WorkerDirectory for KubectlNodeLister {
    async fn worker_names(&self) -> AppResult<Vec<String>> {
        let program = self.program.display().to_string();
        let output = Command::new(&self.program)
            .args(["get", "nodes", "-l", self.label.as_str(), "-o", "name"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| AppError::Discovery {
                operation: "kubectl.get_nodes",
                program: program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(AppError::DiscoveryExit {
                operation: "kubectl.get_nodes",
                program,
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        let names = parse_node_names(&String::from_utf8_lossy(&output.stdout));
        info!(label = %self.label, count = names.len(), "worker nodes listed");
        Ok(names)
    }
}

/// Node names from `-o name` output, without the `node/` prefix.
#[must_use]
pub fn parse_node_names(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix("node/").unwrap_or(line).to_string())
        .collect()
}

/// First `count` configured nodes that are current workers, in configured order.
#[must_use]
pub fn select_fixed_nodes(
    configured: &[NodeInfo],
    workers: &[String],
    count: usize,
) -> Vec<NodeRef> {
    configured
        .iter()
        .filter(|node| workers.iter().any(|name| *name == node.host_name))
        .take(count)
        .map(|node| NodeRef {
            host_name: node.host_name.clone(),
            internal_ip: node.inner_ip.clone(),
        })
        .collect()
}

/// Outcome of a fixed-mode run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedRunReport {
    /// Nodes listed in configuration.
    pub configured: usize,
    /// Nodes currently labelled as workers.
    pub workers: usize,
    /// Nodes chosen for removal, in order.
    pub selected: Vec<NodeRef>,
    /// Whether the removal script ran.
    pub removed: bool,
}

/// Remove up to `requested` configured nodes from the cluster.
///
/// `options.dry_run` and `options.skip_cluster_removal` both stop after selection.
///
/// # Errors
///
/// Returns discovery failures from `directory` and [`AppError::Removal`]
/// when the remover fails or exceeds `options.removal_timeout`.
pub async fn run_fixed(
    configured: &[NodeInfo],
    requested: usize,
    directory: &dyn WorkerDirectory,
    remover: &dyn ClusterRemover,
    options: OrchestratorOptions,
) -> AppResult<FixedRunReport> {
    let workers = directory.worker_names().await?;
    let selected = select_fixed_nodes(configured, &workers, requested);
    info!(
        configured = configured.len(),
        workers = workers.len(),
        requested,
        selected = selected.len(),
        "fixed nodes selected"
    );
    let mut report = FixedRunReport {
        configured: configured.len(),
        workers: workers.len(),
        selected,
        removed: false,
    };

    if report.selected.is_empty() {
        info!("no configured node is a current worker; nothing to remove");
        return Ok(report);
    }
    if options.dry_run || options.skip_cluster_removal {
        warn!(
            count = report.selected.len(),
            dry_run = options.dry_run,
            "cluster removal not executed"
        );
        return Ok(report);
    }

    tokio::time::timeout(options.removal_timeout, remover.remove_nodes(&report.selected))
        .await
        .map_err(|_| {
            AppError::removal(
                "fixed.remove_nodes",
                RemovalError::Timeout {
                    after: options.removal_timeout,
                },
            )
        })?
        .map_err(|err| AppError::removal("fixed.remove_nodes", err))?;
    report.removed = true;
    Ok(report)
}
