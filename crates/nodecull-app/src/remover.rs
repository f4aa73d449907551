//! Cluster removal through the operator-supplied removal script.
//!
//! # Design
//! - The script receives comma-joined addresses and host names in victim order.
//! - A key file is passed with `-s`, a password with `-p`; never both.
//! - The child process is killed when the caller abandons the call (deadline expiry).

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use nodecull_config::SshCredential;
use nodecull_core::{ClusterRemover, NodeRef, RemovalError};
use tokio::process::Command;
use tracing::{debug, info};

/// SSH user for dynamic-mode nodes, which have no configurable user.
pub const DEFAULT_DYNAMIC_USER: &str = "root";

/// Invokes the removal script once per batch.
#[derive(Debug, Clone)]
pub struct ScriptClusterRemover {
    script: PathBuf,
    ssh_port: u16,
    user: String,
    credential: SshCredential,
}

impl ScriptClusterRemover {
    /// Build a remover for `script` with the given SSH settings.
    #[must_use]
    pub fn new(
        script: impl Into<PathBuf>,
        ssh_port: u16,
        user: impl Into<String>,
        credential: SshCredential,
    ) -> Self {
        Self {
            script: script.into(),
            ssh_port,
            user: user.into(),
            credential,
        }
    }

    /// Command-line arguments for a batch.
    ///
    /// # Errors
    ///
    /// Returns [`RemovalError::InvalidInput`] for an empty batch or a node
    /// without an address or host name.
    pub fn arguments(&self, nodes: &[NodeRef]) -> Result<Vec<String>, RemovalError> {
        if nodes.is_empty() {
            return Err(RemovalError::InvalidInput {
                reason: "no nodes to remove",
            });
        }
        if nodes.iter().any(|node| node.internal_ip.is_empty()) {
            return Err(RemovalError::InvalidInput {
                reason: "node has no internal address",
            });
        }
        if nodes.iter().any(|node| node.host_name.is_empty()) {
            return Err(RemovalError::InvalidInput {
                reason: "node has no host name",
            });
        }

        let ips = join(nodes, |node| node.internal_ip.as_str());
        let names = join(nodes, |node| node.host_name.as_str());
        let (flag, secret) = match &self.credential {
            SshCredential::KeyFile(path) => ("-s", path.clone()),
            SshCredential::Password(password) => ("-p", password.clone()),
        };
        Ok(vec![
            "-h".to_string(),
            ips,
            "-P".to_string(),
            self.ssh_port.to_string(),
            "-n".to_string(),
            names,
            "-u".to_string(),
            self.user.clone(),
            flag.to_string(),
            secret,
        ])
    }
}

fn join(nodes: &[NodeRef], field: impl Fn(&NodeRef) -> &str) -> String {
    nodes.iter().map(field).collect::<Vec<_>>().join(",")
}

#[async_trait]
impl ClusterRemover for ScriptClusterRemover {
    async fn remove_nodes(&self, nodes: &[NodeRef]) -> Result<(), RemovalError> {
        let arguments = self.arguments(nodes)?;
        let program = self.script.display().to_string();
        info!(script = %program, count = nodes.len(), "invoking removal script");

        let output = Command::new(&self.script)
            .args(&arguments)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| RemovalError::Launch {
                program: program.clone(),
                source,
            })?;

        if output.status.success() {
            debug!(
                stdout = %String::from_utf8_lossy(&output.stdout).trim(),
                "removal script finished"
            );
            return Ok(());
        }
        Err(RemovalError::Exit {
            program,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
