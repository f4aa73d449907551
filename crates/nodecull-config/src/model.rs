//! YAML document types.
//!
//! # Design
//! - Field names follow the kebab-case keys of the on-disk document.
//! - Optional keys stay `Option` here; defaults and checks live in `validate.rs`.

use std::fmt::{self, Debug, Formatter};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Whole configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TopLevelConfig {
    /// `fixed` or `dynamic`.
    #[serde(default = "default_cluster_type")]
    pub cluster_type: String,
    /// Number of nodes to remove; the command line supplies it when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_count: Option<i64>,
    /// Operator-listed nodes for `fixed` clusters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<FixedConfig>,
    /// Cloud-backed settings for `dynamic` clusters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<DynamicConfig>,
    /// Process tuning shared by both modes.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

fn default_cluster_type() -> String {
    ClusterType::Fixed.as_str().to_string()
}

/// Supported cluster modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterType {
    /// Nodes come from the configuration and are only removed from the cluster.
    Fixed,
    /// Nodes come from the cloud provider and are stopped and deleted.
    Dynamic,
}

impl ClusterType {
    /// Configuration spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Dynamic => "dynamic",
        }
    }
}

/// Fixed-cluster section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FixedConfig {
    /// SSH port of the nodes (default 22).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<i64>,
    /// SSH user (default `root`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Private key used by the removal script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key_file: Option<String>,
    /// Password used when no key file is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Candidate nodes in removal preference order.
    #[serde(default)]
    pub nodes: Vec<NodeInfo>,
}

/// One operator-listed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeInfo {
    /// Internal IP.
    pub inner_ip: String,
    /// Host name as registered in the cluster.
    pub host_name: String,
}

/// Dynamic-cluster section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DynamicConfig {
    /// Cloud provider name; only `aliyun` is supported.
    pub cloud_provider: String,
    /// Alibaba Cloud ECS settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliyun: Option<AliyunConfig>,
}

/// Alibaba Cloud ECS settings.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AliyunConfig {
    /// Region identifier, e.g. `cn-shenzhen`.
    #[serde(default)]
    pub region_id: String,
    /// Access key identifier.
    #[serde(default)]
    pub access_key_id: String,
    /// Access key secret.
    #[serde(default)]
    pub access_key_secret: String,
    /// VPC whose instances are candidates.
    #[serde(default)]
    pub vpc_id: String,
    /// SSH port of the nodes (default 22).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<i64>,
    /// Private key used by the removal script.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key_file: Option<String>,
    /// Password used when no key file is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Victim ordering; `oldest-first` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_strategy: Option<String>,
    /// Run stop and delete as provider dry-runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// API endpoint override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl Debug for AliyunConfig {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AliyunConfig")
            .field("region_id", &self.region_id)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("vpc_id", &self.vpc_id)
            .field("ssh_port", &self.ssh_port)
            .field("ssh_key_file", &self.ssh_key_file)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("delete_strategy", &self.delete_strategy)
            .field("debug", &self.debug)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl AliyunConfig {
    /// Whether stop and delete should only be validated by the provider.
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.debug.unwrap_or(false)
    }

    /// Endpoint override, ignoring blank values.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Process tuning keys.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Script invoked to remove nodes from the cluster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_script: Option<String>,
    /// Deadline for each provider call, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_timeout_secs: Option<u64>,
    /// Deadline for the removal script, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_timeout_secs: Option<u64>,
    /// Maximum describe calls in flight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_concurrency: Option<usize>,
    /// Label selecting worker nodes in fixed mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_label: Option<String>,
}

impl RuntimeConfig {
    /// Removal script path.
    #[must_use]
    pub fn removal_script(&self) -> &str {
        self.removal_script
            .as_deref()
            .unwrap_or(defaults::REMOVAL_SCRIPT)
    }

    /// Provider call deadline.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(
            self.call_timeout_secs
                .unwrap_or(defaults::CALL_TIMEOUT_SECS),
        )
    }

    /// Removal script deadline.
    #[must_use]
    pub fn removal_timeout(&self) -> Duration {
        Duration::from_secs(
            self.removal_timeout_secs
                .unwrap_or(defaults::REMOVAL_TIMEOUT_SECS),
        )
    }

    /// Probe fan-out bound.
    #[must_use]
    pub fn probe_concurrency(&self) -> usize {
        self.probe_concurrency
            .unwrap_or(nodecull_core::DEFAULT_PROBE_CONCURRENCY)
    }

    /// Worker label selector.
    #[must_use]
    pub fn worker_label(&self) -> &str {
        self.worker_label.as_deref().unwrap_or(defaults::WORKER_LABEL)
    }
}

/// Credential handed to the removal script.
#[derive(Clone, PartialEq, Eq)]
pub enum SshCredential {
    /// Private key file path.
    KeyFile(String),
    /// Login password.
    Password(String),
}

impl Debug for SshCredential {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyFile(path) => formatter.debug_tuple("KeyFile").field(path).finish(),
            Self::Password(_) => formatter.debug_tuple("Password").field(&"<redacted>").finish(),
        }
    }
}
