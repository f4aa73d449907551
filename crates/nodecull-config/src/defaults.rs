//! Fallback values applied when the configuration omits a key.

/// Configuration path used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "./node-deleter-configs.yaml";
/// SSH port used to reach cluster nodes.
pub(crate) const SSH_PORT: u16 = 22;
/// SSH user for fixed-mode nodes.
pub(crate) const SSH_USER: &str = "root";
/// Removal script invoked for cluster removal.
pub(crate) const REMOVAL_SCRIPT: &str = "./delete-k8s.sh";
/// Per provider call deadline.
pub(crate) const CALL_TIMEOUT_SECS: u64 = 30;
/// Deadline for the removal script.
pub(crate) const REMOVAL_TIMEOUT_SECS: u64 = 600;
/// Label selecting worker nodes in fixed mode.
pub(crate) const WORKER_LABEL: &str = "openwhisk-role=invoker";
/// Only supported dynamic cloud provider.
pub(crate) const CLOUD_PROVIDER: &str = "aliyun";
