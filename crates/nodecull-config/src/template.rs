//! Starter configuration document for `template show` and `template create`.

use std::path::Path;

use tracing::info;

use crate::error::{ConfigError, ConfigResult};

/// Annotated example configuration covering both cluster types.
pub const TEMPLATE: &str = r#"# Cluster mode: "fixed" removes operator-listed nodes from the cluster only;
# "dynamic" discovers cloud instances, removes them from the cluster, then
# stops and deletes them.
cluster-type: "fixed"

fixed:
  ssh-port: 22
  user-name: "root"
  # Set one of ssh-key-file or password; the key file is used when both are set.
  ssh-key-file: "./id_rsa"
  password: "change-me"
  # Removal preference order. Only nodes currently labelled as workers are removed.
  nodes:
    - inner-ip: "172.17.0.2"
      host-name: "worker-a"
    - inner-ip: "172.17.0.3"
      host-name: "worker-b"

dynamic:
  cloud-provider: "aliyun"
  aliyun:
    region-id: "cn-shenzhen"
    # NODECULL_ACCESS_KEY_ID / NODECULL_ACCESS_KEY_SECRET override these two.
    access-key-id: "your-access-key-id"
    access-key-secret: "your-access-key-secret"
    vpc-id: "vpc-xxxxxxxx"
    ssh-port: 22
    ssh-key-file: "./id_rsa"
    # password: "change-me"
    # oldest | newest | unordered (default oldest)
    delete-strategy: "oldest"
    # true asks the provider to validate stop/delete without applying them.
    debug: false
    # endpoint: "https://ecs.cn-shenzhen.aliyuncs.com"

# Nodes to remove. The --node-count flag is used when this key is absent.
# node-count: 1

# runtime:
#   removal-script: "./delete-k8s.sh"
#   call-timeout-secs: 30
#   removal-timeout-secs: 600
#   probe-concurrency: 32
#   worker-label: "openwhisk-role=invoker"
"#;

/// Write [`TEMPLATE`] to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be written.
pub fn write_template(path: &Path) -> ConfigResult<()> {
    std::fs::write(path, TEMPLATE).map_err(|source| ConfigError::Io {
        operation: "write",
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "configuration template written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_config, parse_config};
    use crate::model::ClusterType;

    #[test]
    fn template_is_a_valid_configuration() -> anyhow::Result<()> {
        let config = parse_config(Path::new("template"), TEMPLATE, |_| None)?;
        assert_eq!(config.cluster_type()?, ClusterType::Fixed);
        assert_eq!(config.fixed_section()?.nodes.len(), 2);
        assert!(config.aliyun_section().is_ok());
        Ok(())
    }

    #[test]
    fn template_switched_to_dynamic_is_valid() -> anyhow::Result<()> {
        let raw = TEMPLATE.replace(r#"cluster-type: "fixed""#, r#"cluster-type: "dynamic""#);
        let config = parse_config(Path::new("template"), &raw, |_| None)?;
        assert_eq!(config.cluster_type()?, ClusterType::Dynamic);
        Ok(())
    }

    #[test]
    fn write_template_round_trips_through_loader() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("node-deleter-configs.yaml");
        std::fs::write(&path, "stale")?;
        write_template(&path)?;
        assert_eq!(std::fs::read_to_string(&path)?, TEMPLATE);
        load_config(&path)?;
        Ok(())
    }

    #[test]
    fn write_template_reports_unwritable_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = write_template(&dir.path().join("missing").join("config.yaml"))
            .expect_err("parent directory is absent");
        assert!(matches!(err, ConfigError::Io { operation: "write", .. }));
        Ok(())
    }
}
