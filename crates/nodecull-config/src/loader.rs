//! Reads the configuration file and applies environment overrides.
//!
//! # Design
//! - Environment lookups are injected so tests never touch process state.
//! - Overrides are applied before validation, so a credential supplied only via the
//!   environment still satisfies the required-field checks.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::model::TopLevelConfig;
use crate::validate::validate;

/// Replaces `dynamic.aliyun.access-key-id` when set.
pub const ENV_ACCESS_KEY_ID: &str = "NODECULL_ACCESS_KEY_ID";
/// Replaces `dynamic.aliyun.access-key-secret` when set.
pub const ENV_ACCESS_KEY_SECRET: &str = "NODECULL_ACCESS_KEY_SECRET";

/// Load, override from the process environment, and validate a config file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read,
/// [`ConfigError::Parse`] for malformed YAML, and any validation error.
pub fn load_config(path: &Path) -> ConfigResult<TopLevelConfig> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "read",
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(path, &raw, |key| std::env::var(key).ok())?;
    info!(
        path = %path.display(),
        cluster_type = %config.cluster_type,
        "configuration loaded"
    );
    Ok(config)
}

/// Parse a document, apply overrides from `lookup`, and validate it.
///
/// `path` is only used for error context.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed YAML and any validation error.
pub fn parse_config(
    path: &Path,
    raw: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<TopLevelConfig> {
    let mut config: TopLevelConfig =
        serde_yaml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    apply_env_overrides(&mut config, lookup);
    validate(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut TopLevelConfig, lookup: impl Fn(&str) -> Option<String>) {
    let Some(aliyun) = config
        .dynamic
        .as_mut()
        .and_then(|dynamic| dynamic.aliyun.as_mut())
    else {
        return;
    };
    if let Some(value) = lookup(ENV_ACCESS_KEY_ID).filter(|value| !value.is_empty()) {
        debug!(variable = ENV_ACCESS_KEY_ID, "access key id taken from environment");
        aliyun.access_key_id = value;
    }
    if let Some(value) = lookup(ENV_ACCESS_KEY_SECRET).filter(|value| !value.is_empty()) {
        debug!(
            variable = ENV_ACCESS_KEY_SECRET,
            "access key secret taken from environment"
        );
        aliyun.access_key_secret = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const DYNAMIC: &str = r#"
cluster-type: dynamic
node-count: 3
dynamic:
  cloud-provider: aliyun
  aliyun:
    region-id: cn-shenzhen
    access-key-id: file-id
    access-key-secret: file-secret
    vpc-id: vpc-abc
    ssh-key-file: ./key
    delete-strategy: newest
    debug: true
runtime:
  probe-concurrency: 8
  call-timeout-secs: 5
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_every_dynamic_key() -> anyhow::Result<()> {
        let config = parse_config(Path::new("inline.yaml"), DYNAMIC, no_env)?;
        assert_eq!(config.node_count_or(1)?, 3);
        let aliyun = config.aliyun_section()?;
        assert_eq!(aliyun.vpc_id, "vpc-abc");
        assert_eq!(aliyun.region_id, "cn-shenzhen");
        assert!(aliyun.dry_run());
        assert_eq!(config.runtime.probe_concurrency(), 8);
        assert_eq!(config.runtime.call_timeout().as_secs(), 5);
        assert_eq!(config.runtime.removal_timeout().as_secs(), 600);
        assert_eq!(config.runtime.removal_script(), "./delete-k8s.sh");
        Ok(())
    }

    #[test]
    fn environment_replaces_file_credentials() -> anyhow::Result<()> {
        let env = HashMap::from([
            (ENV_ACCESS_KEY_ID, "env-id".to_string()),
            (ENV_ACCESS_KEY_SECRET, "env-secret".to_string()),
        ]);
        let config = parse_config(Path::new("inline.yaml"), DYNAMIC, |key| {
            env.get(key).cloned()
        })?;
        let aliyun = config.aliyun_section()?;
        assert_eq!(aliyun.access_key_id, "env-id");
        assert_eq!(aliyun.access_key_secret, "env-secret");
        Ok(())
    }

    #[test]
    fn environment_satisfies_missing_secret() -> anyhow::Result<()> {
        let raw = DYNAMIC.replace("    access-key-secret: file-secret\n", "");
        assert!(parse_config(Path::new("inline.yaml"), &raw, no_env).is_err());
        let config = parse_config(Path::new("inline.yaml"), &raw, |key| {
            (key == ENV_ACCESS_KEY_SECRET).then(|| "env-secret".to_string())
        })?;
        assert_eq!(config.aliyun_section()?.access_key_secret, "env-secret");
        Ok(())
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let err = parse_config(Path::new("broken.yaml"), "cluster-type: [", no_env)
            .expect_err("parse error");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn load_reads_from_disk() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(DYNAMIC.as_bytes())?;
        let config = load_config(file.path())?;
        assert_eq!(config.cluster_type, "dynamic");
        Ok(())
    }

    #[test]
    fn missing_file_is_an_io_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = load_config(&dir.path().join("absent.yaml")).expect_err("missing file");
        assert!(matches!(err, ConfigError::Io { operation: "read", .. }));
        Ok(())
    }
}
