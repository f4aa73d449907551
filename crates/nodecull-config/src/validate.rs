//! Validation helpers and typed accessors over the configuration document.

use nodecull_core::SelectionPolicy;
use tracing::info;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{
    AliyunConfig, ClusterType, FixedConfig, RuntimeConfig, SshCredential, TopLevelConfig,
};

/// Check every field the selected cluster type depends on.
///
/// # Errors
///
/// Returns the first [`ConfigError`] encountered.
pub fn validate(config: &TopLevelConfig) -> ConfigResult<()> {
    config.node_count_or(1)?;
    validate_runtime(&config.runtime)?;
    match config.cluster_type()? {
        ClusterType::Fixed => {
            let fixed = config.fixed_section()?;
            fixed.ssh_port()?;
            fixed.credential()?;
            for node in &fixed.nodes {
                require_non_empty("fixed.nodes", "host-name", &node.host_name)?;
                require_non_empty("fixed.nodes", "inner-ip", &node.inner_ip)?;
            }
        }
        ClusterType::Dynamic => {
            let aliyun = config.aliyun_section()?;
            require_non_empty("dynamic.aliyun", "region-id", &aliyun.region_id)?;
            require_non_empty("dynamic.aliyun", "access-key-id", &aliyun.access_key_id)?;
            require_non_empty(
                "dynamic.aliyun",
                "access-key-secret",
                &aliyun.access_key_secret,
            )?;
            require_non_empty("dynamic.aliyun", "vpc-id", &aliyun.vpc_id)?;
            aliyun.ssh_port()?;
            aliyun.credential()?;
            aliyun.policy()?;
        }
    }
    Ok(())
}

impl TopLevelConfig {
    /// Parsed cluster type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for anything but `fixed` or `dynamic`.
    pub fn cluster_type(&self) -> ConfigResult<ClusterType> {
        match self.cluster_type.trim() {
            "fixed" => Ok(ClusterType::Fixed),
            "dynamic" => Ok(ClusterType::Dynamic),
            other => Err(ConfigError::invalid(
                "root",
                "cluster-type",
                Some(other.to_string()),
                "must be 'fixed' or 'dynamic'",
            )),
        }
    }

    /// Node count from the file, or `fallback` when the file omits it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for a negative count.
    pub fn node_count_or(&self, fallback: usize) -> ConfigResult<usize> {
        self.node_count.map_or(Ok(fallback), |count| {
            usize::try_from(count).map_err(|_| {
                ConfigError::invalid(
                    "root",
                    "node-count",
                    Some(count.to_string()),
                    "must not be negative",
                )
            })
        })
    }

    /// The `fixed` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSection`] when absent.
    pub fn fixed_section(&self) -> ConfigResult<&FixedConfig> {
        self.fixed
            .as_ref()
            .ok_or(ConfigError::MissingSection { section: "fixed" })
    }

    /// The `dynamic.aliyun` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSection`] when either level is absent and
    /// [`ConfigError::InvalidField`] for an unsupported cloud provider.
    pub fn aliyun_section(&self) -> ConfigResult<&AliyunConfig> {
        let dynamic = self
            .dynamic
            .as_ref()
            .ok_or(ConfigError::MissingSection { section: "dynamic" })?;
        if dynamic.cloud_provider.trim() != defaults::CLOUD_PROVIDER {
            return Err(ConfigError::invalid(
                "dynamic",
                "cloud-provider",
                Some(dynamic.cloud_provider.clone()),
                "only 'aliyun' is supported",
            ));
        }
        dynamic.aliyun.as_ref().ok_or(ConfigError::MissingSection {
            section: "dynamic.aliyun",
        })
    }
}

impl FixedConfig {
    /// SSH port, defaulting to 22.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] outside 1..=65535.
    pub fn ssh_port(&self) -> ConfigResult<u16> {
        parse_port("fixed", self.ssh_port)
    }

    /// SSH user, defaulting to `root`.
    #[must_use]
    pub fn user_name(&self) -> &str {
        self.user_name
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults::SSH_USER)
    }

    /// Key file when set, otherwise password.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when neither is set.
    pub fn credential(&self) -> ConfigResult<SshCredential> {
        credential(
            "fixed",
            self.ssh_key_file.as_deref(),
            self.password.as_deref(),
        )
    }
}

impl AliyunConfig {
    /// SSH port, defaulting to 22.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] outside 1..=65535.
    pub fn ssh_port(&self) -> ConfigResult<u16> {
        parse_port("dynamic.aliyun", self.ssh_port)
    }

    /// Key file when set, otherwise password.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when neither is set.
    pub fn credential(&self) -> ConfigResult<SshCredential> {
        credential(
            "dynamic.aliyun",
            self.ssh_key_file.as_deref(),
            self.password.as_deref(),
        )
    }

    /// Victim ordering. An absent strategy means oldest-first.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] for an unknown strategy.
    pub fn policy(&self) -> ConfigResult<SelectionPolicy> {
        let Some(raw) = self.delete_strategy.as_deref() else {
            info!(
                policy = %SelectionPolicy::OldestFirst,
                "delete-strategy not set; using default"
            );
            return Ok(SelectionPolicy::OldestFirst);
        };
        raw.parse().map_err(|_| {
            ConfigError::invalid(
                "dynamic.aliyun",
                "delete-strategy",
                Some(raw.to_string()),
                "must be oldest, newest, or unordered",
            )
        })
    }
}

fn validate_runtime(runtime: &RuntimeConfig) -> ConfigResult<()> {
    if runtime.call_timeout_secs == Some(0) {
        return Err(ConfigError::invalid(
            "runtime",
            "call-timeout-secs",
            Some("0".to_string()),
            "must be greater than zero",
        ));
    }
    if runtime.removal_timeout_secs == Some(0) {
        return Err(ConfigError::invalid(
            "runtime",
            "removal-timeout-secs",
            Some("0".to_string()),
            "must be greater than zero",
        ));
    }
    if runtime.probe_concurrency == Some(0) {
        return Err(ConfigError::invalid(
            "runtime",
            "probe-concurrency",
            Some("0".to_string()),
            "must be at least 1",
        ));
    }
    require_non_empty("runtime", "removal-script", runtime.removal_script())?;
    require_non_empty("runtime", "worker-label", runtime.worker_label())
}

fn parse_port(section: &'static str, value: Option<i64>) -> ConfigResult<u16> {
    let Some(port) = value else {
        return Ok(defaults::SSH_PORT);
    };
    u16::try_from(port)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| {
            ConfigError::invalid(
                section,
                "ssh-port",
                Some(port.to_string()),
                "must be between 1 and 65535",
            )
        })
}

fn credential(
    section: &'static str,
    key_file: Option<&str>,
    password: Option<&str>,
) -> ConfigResult<SshCredential> {
    fn present(value: Option<&str>) -> Option<&str> {
        value.map(str::trim).filter(|value| !value.is_empty())
    }
    if let Some(path) = present(key_file) {
        return Ok(SshCredential::KeyFile(path.to_string()));
    }
    if let Some(password) = password.filter(|value| !value.is_empty()) {
        return Ok(SshCredential::Password(password.to_string()));
    }
    Err(ConfigError::invalid(
        section,
        "ssh-key-file",
        None,
        "either ssh-key-file or password is required",
    ))
}

fn require_non_empty(section: &'static str, field: &'static str, value: &str) -> ConfigResult<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(section, field, None, "must not be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DynamicConfig, NodeInfo};

    fn aliyun() -> AliyunConfig {
        AliyunConfig {
            region_id: "cn-shenzhen".to_string(),
            access_key_id: "akid".to_string(),
            access_key_secret: "secret".to_string(),
            vpc_id: "vpc-1".to_string(),
            password: Some("pw".to_string()),
            ..AliyunConfig::default()
        }
    }

    fn dynamic(aliyun: AliyunConfig) -> TopLevelConfig {
        TopLevelConfig {
            cluster_type: "dynamic".to_string(),
            node_count: None,
            fixed: None,
            dynamic: Some(DynamicConfig {
                cloud_provider: "aliyun".to_string(),
                aliyun: Some(aliyun),
            }),
            runtime: RuntimeConfig::default(),
        }
    }

    fn fixed(section: FixedConfig) -> TopLevelConfig {
        TopLevelConfig {
            cluster_type: "fixed".to_string(),
            node_count: Some(2),
            fixed: Some(section),
            dynamic: None,
            runtime: RuntimeConfig::default(),
        }
    }

    fn assert_invalid(result: ConfigResult<()>, expected: &str) {
        match result {
            Err(ConfigError::InvalidField { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }

    #[test]
    fn complete_dynamic_config_is_valid() -> ConfigResult<()> {
        let config = dynamic(aliyun());
        validate(&config)?;
        let section = config.aliyun_section()?;
        assert_eq!(section.ssh_port()?, 22);
        assert_eq!(section.policy()?, SelectionPolicy::OldestFirst);
        assert!(!section.dry_run());
        assert_eq!(
            section.credential()?,
            SshCredential::Password("pw".to_string())
        );
        Ok(())
    }

    #[test]
    fn unknown_cluster_type_is_rejected() {
        let mut config = dynamic(aliyun());
        config.cluster_type = "elastic".to_string();
        assert_invalid(validate(&config), "cluster-type");
    }

    #[test]
    fn unsupported_provider_is_rejected() {
        let mut config = dynamic(aliyun());
        if let Some(section) = config.dynamic.as_mut() {
            section.cloud_provider = "gcp".to_string();
        }
        assert_invalid(validate(&config), "cloud-provider");
    }

    #[test]
    fn missing_credentials_and_ids_are_rejected() {
        assert_invalid(
            validate(&dynamic(AliyunConfig {
                vpc_id: String::new(),
                ..aliyun()
            })),
            "vpc-id",
        );
        assert_invalid(
            validate(&dynamic(AliyunConfig {
                access_key_secret: " ".to_string(),
                ..aliyun()
            })),
            "access-key-secret",
        );
        assert_invalid(
            validate(&dynamic(AliyunConfig {
                password: None,
                ..aliyun()
            })),
            "ssh-key-file",
        );
    }

    #[test]
    fn key_file_wins_over_password() -> ConfigResult<()> {
        let section = AliyunConfig {
            ssh_key_file: Some("./id_rsa".to_string()),
            ..aliyun()
        };
        assert_eq!(
            section.credential()?,
            SshCredential::KeyFile("./id_rsa".to_string())
        );
        Ok(())
    }

    #[test]
    fn port_bounds_are_enforced() {
        for bad in [0, -1, 70_000] {
            assert_invalid(
                validate(&dynamic(AliyunConfig {
                    ssh_port: Some(bad),
                    ..aliyun()
                })),
                "ssh-port",
            );
        }
    }

    #[test]
    fn strategy_aliases_and_unknown_values() -> ConfigResult<()> {
        let with = |strategy: &str| AliyunConfig {
            delete_strategy: Some(strategy.to_string()),
            ..aliyun()
        };
        assert_eq!(with("latest").policy()?, SelectionPolicy::NewestFirst);
        assert_eq!(with("oldest").policy()?, SelectionPolicy::OldestFirst);
        assert_eq!(with("unordered").policy()?, SelectionPolicy::Unordered);
        assert_invalid(validate(&dynamic(with("random"))), "delete-strategy");
        Ok(())
    }

    #[test]
    fn negative_node_count_is_rejected() {
        let mut config = dynamic(aliyun());
        config.node_count = Some(-3);
        assert_invalid(validate(&config), "node-count");
    }

    #[test]
    fn node_count_falls_back_when_absent() -> ConfigResult<()> {
        let mut config = dynamic(aliyun());
        assert_eq!(config.node_count_or(4)?, 4);
        config.node_count = Some(0);
        assert_eq!(config.node_count_or(4)?, 0);
        Ok(())
    }

    #[test]
    fn zero_runtime_limits_are_rejected() {
        let mut config = dynamic(aliyun());
        config.runtime.probe_concurrency = Some(0);
        assert_invalid(validate(&config), "probe-concurrency");

        let mut config = dynamic(aliyun());
        config.runtime.call_timeout_secs = Some(0);
        assert_invalid(validate(&config), "call-timeout-secs");
    }

    #[test]
    fn fixed_mode_requires_its_section() {
        let mut config = fixed(FixedConfig::default());
        config.fixed = None;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::MissingSection { section: "fixed" })
        ));
    }

    #[test]
    fn fixed_mode_defaults_user_and_port() -> ConfigResult<()> {
        let config = fixed(FixedConfig {
            ssh_key_file: Some("./key".to_string()),
            nodes: vec![NodeInfo {
                inner_ip: "172.17.0.2".to_string(),
                host_name: "a".to_string(),
            }],
            ..FixedConfig::default()
        });
        validate(&config)?;
        let section = config.fixed_section()?;
        assert_eq!(section.user_name(), "root");
        assert_eq!(section.ssh_port()?, 22);
        Ok(())
    }

    #[test]
    fn fixed_nodes_need_names() {
        let config = fixed(FixedConfig {
            password: Some("pw".to_string()),
            nodes: vec![NodeInfo {
                inner_ip: "172.17.0.2".to_string(),
                host_name: String::new(),
            }],
            ..FixedConfig::default()
        });
        assert_invalid(validate(&config), "host-name");
    }
}
