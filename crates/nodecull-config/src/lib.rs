#![forbid(unsafe_code)]
#![warn(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]

//! File-backed configuration for the node decommissioning tool.
//!
//! Layout: `model.rs` (YAML document types), `defaults.rs` (fallback values),
//! `validate.rs` (field checks and typed accessors), `loader.rs` (file read and
//! environment overrides), `template.rs` (starter document).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod template;
pub mod validate;

pub use defaults::DEFAULT_CONFIG_PATH;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_ACCESS_KEY_ID, ENV_ACCESS_KEY_SECRET, load_config, parse_config};
pub use model::{
    AliyunConfig, ClusterType, DynamicConfig, FixedConfig, NodeInfo, RuntimeConfig,
    SshCredential, TopLevelConfig,
};
pub use template::{TEMPLATE, write_template};
pub use validate::validate;
