//! # Design
//!
//! - Wrap each collaborator's error with the operation that was running.
//! - Keep messages constant; the source chain carries the detail.

use std::io;

use thiserror::Error;

/// Convenience alias for application results.
pub type AppResult<T> = Result<T, AppError>;

/// Errors raised while wiring or running a decommission.
#[derive(Debug, Error)]
pub enum AppError {
    /// Loading or interpreting configuration failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: nodecull_config::ConfigError,
    },
    /// Building the cloud client failed.
    #[error("cloud client operation failed")]
    Ecs {
        /// Operation identifier.
        operation: &'static str,
        /// Source client error.
        source: nodecull_ecs::EcsError,
    },
    /// The decommission pipeline failed.
    #[error("decommission failed")]
    Decommission {
        /// Operation identifier.
        operation: &'static str,
        /// Source pipeline error.
        source: nodecull_core::CoreError,
    },
    /// Removing fixed-mode nodes from the cluster failed.
    #[error("cluster removal failed")]
    Removal {
        /// Operation identifier.
        operation: &'static str,
        /// Source removal error.
        source: nodecull_core::RemovalError,
    },
    /// The worker discovery command could not be started.
    #[error("failed to run {program}")]
    Discovery {
        /// Operation identifier.
        operation: &'static str,
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The worker discovery command reported failure.
    #[error("{program} exited unsuccessfully: {stderr}")]
    DiscoveryExit {
        /// Operation identifier.
        operation: &'static str,
        /// Program that failed.
        program: String,
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: nodecull_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn ecs(operation: &'static str, source: nodecull_ecs::EcsError) -> Self {
        Self::Ecs { operation, source }
    }

    pub(crate) const fn decommission(
        operation: &'static str,
        source: nodecull_core::CoreError,
    ) -> Self {
        Self::Decommission { operation, source }
    }

    pub(crate) const fn removal(
        operation: &'static str,
        source: nodecull_core::RemovalError,
    ) -> Self {
        Self::Removal { operation, source }
    }

    /// Whether the failure stems from invalid configuration rather than a runtime fault.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::Ecs {
                    source: nodecull_ecs::EcsError::InvalidEndpoint { .. },
                    ..
                }
        )
    }
}
