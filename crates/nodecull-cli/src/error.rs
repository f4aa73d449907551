//! CLI-level errors and exit codes.

use std::fmt::{self, Display, Formatter};

use nodecull_app::AppError;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl From<AppError> for CliError {
    fn from(error: AppError) -> Self {
        if error.is_configuration() {
            Self::validation(format!("{:#}", anyhow::Error::new(error)))
        } else {
            Self::failure(error)
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use nodecull_config::ConfigError;
    use nodecull_core::{CoreError, OrchestrationFailure, Phase, PhaseCause, RemovalError};

    #[test]
    fn configuration_errors_exit_with_validation_code() {
        let err = CliError::from(AppError::Config {
            operation: "config.load",
            source: ConfigError::MissingSection { section: "dynamic" },
        });
        assert_eq!(err.exit_code(), 2);
        assert!(err.display_message().starts_with("configuration operation failed: "));
    }

    #[test]
    fn orchestration_failures_render_progress() {
        let failure = OrchestrationFailure {
            phase: Phase::ClusterRemoval,
            cluster_removed: false,
            stopped: Vec::new(),
            failed_instance: None,
            cause: PhaseCause::Removal(RemovalError::InvalidInput {
                reason: "no nodes to remove",
            }),
        };
        let err = CliError::from(AppError::Decommission {
            operation: "pipeline.run",
            source: CoreError::from(failure),
        });
        assert_eq!(err.exit_code(), 3);
        let message = err.display_message();
        assert!(message.starts_with("decommission failed: cluster-removal phase failed"));
        assert!(message.contains("0 instance(s) stopped"));
    }

    #[test]
    fn validation_message_is_verbatim() {
        let err = CliError::validation("bad input");
        assert_eq!(err.display_message(), "bad input");
        assert_eq!(err.to_string(), "cli error");
    }
}
