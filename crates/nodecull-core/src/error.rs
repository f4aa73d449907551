//! # Design
//!
//! - One error enum per concern: provider calls, cluster removal, and the pipeline itself.
//! - Keep messages short and carry identifiers as fields for reconciliation.
//! - Preserve source errors so callers can render the full chain.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::model::InstanceId;
use crate::orchestrate::Phase;

/// Result alias for cloud provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Result alias for pipeline operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by a [`crate::CloudProvider`] implementation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response.
    #[error("{operation} request failed")]
    Transport {
        /// Provider action being invoked.
        operation: &'static str,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The provider rejected the request with a structured error body.
    #[error("{operation} rejected by provider: {code}: {message}")]
    Api {
        /// Provider action being invoked.
        operation: &'static str,
        /// Provider error code.
        code: String,
        /// Provider error message.
        message: String,
        /// Provider request identifier, when returned.
        request_id: Option<String>,
    },
    /// The provider answered with a non-success status and no usable error body.
    #[error("{operation} returned HTTP {status}")]
    Status {
        /// Provider action being invoked.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Raw response body, trimmed.
        body: String,
    },
    /// The response body could not be decoded.
    #[error("{operation} response could not be decoded")]
    Decode {
        /// Provider action being invoked.
        operation: &'static str,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The response was well-formed but lacked a required field.
    #[error("{operation} response is missing {field}")]
    MissingField {
        /// Provider action being invoked.
        operation: &'static str,
        /// Name of the missing field.
        field: &'static str,
    },
    /// The call did not complete within the configured deadline.
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        /// Provider action being invoked.
        operation: &'static str,
        /// Deadline that elapsed.
        after: Duration,
    },
}

/// Errors raised by a [`crate::ClusterRemover`] implementation.
#[derive(Debug, Error)]
pub enum RemovalError {
    /// The removal command could not be started.
    #[error("failed to launch {program}")]
    Launch {
        /// Program that failed to start.
        program: String,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The removal command ran but reported failure.
    #[error("{program} exited with status {}: {stderr}", .code.map_or_else(|| "signal".to_string(), |code| code.to_string()))]
    Exit {
        /// Program that failed.
        program: String,
        /// Exit code, absent when terminated by a signal.
        code: Option<i32>,
        /// Trimmed standard error output.
        stderr: String,
    },
    /// The removal command did not finish within the configured deadline.
    #[error("cluster removal timed out after {}s", .after.as_secs())]
    Timeout {
        /// Deadline that elapsed.
        after: Duration,
    },
    /// The removal request could not be built from the configured inputs.
    #[error("cluster removal input invalid: {reason}")]
    InvalidInput {
        /// Static reason for the failure.
        reason: &'static str,
    },
}

/// Errors raised by the decommission pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The network scope identifier was empty.
    #[error("network scope identifier must not be empty")]
    EmptyScope,
    /// Listing a catalog page failed; nothing fetched so far is returned.
    #[error("failed to list instances (page {page})")]
    Fetch {
        /// Page number that failed.
        page: u32,
        /// Underlying provider error.
        #[source]
        source: ProviderError,
    },
    /// The provider kept returning full pages past the last addressable page number.
    #[error("instance listing did not end by page {last_page}")]
    PageLimit {
        /// Last page number that was fetched.
        last_page: u32,
    },
    /// The configured selection policy is not recognised.
    #[error("unsupported delete strategy '{value}'")]
    UnknownPolicy {
        /// Policy string supplied by configuration.
        value: String,
    },
    /// An eligible candidate carried a creation time that could not be ordered.
    #[error("creation time '{value}' of instance {instance_id} is not a zoned timestamp")]
    Timestamp {
        /// Instance whose timestamp failed to parse.
        instance_id: InstanceId,
        /// Raw timestamp string.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: chrono::ParseError,
    },
    /// A decommission phase failed after zero or more side effects were applied.
    #[error(transparent)]
    Orchestration(Box<OrchestrationFailure>),
}

impl From<OrchestrationFailure> for CoreError {
    fn from(failure: OrchestrationFailure) -> Self {
        Self::Orchestration(Box::new(failure))
    }
}

/// Underlying cause of a failed decommission phase.
#[derive(Debug)]
pub enum PhaseCause {
    /// Cluster removal failed.
    Removal(RemovalError),
    /// A provider call failed.
    Provider(ProviderError),
}

impl Display for PhaseCause {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Removal(err) => Display::fmt(err, formatter),
            Self::Provider(err) => Display::fmt(err, formatter),
        }
    }
}

impl Error for PhaseCause {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Removal(err) => err.source(),
            Self::Provider(err) => err.source(),
        }
    }
}

/// Report describing how far a decommission run progressed before failing.
#[derive(Debug)]
pub struct OrchestrationFailure {
    /// Phase that failed.
    pub phase: Phase,
    /// Whether cluster removal completed before the failure.
    pub cluster_removed: bool,
    /// Instances stopped before the failure, in stop order.
    pub stopped: Vec<InstanceId>,
    /// Instance whose call failed, when the phase is per-instance.
    pub failed_instance: Option<InstanceId>,
    /// Underlying failure.
    pub cause: PhaseCause,
}

impl Display for OrchestrationFailure {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} phase failed", self.phase.as_str())?;
        if let Some(id) = &self.failed_instance {
            write!(formatter, " on {id}")?;
        }
        write!(
            formatter,
            " (cluster removal {}, {} instance(s) stopped",
            if self.cluster_removed {
                "completed"
            } else {
                "not completed"
            },
            self.stopped.len()
        )?;
        if !self.stopped.is_empty() {
            let ids: Vec<&str> = self.stopped.iter().map(InstanceId::as_str).collect();
            write!(formatter, ": {}", ids.join(","))?;
        }
        formatter.write_str(")")
    }
}

impl Error for OrchestrationFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}
