//! Errors raised while constructing the ECS client.
//!
//! Call-time failures use the core `ProviderError` so the pipeline sees one
//! error type for every provider.

use thiserror::Error;

/// Errors raised while building an [`crate::EcsClient`].
#[derive(Debug, Error)]
pub enum EcsError {
    /// The endpoint override is not an absolute URL with a host.
    #[error("invalid ECS endpoint '{value}'")]
    InvalidEndpoint {
        /// Endpoint supplied by configuration.
        value: String,
        /// Parse failure, when the value is not a URL at all.
        #[source]
        source: Option<url::ParseError>,
    },
    /// The HTTP client could not be constructed.
    #[error("failed to build ECS HTTP client")]
    ClientBuild {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

/// Convenience alias for ECS construction results.
pub type EcsResult<T> = Result<T, EcsError>;
