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

//! Logging and tracing-context primitives shared across the nodecull workspace.
//!
//! Layout: `init.rs` (subscriber installation), `context.rs` (run-scoped spans),
//! `error.rs` (telemetry error type).

pub mod context;
pub mod error;
pub mod init;

pub use context::{RunContextGuard, current_run_id, with_run_context};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
