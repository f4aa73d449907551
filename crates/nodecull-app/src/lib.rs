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

//! Process wiring for a decommission run.
//!
//! Layout:
//! - `bootstrap.rs`: configuration to collaborators to pipeline, per cluster mode
//! - `remover.rs`: cluster removal through the external removal script
//! - `fixed.rs`: fixed-cluster mode with `kubectl` worker discovery
//! - `error.rs`: `AppError` and its constructors

pub mod bootstrap;
pub mod error;
pub mod fixed;
pub mod remover;

pub use bootstrap::{RunOptions, RunOutcome, dynamic_settings, run_app, run_dynamic};
pub use error::{AppError, AppResult};
pub use fixed::{
    FixedRunReport, KubectlNodeLister, WorkerDirectory, parse_node_names, run_fixed,
    select_fixed_nodes,
};
pub use remover::{DEFAULT_DYNAMIC_USER, ScriptClusterRemover};
