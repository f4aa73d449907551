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

//! Candidate discovery, eligibility probing, victim selection, and decommission
//! sequencing for cloud-backed cluster nodes.
//!
//! Layout: `model.rs` (domain types), `provider.rs` (collaborator traits),
//! `catalog.rs` (paginated listing), `probe.rs` (concurrent billing probes),
//! `select.rs` (ordering and truncation), `orchestrate.rs` (removal, stop,
//! terminate), `pipeline.rs` (`Decommissioner` facade).

pub mod catalog;
pub mod error;
pub mod model;
pub mod orchestrate;
pub mod pipeline;
pub mod probe;
pub mod provider;
pub mod select;

pub use catalog::{PAGE_SIZE, fetch_catalog};
pub use error::{
    CoreError, CoreResult, OrchestrationFailure, PhaseCause, ProviderError, ProviderResult,
    RemovalError,
};
pub use model::{
    BillingModel, Candidate, InstanceAttributes, InstanceId, NodeRef, PAY_AS_YOU_GO, ProbeOutcome,
    ProbeResult, SelectionPolicy, Victim, VictimSet,
};
pub use orchestrate::{DecommissionReport, Orchestrator, OrchestratorOptions, Phase};
pub use pipeline::{Decommissioner, Plan, RunReport, RunSettings};
pub use probe::{DEFAULT_PROBE_CONCURRENCY, ProbeOptions, probe_candidates};
pub use provider::{CloudProvider, ClusterRemover};
pub use select::{parse_creation_time, select_victims};
