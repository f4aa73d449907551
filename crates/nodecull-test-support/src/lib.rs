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

//! Shared test helpers used across integration suites.
//! Layout: fixtures.rs (candidate/attribute builders), fakes.rs (scripted provider and remover).

pub mod fakes;
pub mod fixtures;

pub use fakes::{Call, CallLog, DescribeScript, FakeProvider, PageScript, RecordingRemover};
