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

//! Alibaba Cloud ECS adapter implementing the core `CloudProvider` trait.
//!
//! Layout: `signer.rs` (ACS3-HMAC-SHA256 request signing), `wire.rs` (JSON
//! response shapes), `client.rs` (`EcsClient`), `error.rs` (construction errors).

pub mod client;
pub mod error;
pub mod signer;
pub mod wire;

pub use client::{API_VERSION, EcsClient, EcsSettings, default_endpoint};
pub use error::{EcsError, EcsResult};
pub use signer::Credentials;
