//! Claim propagation and resource/claim verification for HTTP request
//! pipelines.
//!
//! Bearer tokens are decoded without any signature check. Signatures are
//! expected to be verified before requests reach this crate.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod services;
pub mod state;
