//! Beacon reports CI build status to GitHub.
//!
//! The library posts commit statuses, looks up pull request metadata and
//! leaves review comments on behalf of a CI pipeline. Frequent in-progress
//! updates pass through a throttle plus debounce scheduler so bursts from
//! many test shards stay within GitHub's rate limits while the final state
//! always lands. Every write is gated on running under CI with a token, so
//! the same build scripts are harmless on developer machines.
//!
//! [`reporter::CiReporter`] is the entry point; the other modules are its
//! parts and can be assembled differently by embedders.

pub mod ci;
pub mod config;
pub mod error;
pub mod gate;
pub mod github;
pub mod identity;
pub mod local;
pub mod persistence;
pub mod pull_request;
pub mod reporter;
pub mod status;
pub mod telemetry;

pub use config::BeaconConfig;
pub use error::{CallSite, NonFatalError, ReportError};
pub use gate::{Gated, SkipReason};
pub use reporter::{CiReporter, ReporterParts};
pub use status::{StatusRequest, StatusState};
