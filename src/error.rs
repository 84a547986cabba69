//! Errors surfaced by the reporting entry points.
//!
//! Transport failures arrive as [`GitHubError`] and are wrapped here with the
//! operation that failed and the call site that asked for it. Skipped
//! operations are not errors and never appear in this module; see
//! [`crate::gate::Gated`].

use std::fmt;
use std::panic::Location;

use thiserror::Error;

use crate::github::GitHubError;
use crate::identity::IdentityError;

/// Source location of the public call that triggered a remote operation.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CallSite(&'static Location<'static>);

impl CallSite {
    /// Captures the location of the caller.
    ///
    /// Public entry points are `#[track_caller]`, so this resolves to the
    /// user's code rather than the library internals.
    #[track_caller]
    #[must_use]
    pub fn capture() -> Self {
        Self(Location::caller())
    }

    /// Source file of the call.
    #[must_use]
    pub fn file(&self) -> &'static str {
        self.0.file()
    }

    /// Line of the call.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.0.line()
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.0.file(), self.0.line(), self.0.column())
    }
}

impl fmt::Debug for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallSite({self})")
    }
}

/// Errors returned by the status, pull request and comment entry points.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// No usable commit or branch could be found.
    #[error(transparent)]
    IdentityResolution(#[from] IdentityError),

    /// A remote write failed.
    #[error("{operation} (called from {called_from}) failed: {source}")]
    RemoteWrite {
        /// Operation that failed.
        operation: String,
        /// Public call that triggered it.
        called_from: CallSite,
        /// Underlying transport or API failure.
        source: GitHubError,
    },

    /// A remote read failed.
    #[error("{operation} (called from {called_from}) failed: {source}")]
    RemoteRead {
        /// Operation that failed.
        operation: String,
        /// Public call that triggered it.
        called_from: CallSite,
        /// Underlying transport or API failure.
        source: GitHubError,
    },

    /// GitHub answered but returned no usable data.
    #[error("{operation} returned no data for pull request #{pr_number}")]
    EmptyResponse {
        /// Operation that came back empty.
        operation: String,
        /// Pull request the lookup was for.
        pr_number: u64,
    },

    /// Configuration was missing or invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

impl ReportError {
    /// Wraps a failed write.
    pub(crate) fn remote_write(
        operation: &str,
        called_from: CallSite,
        source: GitHubError,
    ) -> Self {
        Self::RemoteWrite {
            operation: operation.to_owned(),
            called_from,
            source,
        }
    }

    /// Wraps a failed read.
    pub(crate) fn remote_read(operation: &str, called_from: CallSite, source: GitHubError) -> Self {
        Self::RemoteRead {
            operation: operation.to_owned(),
            called_from,
            source,
        }
    }
}

/// A best-effort side operation that failed without affecting its caller.
///
/// These are reported through `tracing` and telemetry, never returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{operation} failed (non-fatal): {message}")]
pub struct NonFatalError {
    /// Operation that failed.
    pub operation: String,
    /// Rendered cause.
    pub message: String,
}
