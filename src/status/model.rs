//! Status values that flow from callers to GitHub.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::github::NewCommitStatus;
use crate::local::CommitSha;

/// Status states GitHub accepts for a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    /// Work is in progress.
    Pending,
    /// Everything passed.
    Success,
    /// Tests or checks failed.
    Failure,
    /// The pipeline itself broke.
    Error,
}

impl StatusState {
    /// Returns the lowercase wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when parsing an unknown status state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status state '{0}' (expected pending, success, failure or error)")]
pub struct UnknownStatusState(pub String);

impl FromStr for StatusState {
    type Err = UnknownStatusState;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            "error" => Ok(Self::Error),
            _ => Err(UnknownStatusState(value.to_owned())),
        }
    }
}

/// The status a caller wants GitHub to show, before identity is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRequest {
    /// Desired state.
    pub state: StatusState,
    /// Short human-readable summary.
    pub description: Option<String>,
    /// Link shown next to the status.
    pub target_url: Option<String>,
}

impl StatusRequest {
    /// Creates a request with no description or link.
    #[must_use]
    pub const fn new(state: StatusState) -> Self {
        Self {
            state,
            description: None,
            target_url: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the link.
    #[must_use]
    pub fn with_target_url(mut self, target_url: impl Into<String>) -> Self {
        self.target_url = Some(target_url.into());
        self
    }

    /// Attaches the commit and branch the status applies to.
    #[must_use]
    pub const fn resolve(self, sha: CommitSha, branch: String) -> ResolvedStatusRequest {
        ResolvedStatusRequest {
            request: self,
            sha,
            branch,
        }
    }
}

/// Longest description GitHub accepts on a commit status.
pub const DESCRIPTION_LIMIT: usize = 140;

/// A [`StatusRequest`] bound to the commit and branch it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStatusRequest {
    /// What to show.
    pub request: StatusRequest,
    /// Full hash of the commit to attach the status to.
    pub sha: CommitSha,
    /// Local branch name, without remote prefix.
    pub branch: String,
}

impl ResolvedStatusRequest {
    /// Builds the REST payload under `context`.
    #[must_use]
    pub fn to_payload(&self, context: &StatusContext) -> NewCommitStatus {
        NewCommitStatus {
            state: self.request.state.as_str().to_owned(),
            target_url: self.request.target_url.clone(),
            description: self
                .request
                .description
                .as_deref()
                .map(|text| text.chars().take(DESCRIPTION_LIMIT).collect()),
            context: context.as_str().to_owned(),
        }
    }
}

/// Label grouping this reporter's statuses among others on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusContext(String);

impl StatusContext {
    /// Default label.
    pub const DEFAULT: &'static str = "beacon/ci";

    /// Wraps a label, falling back to the default when blank.
    #[must_use]
    pub fn new(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            Self(Self::DEFAULT.to_owned())
        } else {
            Self(trimmed.to_owned())
        }
    }

    /// Borrow the label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for StatusContext {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}
