//! GitHub REST payloads and the domain values built from them.

use serde::{Deserialize, Serialize};

/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCommitStatus {
    /// One of `pending`, `success`, `failure` or `error`.
    pub state: String,
    /// Link shown next to the status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// Short human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Label that groups this reporter's statuses on a commit.
    pub context: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewIssueComment<'a> {
    pub(crate) body: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiBranchRef {
    #[serde(rename = "ref")]
    pub(crate) ref_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPullRequestSummary {
    pub(crate) number: u64,
    pub(crate) head: Option<ApiBranchRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub(crate) base: Option<ApiBranchRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiChangedFile {
    pub(crate) filename: String,
    pub(crate) status: Option<String>,
    #[serde(default)]
    pub(crate) additions: u64,
    #[serde(default)]
    pub(crate) deletions: u64,
    #[serde(default)]
    pub(crate) changes: u64,
    pub(crate) previous_filename: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCreatedStatus {
    pub(crate) id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCreatedComment {
    pub(crate) id: u64,
}

/// An open pull request reduced to what branch matching needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPullRequest {
    /// Pull request number.
    pub number: u64,
    /// Name of the head branch, when GitHub reported one.
    pub head_ref: Option<String>,
}

impl From<ApiPullRequestSummary> for OpenPullRequest {
    fn from(api: ApiPullRequestSummary) -> Self {
        Self {
            number: api.number,
            head_ref: api.head.and_then(|head| head.ref_name),
        }
    }
}

/// Base branch details for a single pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestBase {
    /// Name of the branch the pull request merges into.
    pub base_ref: String,
}

impl ApiPullRequest {
    pub(crate) fn into_base(self) -> Option<PullRequestBase> {
        self.base
            .and_then(|base| base.ref_name)
            .filter(|name| !name.is_empty())
            .map(|base_ref| PullRequestBase { base_ref })
    }
}

/// A file changed by a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    /// Path of the file after the change.
    pub filename: String,
    /// GitHub's change status (`added`, `modified`, `removed`, `renamed`...).
    pub status: Option<String>,
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
    /// Total changed lines.
    pub changes: u64,
    /// Path before a rename.
    pub previous_filename: Option<String>,
}

impl From<ApiChangedFile> for ChangedFile {
    fn from(api: ApiChangedFile) -> Self {
        Self {
            filename: api.filename,
            status: api.status,
            additions: api.additions,
            deletions: api.deletions,
            changes: api.changes,
            previous_filename: api.previous_filename,
        }
    }
}

/// Identifier GitHub assigned to a newly created issue comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentId(pub u64);

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
