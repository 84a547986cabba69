//! Gateways for talking to GitHub through Octocrab.
//!
//! Each concern sits behind its own trait so the delivery core can be tested
//! with mocks, while [`OctocrabGateway`] implements all of them against the
//! REST API.

mod client;
mod comments;
mod error_mapping;
mod http_utils;
mod pulls;
mod statuses;

pub use client::OctocrabGateway;

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::{PullRequestNumber, RepositoryLocator};
use crate::github::models::{
    ChangedFile, CommentId, NewCommitStatus, OpenPullRequest, PullRequestBase,
};

/// Gateway that can create commit statuses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusGateway: Send + Sync {
    /// Create a status entry on commit `sha`.
    async fn create_status(
        &self,
        locator: &RepositoryLocator,
        sha: &str,
        status: &NewCommitStatus,
    ) -> Result<(), GitHubError>;
}

/// Gateway for read-only pull request queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch a single page of open pull requests.
    async fn list_open_pull_requests(
        &self,
        locator: &RepositoryLocator,
        per_page: u16,
    ) -> Result<Vec<OpenPullRequest>, GitHubError>;

    /// Fetch a single page of files changed by a pull request.
    async fn pull_request_files(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
        per_page: u16,
    ) -> Result<Vec<ChangedFile>, GitHubError>;

    /// Fetch the base branch of a pull request.
    ///
    /// Returns `Ok(None)` when GitHub answers without usable data.
    async fn pull_request_base(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<Option<PullRequestBase>, GitHubError>;
}

/// Gateway for posting issue comments on pull requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentGateway: Send + Sync {
    /// Post a new comment and return its identifier.
    async fn create_issue_comment(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<CommentId, GitHubError>;
}
