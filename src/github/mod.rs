//! GitHub REST access for statuses, pull requests and comments.
//!
//! This module wraps Octocrab behind small gateway traits and maps its
//! failures into [`GitHubError`] so callers never see Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod rate_limit;

pub use error::GitHubError;
pub use gateway::{CommentGateway, OctocrabGateway, PullRequestGateway, StatusGateway};
pub use locator::{
    PersonalAccessToken, PullRequestNumber, RepositoryLocator, RepositoryName, RepositoryOwner,
};
pub use models::{
    ChangedFile, CommentId, NewCommitStatus, OpenPullRequest, PullRequestBase,
};
pub use rate_limit::RateLimitInfo;

#[cfg(test)]
pub use gateway::{MockCommentGateway, MockPullRequestGateway, MockStatusGateway};
