//! Read-only pull request queries.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{CallSite, ReportError};
use crate::github::{ChangedFile, PullRequestGateway, PullRequestNumber, RepositoryLocator};
use crate::identity::IdentityResolver;

/// Open pull requests scanned when matching a branch. Only one page is read.
pub const OPEN_PULL_REQUESTS_PAGE_SIZE: u16 = 100;

/// Changed files requested for a pull request. Only one page is read.
pub const FILES_PAGE_SIZE: u16 = 300;

/// Finds pull requests and reads their files and base branch.
pub struct PullRequestDirectory {
    gateway: Arc<dyn PullRequestGateway>,
    locator: RepositoryLocator,
    identity: Arc<IdentityResolver>,
}

impl std::fmt::Debug for PullRequestDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullRequestDirectory")
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

impl PullRequestDirectory {
    /// Creates a directory for the repository at `locator`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn PullRequestGateway>,
        locator: RepositoryLocator,
        identity: Arc<IdentityResolver>,
    ) -> Self {
        Self {
            gateway,
            locator,
            identity,
        }
    }

    /// Finds the open pull request whose head is `branch`, or the resolved
    /// build branch when `branch` is `None`.
    ///
    /// Only the first [`OPEN_PULL_REQUESTS_PAGE_SIZE`] open pull requests are
    /// scanned; older ones are invisible.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IdentityResolution`] when no branch can be
    /// resolved and [`ReportError::RemoteRead`] when the listing fails.
    #[track_caller]
    pub fn find_pull_request_number(
        &self,
        branch: Option<&str>,
    ) -> impl Future<Output = Result<Option<PullRequestNumber>, ReportError>> {
        let called_from = CallSite::capture();
        async move {
            let head = self.identity.resolve_branch(branch).await?;
            let open = self
                .gateway
                .list_open_pull_requests(&self.locator, OPEN_PULL_REQUESTS_PAGE_SIZE)
                .await
                .map_err(|source| {
                    ReportError::remote_read("list pull requests", called_from, source)
                })?;

            let found = open
                .iter()
                .filter(|pull| pull.head_ref.as_deref() == Some(head.as_str()))
                .find_map(|pull| PullRequestNumber::new(pull.number).ok());
            match found {
                Some(number) => info!(branch = %head, %number, "pull request found"),
                None => debug!(
                    branch = %head,
                    scanned = open.len(),
                    "no open pull request for branch"
                ),
            }
            Ok(found)
        }
    }

    /// Lists files changed by pull request `number`, in GitHub's order.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::RemoteRead`] when the request fails.
    #[track_caller]
    pub fn pull_request_files(
        &self,
        number: PullRequestNumber,
    ) -> impl Future<Output = Result<Vec<ChangedFile>, ReportError>> {
        let called_from = CallSite::capture();
        async move {
            self.gateway
                .pull_request_files(&self.locator, number, FILES_PAGE_SIZE)
                .await
                .map_err(|source| {
                    ReportError::remote_read("list pull request files", called_from, source)
                })
        }
    }

    /// Returns the base branch of pull request `number` as `origin/<ref>`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::EmptyResponse`] when GitHub answers without
    /// base branch data and [`ReportError::RemoteRead`] when the request
    /// fails.
    #[track_caller]
    pub fn pull_request_base_branch(
        &self,
        number: PullRequestNumber,
    ) -> impl Future<Output = Result<String, ReportError>> {
        let called_from = CallSite::capture();
        async move {
            let base = self
                .gateway
                .pull_request_base(&self.locator, number)
                .await
                .map_err(|source| {
                    ReportError::remote_read("get pull request", called_from, source)
                })?
                .ok_or_else(|| ReportError::EmptyResponse {
                    operation: "get pull request".to_owned(),
                    pr_number: number.get(),
                })?;
            Ok(format!("origin/{}", base.base_ref))
        }
    }
}
