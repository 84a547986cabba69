//! Gated pull request comments.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::error::{CallSite, ReportError};
use crate::gate::{ActivationGate, Gated};
use crate::github::{CommentGateway, CommentId, PullRequestNumber, RepositoryLocator};

/// Posts comments on pull requests.
///
/// Every call posts a new comment; nothing is deduplicated or throttled.
pub struct CommentPoster {
    gateway: Arc<dyn CommentGateway>,
    locator: RepositoryLocator,
    gate: ActivationGate,
}

impl std::fmt::Debug for CommentPoster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentPoster")
            .field("locator", &self.locator)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl CommentPoster {
    /// Creates a poster for the repository at `locator`.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn CommentGateway>,
        locator: RepositoryLocator,
        gate: ActivationGate,
    ) -> Self {
        Self {
            gateway,
            locator,
            gate,
        }
    }

    /// Posts `body` on pull request `number`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::RemoteWrite`] when GitHub rejects the comment.
    #[track_caller]
    pub fn post_comment(
        &self,
        number: PullRequestNumber,
        body: &str,
    ) -> impl Future<Output = Result<Gated<CommentId>, ReportError>> {
        let called_from = CallSite::capture();
        async move {
            if let Err(reason) = self.gate.admit("post comment") {
                return Ok(Gated::Skipped(reason));
            }

            let id = self
                .gateway
                .create_issue_comment(&self.locator, number, body)
                .await
                .map_err(|source| ReportError::remote_write("post comment", called_from, source))?;
            info!(%number, comment_id = id.0, "comment posted");
            Ok(Gated::Ran(id))
        }
    }
}
