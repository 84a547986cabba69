//! The composition root tying gate, identity, delivery and lookups together.
//!
//! [`CiReporter`] owns the process-wide [`StatusScheduler`] and is what the
//! binary and embedders call. Every public method captures its caller's
//! location so remote failures name the line that asked for them.

use std::future::Future;
use std::sync::Arc;

use tracing::{error, info};

use crate::ci::CiEnvironment;
use crate::error::{CallSite, ReportError};
use crate::gate::{ActivationGate, Gated};
use crate::github::{
    ChangedFile, CommentGateway, CommentId, PullRequestGateway, PullRequestNumber,
    RepositoryLocator, StatusGateway,
};
use crate::identity::IdentityResolver;
use crate::local::RepositoryInspector;
use crate::persistence::StatusAuditStore;
use crate::pull_request::{CommentPoster, PullRequestDirectory};
use crate::status::{
    RemoteStatusWriter, ResolvedStatusRequest, SchedulerTiming, StatusContext, StatusRequest,
    StatusScheduler, StatusState, StatusWrite,
};
use crate::telemetry::{DispatchPath, TelemetryEvent, TelemetrySink};

/// Collaborators a [`CiReporter`] is assembled from.
pub struct ReporterParts {
    /// CI and authentication checks.
    pub gate: ActivationGate,
    /// CI variables for identity and job links.
    pub ci: CiEnvironment,
    /// Target repository.
    pub locator: RepositoryLocator,
    /// Host of the CI web UI, used for job links.
    pub ci_host: String,
    /// Local checkout fallback for identity.
    pub inspector: Arc<dyn RepositoryInspector>,
    /// Status writes.
    pub statuses: Arc<dyn StatusGateway>,
    /// Pull request reads.
    pub pull_requests: Arc<dyn PullRequestGateway>,
    /// Comment writes.
    pub comments: Arc<dyn CommentGateway>,
    /// Status context label.
    pub context: StatusContext,
    /// Audit trail for status writes.
    pub audit: Arc<dyn StatusAuditStore>,
    /// Scheduler windows.
    pub timing: SchedulerTiming,
    /// Side channel for outcomes nobody awaits.
    pub telemetry: Arc<dyn TelemetrySink>,
}

/// Reports build status, looks up pull requests and posts comments.
pub struct CiReporter {
    gate: ActivationGate,
    ci: CiEnvironment,
    locator: RepositoryLocator,
    ci_host: String,
    identity: Arc<IdentityResolver>,
    writer: Arc<dyn StatusWrite>,
    scheduler: StatusScheduler,
    directory: PullRequestDirectory,
    comments: CommentPoster,
    telemetry: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for CiReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CiReporter")
            .field("gate", &self.gate)
            .field("locator", &self.locator)
            .field("ci_host", &self.ci_host)
            .finish_non_exhaustive()
    }
}

impl CiReporter {
    /// Assembles a reporter.
    #[must_use]
    pub fn new(parts: ReporterParts) -> Self {
        let ReporterParts {
            gate,
            ci,
            locator,
            ci_host,
            inspector,
            statuses,
            pull_requests,
            comments,
            context,
            audit,
            timing,
            telemetry,
        } = parts;

        let identity = Arc::new(IdentityResolver::new(&ci, inspector));
        let writer: Arc<dyn StatusWrite> = Arc::new(
            RemoteStatusWriter::new(statuses, locator.clone(), context)
                .with_audit(audit)
                .with_telemetry(Arc::clone(&telemetry)),
        );
        let scheduler =
            StatusScheduler::new(Arc::clone(&writer), timing, Arc::clone(&telemetry));
        let directory =
            PullRequestDirectory::new(pull_requests, locator.clone(), Arc::clone(&identity));
        let comment_poster = CommentPoster::new(comments, locator.clone(), gate.clone());

        Self {
            gate,
            ci,
            locator,
            ci_host,
            identity,
            writer,
            scheduler,
            directory,
            comments: comment_poster,
            telemetry,
        }
    }

    /// Returns the activation gate.
    #[must_use]
    pub const fn gate(&self) -> &ActivationGate {
        &self.gate
    }

    /// Returns the identity resolver.
    #[must_use]
    pub fn identity(&self) -> &IdentityResolver {
        &self.identity
    }

    /// Queues an in-progress status through the scheduler.
    ///
    /// Returns once identity is resolved and the request is queued; the
    /// write itself happens later and reports through telemetry.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IdentityResolution`] when no commit or branch
    /// can be found.
    #[track_caller]
    pub fn update_status(
        &self,
        request: StatusRequest,
        branch: Option<&str>,
    ) -> impl Future<Output = Result<Gated<()>, ReportError>> {
        let called_from = CallSite::capture();
        async move {
            if let Err(reason) = self.gate.admit("update status") {
                return Ok(Gated::Skipped(reason));
            }
            let resolved = self.resolve(request, branch).await?;
            self.scheduler.submit(resolved, called_from);
            Ok(Gated::Ran(()))
        }
    }

    /// Writes a status immediately, bypassing the scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::IdentityResolution`] when no commit or branch
    /// can be found and [`ReportError::RemoteWrite`] when GitHub rejects the
    /// write.
    #[track_caller]
    pub fn publish_status(
        &self,
        request: StatusRequest,
        branch: Option<&str>,
    ) -> impl Future<Output = Result<Gated<()>, ReportError>> {
        let called_from = CallSite::capture();
        async move {
            if let Err(reason) = self.gate.admit("publish status") {
                return Ok(Gated::Skipped(reason));
            }
            let resolved = self.resolve(request, branch).await?;
            self.write_direct(&resolved, called_from).await?;
            Ok(Gated::Ran(()))
        }
    }

    /// Marks the build as errored, linking to the CI job.
    ///
    /// A failure here is logged at error level and recorded as
    /// [`TelemetryEvent::TerminalReportFailed`] before being returned.
    ///
    /// # Errors
    ///
    /// Returns the [`ReportError`] that stopped the report.
    #[track_caller]
    pub fn report_error(
        &self,
        message: &str,
    ) -> impl Future<Output = Result<Gated<()>, ReportError>> {
        let called_from = CallSite::capture();
        async move {
            if let Err(reason) = self.gate.admit("report error") {
                return Ok(Gated::Skipped(reason));
            }

            let mut request = StatusRequest::new(StatusState::Error).with_description(message);
            request.target_url = self.ci.job_url(&self.ci_host, &self.locator);

            let outcome = async {
                let resolved = self.resolve(request, None).await?;
                self.write_direct(&resolved, called_from).await
            }
            .await;
            if let Err(failure) = outcome {
                error!(error = %failure, "could not report build error status");
                self.telemetry.record(TelemetryEvent::TerminalReportFailed {
                    message: failure.to_string(),
                });
                return Err(failure);
            }
            info!("build error status reported");
            Ok(Gated::Ran(()))
        }
    }

    /// Posts a comment on pull request `number`.
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
        self.comments.post_comment(number, body)
    }

    /// Finds the open pull request for `branch` or the build branch.
    ///
    /// # Errors
    ///
    /// See [`PullRequestDirectory::find_pull_request_number`].
    #[track_caller]
    pub fn find_pull_request_number(
        &self,
        branch: Option<&str>,
    ) -> impl Future<Output = Result<Option<PullRequestNumber>, ReportError>> {
        self.directory.find_pull_request_number(branch)
    }

    /// Lists files changed by pull request `number`.
    ///
    /// # Errors
    ///
    /// See [`PullRequestDirectory::pull_request_files`].
    #[track_caller]
    pub fn pull_request_files(
        &self,
        number: PullRequestNumber,
    ) -> impl Future<Output = Result<Vec<ChangedFile>, ReportError>> {
        self.directory.pull_request_files(number)
    }

    /// Returns the base branch of pull request `number` as `origin/<ref>`.
    ///
    /// # Errors
    ///
    /// See [`PullRequestDirectory::pull_request_base_branch`].
    #[track_caller]
    pub fn pull_request_base_branch(
        &self,
        number: PullRequestNumber,
    ) -> impl Future<Output = Result<String, ReportError>> {
        self.directory.pull_request_base_branch(number)
    }

    /// Delivers queued updates now. See [`StatusScheduler::flush`].
    pub async fn flush(&self) {
        self.scheduler.flush().await;
    }

    /// Stops scheduled delivery. See [`StatusScheduler::dispose`].
    pub fn dispose(&self) {
        self.scheduler.dispose();
    }

    async fn resolve(
        &self,
        request: StatusRequest,
        branch: Option<&str>,
    ) -> Result<ResolvedStatusRequest, ReportError> {
        let identity = self.identity.resolve(branch).await?;
        Ok(request.resolve(identity.sha, identity.branch))
    }

    async fn write_direct(
        &self,
        resolved: &ResolvedStatusRequest,
        called_from: CallSite,
    ) -> Result<(), ReportError> {
        self.writer.write(resolved, called_from).await?;
        self.telemetry.record(TelemetryEvent::StatusDispatched {
            path: DispatchPath::Direct,
            state: resolved.request.state.as_str().to_owned(),
            sha: resolved.sha.as_str().to_owned(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests;
