//! The network write for a resolved status, with its audit side effect.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{CallSite, NonFatalError, ReportError};
use crate::github::{RepositoryLocator, StatusGateway};
use crate::persistence::{NoopStatusAudit, StatusAuditStore};
use crate::telemetry::{NoopTelemetrySink, TelemetryEvent, TelemetrySink};

use super::model::{ResolvedStatusRequest, StatusContext};

/// Anything that can deliver a resolved status.
///
/// The scheduler depends on this rather than on [`RemoteStatusWriter`] so
/// delivery timing can be exercised without a network.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatusWrite: Send + Sync {
    /// Delivers `request`, attributing failures to `called_from`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::RemoteWrite`] when the remote call fails.
    async fn write(
        &self,
        request: &ResolvedStatusRequest,
        called_from: CallSite,
    ) -> Result<(), ReportError>;
}

/// Writes statuses to GitHub under a fixed repository and context.
pub struct RemoteStatusWriter {
    gateway: Arc<dyn StatusGateway>,
    locator: RepositoryLocator,
    context: StatusContext,
    audit: Arc<dyn StatusAuditStore>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl std::fmt::Debug for RemoteStatusWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStatusWriter")
            .field("locator", &self.locator)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl RemoteStatusWriter {
    /// Creates a writer with no audit trail and no telemetry.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn StatusGateway>,
        locator: RepositoryLocator,
        context: StatusContext,
    ) -> Self {
        Self {
            gateway,
            locator,
            context,
            audit: Arc::new(NoopStatusAudit),
            telemetry: Arc::new(NoopTelemetrySink),
        }
    }

    /// Records every write in `audit` before sending it.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn StatusAuditStore>) -> Self {
        self.audit = audit;
        self
    }

    /// Reports non-fatal failures to `telemetry`.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Returns the status context label.
    #[must_use]
    pub const fn context(&self) -> &StatusContext {
        &self.context
    }

    fn record_audit(&self, request: &ResolvedStatusRequest) {
        let Err(error) = self.audit.persist(request, &self.context) else {
            return;
        };

        let failure = NonFatalError {
            operation: "persist status audit".to_owned(),
            message: error.to_string(),
        };
        warn!(error = %failure, sha = %request.sha, "status audit skipped");
        self.telemetry.record(TelemetryEvent::NonFatalError {
            operation: failure.operation,
            message: failure.message,
        });
    }
}

#[async_trait]
impl StatusWrite for RemoteStatusWriter {
    async fn write(
        &self,
        request: &ResolvedStatusRequest,
        called_from: CallSite,
    ) -> Result<(), ReportError> {
        self.record_audit(request);

        let payload = request.to_payload(&self.context);
        self.gateway
            .create_status(&self.locator, request.sha.as_str(), &payload)
            .await
            .map_err(|source| ReportError::remote_write("create status", called_from, source))?;

        debug!(
            sha = %request.sha,
            state = %request.request.state,
            context = self.context.as_str(),
            "status written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mockall::predicate::eq;

    use super::{RemoteStatusWriter, StatusWrite};
    use crate::error::{CallSite, ReportError};
    use crate::github::{
        GitHubError, MockStatusGateway, NewCommitStatus, RepositoryLocator,
    };
    use crate::local::CommitSha;
    use crate::persistence::{PersistenceError, StatusAuditStore};
    use crate::status::{ResolvedStatusRequest, StatusContext, StatusRequest, StatusState};
    use crate::telemetry::TelemetryEvent;
    use crate::telemetry::test_support::RecordingSink;

    const SHA: &str = "0123456789abcdef0123456789abcdef01234567";

    struct FailingAudit;

    impl StatusAuditStore for FailingAudit {
        fn persist(
            &self,
            _request: &ResolvedStatusRequest,
            _context: &StatusContext,
        ) -> Result<(), PersistenceError> {
            Err(PersistenceError::SchemaNotInitialised)
        }
    }

    fn locator() -> RepositoryLocator {
        RepositoryLocator::from_server_url("https://github.com", "acme", "widgets")
            .expect("locator should build")
    }

    fn request() -> ResolvedStatusRequest {
        StatusRequest::new(StatusState::Pending)
            .with_description("3 of 8 shards done")
            .resolve(CommitSha::parse(SHA).expect("sha"), "main".to_owned())
    }

    #[tokio::test]
    async fn write_sends_payload_for_the_resolved_commit() {
        let mut gateway = MockStatusGateway::new();
        gateway
            .expect_create_status()
            .withf(|_, sha, status| {
                sha == SHA
                    && *status
                        == NewCommitStatus {
                            state: "pending".to_owned(),
                            target_url: None,
                            description: Some("3 of 8 shards done".to_owned()),
                            context: "beacon/ci".to_owned(),
                        }
            })
            .times(1)
            .returning(|_, _, _| Ok(()));
        let writer =
            RemoteStatusWriter::new(Arc::new(gateway), locator(), StatusContext::default());

        writer
            .write(&request(), CallSite::capture())
            .await
            .expect("write should succeed");
    }

    #[tokio::test]
    async fn failed_write_keeps_cause_and_call_site() {
        let mut gateway = MockStatusGateway::new();
        gateway.expect_create_status().returning(|_, _, _| {
            Err(GitHubError::Api {
                message: "Validation Failed".to_owned(),
            })
        });
        let writer =
            RemoteStatusWriter::new(Arc::new(gateway), locator(), StatusContext::default());
        let site = CallSite::capture();

        let error = writer
            .write(&request(), site)
            .await
            .expect_err("write should fail");

        assert_eq!(
            error,
            ReportError::RemoteWrite {
                operation: "create status".to_owned(),
                called_from: site,
                source: GitHubError::Api {
                    message: "Validation Failed".to_owned(),
                },
            }
        );
    }

    #[tokio::test]
    async fn audit_failure_is_reported_but_does_not_block_the_write() {
        let mut gateway = MockStatusGateway::new();
        gateway
            .expect_create_status()
            .with(eq(locator()), eq(SHA), mockall::predicate::always())
            .times(1)
            .returning(|_, _, _| Ok(()));
        let telemetry = Arc::new(RecordingSink::default());
        let writer = RemoteStatusWriter::new(Arc::new(gateway), locator(), StatusContext::default())
            .with_audit(Arc::new(FailingAudit))
            .with_telemetry(telemetry.clone());

        writer
            .write(&request(), CallSite::capture())
            .await
            .expect("write should still succeed");

        assert_eq!(
            telemetry.take(),
            vec![TelemetryEvent::NonFatalError {
                operation: "persist status audit".to_owned(),
                message: PersistenceError::SchemaNotInitialised.to_string(),
            }]
        );
    }
}
