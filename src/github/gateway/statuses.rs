//! Commit status writes.

use async_trait::async_trait;
use tracing::debug;

use crate::github::error::GitHubError;
use crate::github::locator::RepositoryLocator;
use crate::github::models::{ApiCreatedStatus, NewCommitStatus};

use super::StatusGateway;
use super::client::OctocrabGateway;

#[async_trait]
impl StatusGateway for OctocrabGateway {
    async fn create_status(
        &self,
        locator: &RepositoryLocator,
        sha: &str,
        status: &NewCommitStatus,
    ) -> Result<(), GitHubError> {
        let created: ApiCreatedStatus = match self
            .client
            .post(locator.statuses_path(sha), Some(status))
            .await
        {
            Ok(created) => created,
            Err(error) => {
                return Err(self
                    .map_error_with_rate_limit("create status", &error)
                    .await);
            }
        };

        debug!(
            repository = %locator.full_name(),
            sha,
            state = %status.state,
            status_id = ?created.id,
            "commit status created"
        );
        Ok(())
    }
}
