//! Issue comment creation on pull requests.

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::{PullRequestNumber, RepositoryLocator};
use crate::github::models::{ApiCreatedComment, CommentId, NewIssueComment};

use super::CommentGateway;
use super::client::OctocrabGateway;

#[async_trait]
impl CommentGateway for OctocrabGateway {
    async fn create_issue_comment(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
        body: &str,
    ) -> Result<CommentId, GitHubError> {
        let payload = NewIssueComment { body };

        match self
            .client
            .post::<_, ApiCreatedComment>(locator.issue_comments_path(number), Some(&payload))
            .await
        {
            Ok(created) => Ok(CommentId(created.id)),
            Err(error) => {
                Err(self
                    .map_error_with_rate_limit("create issue comment", &error)
                    .await)
            }
        }
    }
}
