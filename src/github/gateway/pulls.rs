//! Pull request reads: open pull requests, changed files and base branch.

use async_trait::async_trait;
use http::{StatusCode, Uri};

use crate::github::error::GitHubError;
use crate::github::locator::{PullRequestNumber, RepositoryLocator};
use crate::github::models::{
    ApiChangedFile, ApiPullRequest, ApiPullRequestSummary, ChangedFile, OpenPullRequest,
    PullRequestBase,
};

use super::PullRequestGateway;
use super::client::OctocrabGateway;
use super::error_mapping::{is_rate_limit_response, map_http_error, map_octocrab_error};
use super::http_utils::{decode_optional_body, extract_documentation_url, extract_github_message};

#[async_trait]
impl PullRequestGateway for OctocrabGateway {
    async fn list_open_pull_requests(
        &self,
        locator: &RepositoryLocator,
        per_page: u16,
    ) -> Result<Vec<OpenPullRequest>, GitHubError> {
        let per_page_str = per_page.to_string();
        let query_params = [("state", "open"), ("per_page", per_page_str.as_str())];

        match self
            .client
            .get::<Vec<ApiPullRequestSummary>, _, _>(locator.pulls_path(), Some(&query_params))
            .await
        {
            Ok(pulls) => Ok(pulls.into_iter().map(OpenPullRequest::from).collect()),
            Err(error) => Err(self.map_error_with_rate_limit("list pulls", &error).await),
        }
    }

    async fn pull_request_files(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
        per_page: u16,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        let per_page_str = per_page.to_string();
        let query_params = [("per_page", per_page_str.as_str())];

        match self
            .client
            .get::<Vec<ApiChangedFile>, _, _>(
                locator.pull_request_files_path(number),
                Some(&query_params),
            )
            .await
        {
            Ok(files) => Ok(files.into_iter().map(ChangedFile::from).collect()),
            Err(error) => {
                Err(self
                    .map_error_with_rate_limit("pull request files", &error)
                    .await)
            }
        }
    }

    async fn pull_request_base(
        &self,
        locator: &RepositoryLocator,
        number: PullRequestNumber,
    ) -> Result<Option<PullRequestBase>, GitHubError> {
        const OPERATION: &str = "pull request";

        let uri: Uri = locator
            .pull_request_path(number)
            .parse::<Uri>()
            .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

        // Read the raw body so that an empty payload can be told apart from
        // a malformed one.
        let response = self
            .client
            ._get_with_headers(uri, None)
            .await
            .map_err(|error| map_octocrab_error(OPERATION, &error))?;
        let status = response.status();

        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(|error| GitHubError::Decode {
                message: format!("{OPERATION} response body: {error}"),
            })?;

        match status {
            StatusCode::OK => Ok(decode_optional_body::<ApiPullRequest>(OPERATION, &body)?
                .and_then(ApiPullRequest::into_base)),
            StatusCode::NOT_FOUND => Ok(None),
            status => {
                let message = extract_github_message(&body);
                let documentation_url = extract_documentation_url(&body);
                if is_rate_limit_response(
                    status,
                    message.as_deref().unwrap_or_default(),
                    documentation_url.as_deref(),
                ) {
                    return Err(self
                        .rate_limit_exceeded(OPERATION, message.as_deref().unwrap_or_default())
                        .await);
                }
                Err(map_http_error(OPERATION, status, message))
            }
        }
    }
}
