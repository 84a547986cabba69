//! Octocrab client construction and the gateway that owns it.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::GitHubError;
use crate::github::locator::{PersonalAccessToken, RepositoryLocator};
use crate::github::rate_limit::RateLimitInfo;

use super::error_mapping::{is_rate_limit_error, map_octocrab_error};

/// Builds an Octocrab client for the given API base URL.
///
/// Without a token the client is anonymous, which is enough for read-only
/// calls against public repositories.
///
/// # Errors
///
/// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed or
/// `GitHubError::Api` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: Option<&PersonalAccessToken>,
    api_base: &str,
) -> Result<Octocrab, GitHubError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

    let builder = match token {
        Some(pat) => Octocrab::builder().personal_token(pat.as_ref()),
        None => Octocrab::builder(),
    };

    builder
        .base_uri(base_uri)
        .map_err(|error| GitHubError::Api {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| map_octocrab_error("build client", &error))
}

/// Octocrab-backed gateway for statuses, pull requests and comments.
pub struct OctocrabGateway {
    pub(super) client: Octocrab,
}

impl std::fmt::Debug for OctocrabGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabGateway").finish_non_exhaustive()
    }
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a gateway targeting the API base of `locator`.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed or
    /// `GitHubError::Api` when Octocrab fails to construct a client.
    pub fn for_repository(
        token: Option<&PersonalAccessToken>,
        locator: &RepositoryLocator,
    ) -> Result<Self, GitHubError> {
        let octocrab = build_octocrab_client(token, locator.api_base().as_str())?;
        Ok(Self::new(octocrab))
    }

    /// Maps an Octocrab failure, attaching quota details to rate limit
    /// rejections.
    pub(super) async fn map_error_with_rate_limit(
        &self,
        operation: &str,
        error: &octocrab::Error,
    ) -> GitHubError {
        match error {
            octocrab::Error::GitHub { source, .. } if is_rate_limit_error(source) => {
                self.rate_limit_exceeded(operation, &source.message).await
            }
            _ => map_octocrab_error(operation, error),
        }
    }

    pub(super) async fn rate_limit_exceeded(&self, operation: &str, message: &str) -> GitHubError {
        let rate_limit = self.fetch_rate_limit_info().await;
        let base_message = format!("{operation} failed: {message}");
        let full_message = match &rate_limit {
            Some(info) => format!("{base_message} ({info})"),
            None => base_message,
        };

        GitHubError::RateLimitExceeded {
            rate_limit,
            message: full_message,
        }
    }

    async fn fetch_rate_limit_info(&self) -> Option<RateLimitInfo> {
        let rate = self.client.ratelimit().get().await.ok()?.rate;
        RateLimitInfo::from_counters(rate.limit, rate.remaining, rate.reset)
    }
}
