//! Repository identity wrappers and API path construction.

use url::Url;

use super::error::GitHubError;

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Validates a non-blank owner login.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidRepository`] when the value is blank or
    /// contains a path separator.
    pub fn new(value: &str) -> Result<Self, GitHubError> {
        validate_segment("owner", value).map(Self)
    }

    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Validates a non-blank repository name.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidRepository`] when the value is blank or
    /// contains a path separator.
    pub fn new(value: &str) -> Result<Self, GitHubError> {
        validate_segment("repository", value).map(Self)
    }

    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

fn validate_segment(kind: &str, value: &str) -> Result<String, GitHubError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GitHubError::InvalidRepository {
            message: format!("{kind} must not be blank"),
        });
    }
    if trimmed.contains('/') {
        return Err(GitHubError::InvalidRepository {
            message: format!("{kind} '{trimmed}' must not contain '/'"),
        });
    }
    Ok(trimmed.to_owned())
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Validates a positive pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, GitHubError> {
        if value == 0 {
            return Err(GitHubError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PullRequestNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::MissingToken`] when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GitHubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PersonalAccessToken(<redacted>)")
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Derives the GitHub API base URL from a web URL.
///
/// `github.com` maps to `https://api.github.com`; any other host is treated
/// as GitHub Enterprise and served from `/api/v3` on the same authority.
fn derive_api_base(parsed: &Url) -> Result<Url, GitHubError> {
    let host = parsed
        .host_str()
        .ok_or_else(|| GitHubError::InvalidUrl("URL must include a host".to_owned()))?;

    if host.eq_ignore_ascii_case("github.com") {
        return Url::parse("https://api.github.com")
            .map_err(|error| GitHubError::InvalidUrl(error.to_string()));
    }

    let mut api_url = parsed.clone();
    api_url.set_path("api/v3");
    api_url.set_query(None);
    api_url.set_fragment(None);
    Ok(api_url)
}

/// The repository every status, pull request and comment call targets.
///
/// # Example
///
/// ```
/// use beacon::github::RepositoryLocator;
///
/// let locator = RepositoryLocator::from_server_url("https://ghe.example.com", "octo", "cat")
///     .expect("should build locator");
/// assert_eq!(locator.api_base().as_str(), "https://ghe.example.com/api/v3");
/// assert_eq!(locator.owner().as_str(), "octo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
}

impl RepositoryLocator {
    /// Builds a locator for `owner/repo` on the GitHub host at `server_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidUrl`] when the server URL cannot be
    /// parsed and [`GitHubError::InvalidRepository`] when owner or repo is
    /// blank.
    pub fn from_server_url(server_url: &str, owner: &str, repo: &str) -> Result<Self, GitHubError> {
        let parsed =
            Url::parse(server_url).map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

        Ok(Self {
            api_base: derive_api_base(&parsed)?,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repo)?,
        })
    }

    /// Parses a repository web URL in the form `https://<host>/<owner>/<repo>`.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidUrl`] when parsing fails or
    /// [`GitHubError::InvalidRepository`] when the path is not `/owner/repo`.
    pub fn parse(input: &str) -> Result<Self, GitHubError> {
        let parsed =
            Url::parse(input).map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

        let mut segments = parsed
            .path_segments()
            .ok_or_else(|| GitHubError::InvalidRepository {
                message: format!("'{input}' has no path"),
            })?;
        let owner = segments.next().unwrap_or_default();
        let repository = segments
            .next()
            .unwrap_or_default()
            .trim_end_matches(".git");

        Ok(Self {
            api_base: derive_api_base(&parsed)?,
            owner: RepositoryOwner::new(owner)?,
            repository: RepositoryName::new(repository)?,
        })
    }

    /// API base URL derived from the server host.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Returns `owner/repo` for logs and messages.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.as_str(), self.repository.as_str())
    }

    fn repo_path(&self) -> String {
        format!("/repos/{}", self.full_name())
    }

    pub(crate) fn statuses_path(&self, sha: &str) -> String {
        format!("{}/statuses/{sha}", self.repo_path())
    }

    pub(crate) fn pulls_path(&self) -> String {
        format!("{}/pulls", self.repo_path())
    }

    pub(crate) fn pull_request_path(&self, number: PullRequestNumber) -> String {
        format!("{}/pulls/{number}", self.repo_path())
    }

    pub(crate) fn pull_request_files_path(&self, number: PullRequestNumber) -> String {
        format!("{}/pulls/{number}/files", self.repo_path())
    }

    pub(crate) fn issue_comments_path(&self, number: PullRequestNumber) -> String {
        format!("{}/issues/{number}/comments", self.repo_path())
    }
}
