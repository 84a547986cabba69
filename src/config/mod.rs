//! Application configuration loaded from CLI, environment, and files.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.beacon.toml` in the current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `BEACON_*`, plus the legacy `GITHUB_TOKEN`
//! 4. **Command-line arguments** – `--owner`, `--state`, `--comment`...
//!
//! # Configuration File
//!
//! ```toml
//! owner = "octocat"
//! repo = "hello-world"
//! status_context = "beacon/integration"
//! ci_host = "travis-ci.com"
//! throttle_window_ms = 5000
//! debounce_quiet_ms = 2500
//! database_url = "beacon.sqlite"
//! ```

use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

use crate::ci::EnvironmentProbe;
use crate::error::ReportError;
use crate::gate::TokenFile;
use crate::github::{PullRequestNumber, RepositoryLocator};
use crate::status::{SchedulerTiming, StatusContext, StatusRequest, StatusState};

/// Default GitHub web host.
pub const DEFAULT_SERVER_URL: &str = "https://github.com";

/// Default CI web host used for job links.
pub const DEFAULT_CI_HOST: &str = "travis-ci.com";

const DEFAULT_THROTTLE_WINDOW_MS: u64 = 5000;
const DEFAULT_DEBOUNCE_QUIET_MS: u64 = 2500;

/// Operation selected by the provided configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Apply audit database migrations and exit.
    MigrateDatabase,
    /// Mark the build as errored with a link to the CI job.
    ReportError,
    /// Post a comment on a pull request.
    PostComment,
    /// Print the pull request number for a branch.
    FindPullRequest,
    /// Print the files changed by a pull request.
    PullRequestFiles,
    /// Print the base branch of a pull request.
    BaseBranch,
    /// Send a status update through the scheduler.
    UpdateStatus,
    /// Print the resolved commit, branch and gate state.
    ShowIdentity,
}

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Environment Variables
///
/// - `BEACON_OWNER` / `BEACON_REPO`: Target repository
/// - `BEACON_TOKEN`, `GITHUB_TOKEN`, or `--token`: Authentication token
/// - `BEACON_TOKEN_FILE`: Credential file read once at startup
/// - `BEACON_DATABASE_URL`: Local `SQLite` audit database path
///
/// # Example
///
/// ```no_run
/// use beacon::BeaconConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = BeaconConfig::load().expect("failed to load configuration");
/// let locator = config.require_repository_locator().expect("owner and repo required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "BEACON",
    discovery(
        dotfile_name = ".beacon.toml",
        config_file_name = "beacon.toml",
        app_name = "beacon"
    )
)]
pub struct BeaconConfig {
    /// Repository owner (e.g., "octocat").
    #[ortho_config()]
    pub owner: Option<String>,

    /// Repository name (e.g., "hello-world").
    #[ortho_config()]
    pub repo: Option<String>,

    /// Web URL of the GitHub host. GitHub Enterprise hosts use `/api/v3`.
    #[ortho_config()]
    pub server_url: String,

    /// Label grouping beacon's statuses among others on the same commit.
    #[ortho_config()]
    pub status_context: String,

    /// Personal access token for GitHub API authentication.
    ///
    /// Falls back to `GITHUB_TOKEN`, then to the token file.
    #[ortho_config()]
    pub token: Option<String>,

    /// File holding a token, read once at startup.
    ///
    /// Defaults to `$XDG_CONFIG_HOME/beacon/github-token`, or
    /// `$HOME/.config/beacon/github-token`.
    #[ortho_config()]
    pub token_file: Option<String>,

    /// Host of the CI web UI, used to link error statuses to the job.
    #[ortho_config()]
    pub ci_host: String,

    /// Throttle window for scheduled status updates, in milliseconds.
    #[ortho_config()]
    pub throttle_window_ms: u64,

    /// Debounce quiet period for scheduled status updates, in milliseconds.
    #[ortho_config()]
    pub debounce_quiet_ms: u64,

    /// Local `SQLite` database recording every status write.
    ///
    /// Without it the audit trail is disabled.
    #[ortho_config()]
    pub database_url: Option<String>,

    /// Runs database migrations and exits.
    #[ortho_config()]
    pub migrate_db: bool,

    /// Status state to send (`pending`, `success`, `failure`, `error`).
    #[ortho_config()]
    pub state: Option<String>,

    /// Status description.
    #[ortho_config()]
    pub description: Option<String>,

    /// Status link.
    #[ortho_config()]
    pub target_url: Option<String>,

    /// Branch override for identity and pull request lookups.
    #[ortho_config()]
    pub branch: Option<String>,

    /// Marks the build as errored with this message.
    #[ortho_config()]
    pub error_message: Option<String>,

    /// Comment body to post on `pr_number`.
    #[ortho_config()]
    pub comment: Option<String>,

    /// Pull request number for comment and pull request queries.
    #[ortho_config()]
    pub pr_number: Option<u64>,

    /// Prints the open pull request number for the branch.
    #[ortho_config()]
    pub find_pr: bool,

    /// Prints the files changed by `pr_number`.
    #[ortho_config()]
    pub pr_files: bool,

    /// Prints the base branch of `pr_number`.
    #[ortho_config()]
    pub base_branch: bool,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            owner: None,
            repo: None,
            server_url: DEFAULT_SERVER_URL.to_owned(),
            status_context: StatusContext::DEFAULT.to_owned(),
            token: None,
            token_file: None,
            ci_host: DEFAULT_CI_HOST.to_owned(),
            throttle_window_ms: DEFAULT_THROTTLE_WINDOW_MS,
            debounce_quiet_ms: DEFAULT_DEBOUNCE_QUIET_MS,
            database_url: None,
            migrate_db: false,
            state: None,
            description: None,
            target_url: None,
            branch: None,
            error_message: None,
            comment: None,
            pr_number: None,
            find_pr: false,
            pr_files: false,
            base_branch: false,
        }
    }
}

impl BeaconConfig {
    /// Resolves the token from configuration or the legacy `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// Absence is not an error: without a token every write is skipped.
    #[must_use]
    pub fn resolve_token(&self) -> Option<String> {
        let present = |token: &String| !token.trim().is_empty();
        self.token
            .clone()
            .filter(present)
            .or_else(|| env::var("GITHUB_TOKEN").ok().filter(present))
    }

    /// Returns the credential file to read, if any location is known.
    #[must_use]
    pub fn token_file(&self, env: &dyn EnvironmentProbe) -> Option<TokenFile> {
        match self.token_file.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => Some(TokenFile::new(Utf8PathBuf::from(path))),
            _ => TokenFile::default_location(env).map(TokenFile::new),
        }
    }

    /// Builds the locator for the configured repository.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] when owner or repo is missing or
    /// invalid, or the server URL cannot be parsed.
    pub fn require_repository_locator(&self) -> Result<RepositoryLocator, ReportError> {
        let (owner, repo) = match (&self.owner, &self.repo) {
            (Some(owner), Some(repo)) => (owner.as_str(), repo.as_str()),
            (None, _) => {
                return Err(ReportError::Configuration {
                    message: "repository owner is required (use --owner or -o)".to_owned(),
                });
            }
            (_, None) => {
                return Err(ReportError::Configuration {
                    message: "repository name is required (use --repo or -r)".to_owned(),
                });
            }
        };
        RepositoryLocator::from_server_url(&self.server_url, owner, repo).map_err(|error| {
            ReportError::Configuration {
                message: error.to_string(),
            }
        })
    }

    /// Returns the configured pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] when it is missing or zero.
    pub fn require_pr_number(&self) -> Result<PullRequestNumber, ReportError> {
        let value = self.pr_number.ok_or_else(|| ReportError::Configuration {
            message: "pull request number is required (use --pr-number or -p)".to_owned(),
        })?;
        PullRequestNumber::new(value).map_err(|error| ReportError::Configuration {
            message: error.to_string(),
        })
    }

    /// Builds the status request described by `state`, `description` and
    /// `target_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Configuration`] when the state is missing or
    /// unknown.
    pub fn require_status_request(&self) -> Result<StatusRequest, ReportError> {
        let raw = self
            .state
            .as_deref()
            .ok_or_else(|| ReportError::Configuration {
                message: "status state is required (use --state or -s)".to_owned(),
            })?;
        let state = raw
            .parse::<StatusState>()
            .map_err(|error| ReportError::Configuration {
                message: error.to_string(),
            })?;
        Ok(StatusRequest {
            state,
            description: self.description.clone(),
            target_url: self.target_url.clone(),
        })
    }

    /// Returns the scheduler windows.
    #[must_use]
    pub const fn scheduler_timing(&self) -> SchedulerTiming {
        SchedulerTiming {
            throttle_window: Duration::from_millis(self.throttle_window_ms),
            debounce_quiet: Duration::from_millis(self.debounce_quiet_ms),
        }
    }

    /// Returns the status context label.
    #[must_use]
    pub fn status_context(&self) -> StatusContext {
        StatusContext::new(&self.status_context)
    }

    /// Determines the operation from the provided configuration.
    ///
    /// Exactly one operation runs; earlier entries in [`OperationMode`] win
    /// when several are requested.
    #[must_use]
    pub const fn operation_mode(&self) -> OperationMode {
        if self.migrate_db {
            OperationMode::MigrateDatabase
        } else if self.error_message.is_some() {
            OperationMode::ReportError
        } else if self.comment.is_some() {
            OperationMode::PostComment
        } else if self.find_pr {
            OperationMode::FindPullRequest
        } else if self.pr_files {
            OperationMode::PullRequestFiles
        } else if self.base_branch {
            OperationMode::BaseBranch
        } else if self.state.is_some() {
            OperationMode::UpdateStatus
        } else {
            OperationMode::ShowIdentity
        }
    }
}

#[cfg(test)]
mod tests;
