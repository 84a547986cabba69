//! CI environment variables.
//!
//! Everything the delivery core learns from the CI system comes through an
//! [`EnvironmentProbe`]: whether the process runs under CI, the commit and
//! branch CI believes it is building, and the job identifier used to link an
//! error status back to its log. Variable names default to Travis CI's and
//! are carried in [`CiVariables`] so other CI systems can be described.

use std::collections::HashMap;
use std::sync::Arc;

use crate::github::RepositoryLocator;

/// Read-only key/value lookups against the process environment.
pub trait EnvironmentProbe: Send + Sync {
    /// Returns the value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Probe that reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl EnvironmentProbe for ProcessEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Probe backed by an in-memory map.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    values: HashMap<String, String>,
}

impl MapEnvironment {
    /// Builds a probe from `(key, value)` pairs.
    #[must_use]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
                .collect(),
        }
    }
}

impl EnvironmentProbe for MapEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Names of the CI variables the delivery core consults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiVariables {
    /// Flags any one of which marks the process as running under CI.
    pub ci_flags: Vec<String>,
    /// Head commit of the pull request being built.
    pub pull_request_sha: String,
    /// Commit being built.
    pub commit_sha: String,
    /// Head branch of the pull request being built.
    pub pull_request_branch: String,
    /// Branch being built.
    pub branch: String,
    /// Identifier of the running job.
    pub job_id: String,
}

impl CiVariables {
    /// Travis CI variable names.
    #[must_use]
    pub fn travis() -> Self {
        Self {
            ci_flags: vec!["CI".to_owned(), "TRAVIS".to_owned()],
            pull_request_sha: "TRAVIS_PULL_REQUEST_SHA".to_owned(),
            commit_sha: "TRAVIS_COMMIT".to_owned(),
            pull_request_branch: "TRAVIS_PULL_REQUEST_BRANCH".to_owned(),
            branch: "TRAVIS_BRANCH".to_owned(),
            job_id: "TRAVIS_JOB_ID".to_owned(),
        }
    }
}

impl Default for CiVariables {
    fn default() -> Self {
        Self::travis()
    }
}

/// One of the identity values CI can supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CiValue {
    /// Head commit of the pull request.
    PullRequestSha,
    /// Commit being built.
    CommitSha,
    /// Head branch of the pull request.
    PullRequestBranch,
    /// Branch being built.
    Branch,
    /// Job identifier.
    JobId,
}

/// CI variables read through a probe.
#[derive(Clone)]
pub struct CiEnvironment {
    probe: Arc<dyn EnvironmentProbe>,
    variables: CiVariables,
}

impl std::fmt::Debug for CiEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CiEnvironment")
            .field("variables", &self.variables)
            .finish_non_exhaustive()
    }
}

impl CiEnvironment {
    /// Reads `variables` through `probe`.
    #[must_use]
    pub fn new(probe: Arc<dyn EnvironmentProbe>, variables: CiVariables) -> Self {
        Self { probe, variables }
    }

    /// Reads Travis variables from the process environment.
    #[must_use]
    pub fn from_process() -> Self {
        Self::new(Arc::new(ProcessEnvironment), CiVariables::travis())
    }

    /// Returns the variable names in use.
    #[must_use]
    pub const fn variables(&self) -> &CiVariables {
        &self.variables
    }

    /// Returns true when any CI flag is set to something other than a
    /// false-like value.
    #[must_use]
    pub fn is_ci(&self) -> bool {
        self.variables
            .ci_flags
            .iter()
            .filter_map(|flag| self.non_empty(flag))
            .any(|value| !matches!(value.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
    }

    /// Returns `value` when CI set it to a non-blank string.
    ///
    /// Travis exports pull request variables as empty strings on branch
    /// builds, so blank values count as absent.
    #[must_use]
    pub fn value(&self, value: CiValue) -> Option<String> {
        self.non_empty(self.key(value))
    }

    /// Returns the variable name backing `value`.
    #[must_use]
    pub fn key(&self, value: CiValue) -> &str {
        match value {
            CiValue::PullRequestSha => &self.variables.pull_request_sha,
            CiValue::CommitSha => &self.variables.commit_sha,
            CiValue::PullRequestBranch => &self.variables.pull_request_branch,
            CiValue::Branch => &self.variables.branch,
            CiValue::JobId => &self.variables.job_id,
        }
    }

    /// Builds `https://<ci_host>/<owner>/<repo>/jobs/<job id>`.
    ///
    /// Returns `None` when CI did not export a job identifier.
    #[must_use]
    pub fn job_url(&self, ci_host: &str, locator: &RepositoryLocator) -> Option<String> {
        let job_id = self.value(CiValue::JobId)?;
        let host = ci_host.trim().trim_end_matches('/');
        Some(format!(
            "https://{host}/{full_name}/jobs/{job_id}",
            full_name = locator.full_name()
        ))
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.probe
            .get(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }
}
