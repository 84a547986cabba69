//! Resolution of the commit and branch a status update applies to.
//!
//! CI variables and the local checkout can disagree about what is being
//! built. Each field resolves independently through its own
//! [`FallbackChain`]: pull request values first, then plain CI values, and
//! only then the local checkout. An explicit branch from the caller beats
//! every source.

mod providers;

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

pub use providers::{
    CiValueProvider, FallbackChain, LocalBranchProvider, LocalCommitProvider, Resolved,
    ValueProvider,
};

use crate::ci::{CiEnvironment, CiValue};
use crate::local::{CommitSha, RepositoryInspector};

/// Errors raised when no usable identity can be found.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Every commit source was empty.
    #[error("no commit hash available (tried {})", .tried.join(", "))]
    NoCommitSha {
        /// Sources consulted, highest priority first.
        tried: Vec<String>,
    },

    /// Every branch source was empty.
    #[error("no branch name available (tried {})", .tried.join(", "))]
    NoBranch {
        /// Sources consulted, highest priority first.
        tried: Vec<String>,
    },

    /// The winning commit source supplied an abbreviated or malformed hash.
    #[error("{source_name} supplied '{value}', which is not a full commit hash")]
    InvalidCommitSha {
        /// Provider that supplied the value.
        source_name: String,
        /// The rejected value.
        value: String,
    },
}

/// The commit and branch a build is reporting on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildIdentity {
    /// Full commit hash.
    pub sha: CommitSha,
    /// Local branch name, without a remote prefix.
    pub branch: String,
}

/// Resolves [`BuildIdentity`] values through two independent chains.
pub struct IdentityResolver {
    sha_chain: FallbackChain,
    branch_chain: FallbackChain,
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("sha_chain", &self.sha_chain.describe())
            .field("branch_chain", &self.branch_chain.describe())
            .finish()
    }
}

impl IdentityResolver {
    /// Standard chains: pull request value, CI value, local checkout.
    #[must_use]
    pub fn new(env: &CiEnvironment, inspector: Arc<dyn RepositoryInspector>) -> Self {
        let sha_chain = FallbackChain::new()
            .then(CiValueProvider::new(env.clone(), CiValue::PullRequestSha))
            .then(CiValueProvider::new(env.clone(), CiValue::CommitSha))
            .then(LocalCommitProvider::new(Arc::clone(&inspector)));
        let branch_chain = FallbackChain::new()
            .then(CiValueProvider::new(env.clone(), CiValue::PullRequestBranch))
            .then(CiValueProvider::new(env.clone(), CiValue::Branch))
            .then(LocalBranchProvider::new(inspector));
        Self::from_chains(sha_chain, branch_chain)
    }

    /// Uses caller-built chains.
    #[must_use]
    pub const fn from_chains(sha_chain: FallbackChain, branch_chain: FallbackChain) -> Self {
        Self {
            sha_chain,
            branch_chain,
        }
    }

    /// Resolves the commit hash.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NoCommitSha`] when every source is empty and
    /// [`IdentityError::InvalidCommitSha`] when the winning value is not a
    /// full hash.
    pub async fn resolve_sha(&self) -> Result<CommitSha, IdentityError> {
        let Some(resolved) = self.sha_chain.resolve().await else {
            return Err(IdentityError::NoCommitSha {
                tried: self.sha_chain.describe(),
            });
        };
        CommitSha::parse(&resolved.value).map_err(|error| IdentityError::InvalidCommitSha {
            source_name: resolved.source,
            value: error.value,
        })
    }

    /// Resolves the branch, preferring a non-blank `branch_override`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::NoBranch`] when there is no override and
    /// every source is empty.
    pub async fn resolve_branch(
        &self,
        branch_override: Option<&str>,
    ) -> Result<String, IdentityError> {
        if let Some(branch) = branch_override.map(str::trim).filter(|name| !name.is_empty()) {
            debug!(branch, "using caller-supplied branch");
            return Ok(branch.to_owned());
        }
        self.branch_chain
            .resolve()
            .await
            .map(|resolved| resolved.value)
            .ok_or_else(|| IdentityError::NoBranch {
                tried: self.branch_chain.describe(),
            })
    }

    /// Resolves both fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`IdentityError`] from either field.
    pub async fn resolve(
        &self,
        branch_override: Option<&str>,
    ) -> Result<BuildIdentity, IdentityError> {
        let sha = self.resolve_sha().await?;
        let branch = self.resolve_branch(branch_override).await?;
        Ok(BuildIdentity { sha, branch })
    }
}

#[cfg(test)]
mod tests;
