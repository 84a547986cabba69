//! Git2-backed inspection of the local checkout.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use git2::Repository;

use super::error::InspectionError;
use super::types::CommitSha;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// Read-only queries against the local version-control checkout.
///
/// Implementations may touch the filesystem, so callers should only ask
/// when no cheaper source already supplied the value.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepositoryInspector: Send + Sync {
    /// Returns the full hash of the commit HEAD points at.
    async fn full_commit_hash(&self) -> Result<CommitSha, InspectionError>;

    /// Returns the short name of the branch HEAD points at.
    async fn branch_name(&self) -> Result<String, InspectionError>;
}

/// Inspector that reads HEAD through `git2`.
///
/// `git2::Repository` is not `Sync`, so it sits behind a `Mutex`.
pub struct Git2Inspector {
    repo: Mutex<Repository>,
}

impl std::fmt::Debug for Git2Inspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git2Inspector")
            .field("repo", &"<git2::Repository>")
            .finish()
    }
}

impl Git2Inspector {
    /// Discovers the repository containing `start_path`.
    ///
    /// # Errors
    ///
    /// Returns [`InspectionError::NotARepository`] when no repository encloses
    /// the path, or [`InspectionError::Git`] for other git failures.
    pub fn discover(start_path: &Path) -> Result<Self, InspectionError> {
        let repo = Repository::discover(start_path).map_err(|error| {
            if error.code() == git2::ErrorCode::NotFound {
                InspectionError::NotARepository
            } else {
                InspectionError::from(error)
            }
        })?;
        Ok(Self {
            repo: Mutex::new(repo),
        })
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&Repository) -> Result<T, InspectionError>,
    ) -> Result<T, InspectionError> {
        let repo = self.repo.lock().unwrap_or_else(PoisonError::into_inner);
        f(&repo)
    }
}

fn head_commit_hash(repo: &Repository) -> Result<CommitSha, InspectionError> {
    let oid = repo.head()?.peel_to_commit()?.id().to_string();
    CommitSha::parse(&oid).map_err(|error| InspectionError::InvalidCommitSha { value: error.value })
}

fn head_branch_name(repo: &Repository) -> Result<String, InspectionError> {
    // An unborn branch still has a symbolic HEAD, so read the reference
    // rather than resolving it.
    let head = repo.find_reference("HEAD")?;
    let Some(target) = head.symbolic_target() else {
        return Err(InspectionError::DetachedHead);
    };
    target
        .strip_prefix(BRANCH_REF_PREFIX)
        .map(ToOwned::to_owned)
        .ok_or(InspectionError::DetachedHead)
}

#[async_trait]
impl RepositoryInspector for Git2Inspector {
    async fn full_commit_hash(&self) -> Result<CommitSha, InspectionError> {
        self.with_repo(head_commit_hash)
    }

    async fn branch_name(&self) -> Result<String, InspectionError> {
        self.with_repo(head_branch_name)
    }
}

/// Inspector for processes started outside any checkout.
///
/// Every query fails with [`InspectionError::NotARepository`], so identity
/// resolution relies on CI values alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckout;

#[async_trait]
impl RepositoryInspector for NoCheckout {
    async fn full_commit_hash(&self) -> Result<CommitSha, InspectionError> {
        Err(InspectionError::NotARepository)
    }

    async fn branch_name(&self) -> Result<String, InspectionError> {
        Err(InspectionError::NotARepository)
    }
}
