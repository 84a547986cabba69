//! Error types for local repository inspection.

use thiserror::Error;

/// Errors that may occur while inspecting the local checkout.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InspectionError {
    /// The start path is not within a Git repository.
    #[error("not inside a Git repository")]
    NotARepository,

    /// HEAD points at a commit rather than a branch.
    #[error("HEAD is detached; no branch name available")]
    DetachedHead,

    /// HEAD has no commit yet.
    #[error("HEAD does not point at a commit yet")]
    UnbornHead,

    /// HEAD resolved to something that is not a full commit hash.
    #[error("HEAD resolved to an invalid commit hash: {value}")]
    InvalidCommitSha {
        /// The value git reported.
        value: String,
    },

    /// Git operation failed.
    #[error("git error: {message}")]
    Git {
        /// Error detail from the git2 library.
        message: String,
    },
}

impl From<git2::Error> for InspectionError {
    fn from(error: git2::Error) -> Self {
        match error.code() {
            git2::ErrorCode::UnbornBranch => Self::UnbornHead,
            _ => Self::Git {
                message: error.message().to_owned(),
            },
        }
    }
}
