//! Pull request lookups and comments.
//!
//! [`PullRequestDirectory`] answers read-only questions about pull requests
//! and is not gated: reads work anonymously against public repositories.
//! [`CommentPoster`] writes and therefore sits behind the activation gate.

mod comments;
mod directory;

pub use comments::CommentPoster;
pub use directory::{FILES_PAGE_SIZE, OPEN_PULL_REQUESTS_PAGE_SIZE, PullRequestDirectory};

pub use crate::github::{ChangedFile, CommentId, PullRequestNumber};
