//! Local Git checkout inspection.
//!
//! The identity resolver only falls back to these queries when the CI
//! environment did not already supply a commit or branch. Results reflect
//! whatever the working copy points at right now, which may have drifted
//! from the commit CI intended to build.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use beacon::local::{Git2Inspector, RepositoryInspector};
//!
//! # async fn demo() -> Result<(), beacon::local::InspectionError> {
//! let inspector = Git2Inspector::discover(Path::new("."))?;
//! let sha = inspector.full_commit_hash().await?;
//! println!("HEAD is {sha}");
//! # Ok(())
//! # }
//! ```

mod error;
mod inspector;
mod types;

pub use error::InspectionError;
pub use inspector::{Git2Inspector, NoCheckout, RepositoryInspector};
pub use types::{CommitSha, InvalidCommitSha};

#[cfg(test)]
pub use inspector::MockRepositoryInspector;
