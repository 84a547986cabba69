//! Handlers for each CLI operation.

use beacon::config::OperationMode;
use beacon::reporter::CiReporter;
use beacon::{BeaconConfig, ReportError};

use super::output::{
    to_stdout, write_changed_files, write_gated, write_identity, write_line,
    write_pull_request_number,
};

/// Migrates the audit database and prints the resulting schema version.
///
/// Needs neither a repository nor a token.
///
/// # Errors
///
/// See [`super::migrations::run`].
pub fn migrate(config: &BeaconConfig) -> Result<(), ReportError> {
    let version = super::migrations::run(config)?;
    to_stdout(|out| write_line(out, &format!("Audit database at schema {version}")))
}

/// Runs the operation selected by `mode`.
///
/// Status updates are flushed before returning so a short-lived process
/// does not exit ahead of its final debounced write.
///
/// # Errors
///
/// Returns the [`ReportError`] of the failed operation.
pub async fn run(
    reporter: &CiReporter,
    config: &BeaconConfig,
    mode: OperationMode,
) -> Result<(), ReportError> {
    let branch = config.branch.as_deref();
    match mode {
        OperationMode::MigrateDatabase => migrate(config),
        OperationMode::UpdateStatus => {
            let request = config.require_status_request()?;
            let outcome = reporter.update_status(request, branch).await?;
            reporter.flush().await;
            to_stdout(|out| write_gated(out, &outcome, "Status update sent"))
        }
        OperationMode::ReportError => {
            let message = config.error_message.as_deref().unwrap_or_default();
            let outcome = reporter.report_error(message).await?;
            to_stdout(|out| write_gated(out, &outcome, "Error status reported"))
        }
        OperationMode::PostComment => {
            let number = config.require_pr_number()?;
            let body = config.comment.as_deref().unwrap_or_default();
            let outcome = reporter.post_comment(number, body).await?;
            to_stdout(|out| write_gated(out, &outcome, "Comment posted"))
        }
        OperationMode::FindPullRequest => {
            let found = reporter.find_pull_request_number(branch).await?;
            to_stdout(|out| write_pull_request_number(out, branch, found))
        }
        OperationMode::PullRequestFiles => {
            let number = config.require_pr_number()?;
            let files = reporter.pull_request_files(number).await?;
            to_stdout(|out| write_changed_files(out, number, &files))
        }
        OperationMode::BaseBranch => {
            let number = config.require_pr_number()?;
            let base = reporter.pull_request_base_branch(number).await?;
            to_stdout(|out| write_line(out, &base))
        }
        OperationMode::ShowIdentity => {
            let identity = reporter.identity().resolve(branch).await?;
            let gate_open = reporter.gate().is_open();
            to_stdout(|out| write_identity(out, &identity, gate_open))
        }
    }
}
