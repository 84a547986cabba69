//! Output formatting utilities for CLI operations.

use std::io::{self, Write};

use beacon::gate::{Gated, SkipReason};
use beacon::identity::BuildIdentity;
use beacon::pull_request::{ChangedFile, PullRequestNumber};
use beacon::ReportError;

/// Runs `write` against a locked stdout.
pub fn to_stdout(
    write: impl FnOnce(&mut io::StdoutLock<'_>) -> Result<(), ReportError>,
) -> Result<(), ReportError> {
    let mut stdout = io::stdout().lock();
    write(&mut stdout)
}

/// Writes the result of a pull request number lookup.
pub fn write_pull_request_number<W: Write>(
    writer: &mut W,
    branch: Option<&str>,
    number: Option<PullRequestNumber>,
) -> Result<(), ReportError> {
    let label = branch.unwrap_or("the current branch");
    match number {
        Some(found) => writeln!(writer, "{found}"),
        None => writeln!(writer, "No open pull request for {label}"),
    }
    .map_err(|e| io_error(&e))
}

/// Writes changed files, one per line, with their change counts.
pub fn write_changed_files<W: Write>(
    writer: &mut W,
    number: PullRequestNumber,
    files: &[ChangedFile],
) -> Result<(), ReportError> {
    writeln!(writer, "Files changed by #{number}:").map_err(|e| io_error(&e))?;
    for file in files {
        let status = file.status.as_deref().unwrap_or("changed");
        let renamed = file
            .previous_filename
            .as_deref()
            .map(|previous| format!(" (from {previous})"))
            .unwrap_or_default();
        writeln!(
            writer,
            "  [{status}] {}{renamed} +{} -{}",
            file.filename, file.additions, file.deletions
        )
        .map_err(|e| io_error(&e))?;
    }
    writeln!(writer, "{} file(s)", files.len()).map_err(|e| io_error(&e))
}

/// Writes a single line of text.
pub fn write_line<W: Write>(writer: &mut W, line: &str) -> Result<(), ReportError> {
    writeln!(writer, "{line}").map_err(|e| io_error(&e))
}

/// Writes the resolved build identity.
pub fn write_identity<W: Write>(
    writer: &mut W,
    identity: &BuildIdentity,
    gate_open: bool,
) -> Result<(), ReportError> {
    writeln!(writer, "commit: {}", identity.sha).map_err(|e| io_error(&e))?;
    writeln!(writer, "branch: {}", identity.branch).map_err(|e| io_error(&e))?;
    let gate = if gate_open { "open" } else { "closed" };
    writeln!(writer, "gate:   {gate}").map_err(|e| io_error(&e))
}

/// Writes the outcome of a gated write, naming why it was skipped.
pub fn write_gated<W: Write, T>(
    writer: &mut W,
    outcome: &Gated<T>,
    done: &str,
) -> Result<(), ReportError> {
    match outcome {
        Gated::Ran(_) => writeln!(writer, "{done}"),
        Gated::Skipped(reason) => writeln!(writer, "Skipped: {}", describe_skip(*reason)),
    }
    .map_err(|e| io_error(&e))
}

const fn describe_skip(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NotCi => "not running under CI",
        SkipReason::Unauthenticated => "no GitHub token available",
    }
}

fn io_error(error: &io::Error) -> ReportError {
    ReportError::Io {
        message: error.to_string(),
    }
}
