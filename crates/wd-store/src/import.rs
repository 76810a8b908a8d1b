//! Bulk import of commands from a line-oriented shell history file.

use std::fs;
use std::path::Path;

use wd_core::extract_command;

use crate::StoreError;
use crate::service::{LogService, RecordOutcome};

/// Number of trailing history lines considered by default.
pub const DEFAULT_IMPORT_LIMIT: usize = 50;

/// Counts from an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Non-empty lines taken from the end of the source.
    pub considered: usize,
    /// Entries actually recorded.
    pub recorded: usize,
}

/// Reads a history file as lines.
///
/// Invalid UTF-8 is replaced rather than rejected, since shells do not
/// guarantee an encoding for their history files.
pub fn read_history_lines(path: &Path) -> Result<Vec<String>, StoreError> {
    let bytes = fs::read(path).map_err(|e| StoreError::io("failed to read shell history", path, e))?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

/// Records the commands of the last `limit` non-empty lines, oldest first.
///
/// Each line is reduced to its command with [`extract_command`]; lines with
/// a blank command are skipped. Consecutive repeats collapse through the
/// most-recent-only dedup of [`LogService::record`], with no working
/// directory attached.
pub fn import_recent<S: AsRef<str>>(
    log: &LogService,
    lines: &[S],
    limit: usize,
) -> Result<ImportReport, StoreError> {
    let non_empty: Vec<&str> = lines
        .iter()
        .map(|line| line.as_ref())
        .filter(|line| !line.trim().is_empty())
        .collect();
    let tail = &non_empty[non_empty.len().saturating_sub(limit)..];

    let mut report = ImportReport {
        considered: tail.len(),
        recorded: 0,
    };
    for line in tail {
        let command = extract_command(line).trim();
        if command.is_empty() {
            continue;
        }
        if let RecordOutcome::Recorded { .. } = log.record(command, "")? {
            report.recorded += 1;
        }
    }

    tracing::info!(
        considered = report.considered,
        recorded = report.recorded,
        "imported shell history"
    );
    Ok(report)
}
