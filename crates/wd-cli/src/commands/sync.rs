//! Sync command for importing recent shell history.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use wd_store::{ImportReport, LogService, import_recent, read_history_lines};

use crate::Config;

#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Shell history file to read. Defaults to `~/.zsh_history`.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Number of trailing history lines to consider.
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Runs the sync command.
pub fn run<W: Write>(
    writer: &mut W,
    log: &LogService,
    args: &SyncArgs,
    config: &Config,
) -> Result<ImportReport> {
    let path = args
        .file
        .clone()
        .or_else(|| config.shell_history.clone())
        .context("could not determine shell history file; pass --file")?;
    let limit = args.limit.unwrap_or(config.import_limit);

    sync_from(writer, log, &path, limit)
}

fn sync_from<W: Write>(
    writer: &mut W,
    log: &LogService,
    path: &Path,
    limit: usize,
) -> Result<ImportReport> {
    let lines = read_history_lines(path)?;
    let report = import_recent(log, lines.as_slice(), limit).context("failed to import shell history")?;

    writeln!(
        writer,
        "Imported {} of {} recent commands from {}",
        report.recorded,
        report.considered,
        path.display()
    )?;
    Ok(report)
}
