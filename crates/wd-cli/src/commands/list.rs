//! List command for showing the most recent entries.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use clap::Args;
use wd_core::Entry;
use wd_store::LogService;

/// Longest content shown before truncating with an ellipsis.
const MAX_CONTENT_CHARS: usize = 60;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Number of entries to show.
    #[arg(short = 'n', long, default_value_t = 10)]
    pub limit: usize,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Runs the list command.
pub fn run<W: Write>(writer: &mut W, log: &LogService, args: &ListArgs) -> Result<()> {
    let entries = log.recent(args.limit).context("failed to load history")?;

    if args.json {
        serde_json::to_writer_pretty(&mut *writer, &entries)?;
        writeln!(writer)?;
        return Ok(());
    }

    render(writer, &entries, &Local)
}

/// Writes one line per entry: content, local timestamp and directory.
fn render<W, Tz>(writer: &mut W, entries: &[Entry], tz: &Tz) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    if entries.is_empty() {
        writeln!(writer, "No command history")?;
        return Ok(());
    }

    for entry in entries {
        let timestamp = entry.timestamp.with_timezone(tz);
        writeln!(
            writer,
            "{:<30} | {:<30} | {}",
            truncate(entry.content.trim()),
            timestamp.format("%Y-%m-%d %I:%M:%S %p %A").to_string(),
            entry.directory_label()
        )?;
    }
    Ok(())
}

fn truncate(content: &str) -> String {
    if content.chars().count() <= MAX_CONTENT_CHARS {
        return content.to_string();
    }
    let kept: String = content.chars().take(MAX_CONTENT_CHARS - 3).collect();
    format!("{kept}...")
}
