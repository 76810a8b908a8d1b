//! Summary command for today's usage by command and directory.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use wd_core::{Frequencies, Summary};
use wd_store::LogService;

/// Width of the rule printed under table headings.
const RULE_WIDTH: usize = 40;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// List today's distinct commands instead of usage tables.
    #[arg(long, conflicts_with = "json")]
    pub flat: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// JSON shape of the summary output.
#[derive(Debug, Serialize)]
struct SummaryReport<'a> {
    timezone: String,
    #[serde(flatten)]
    summary: &'a Summary,
}

/// Runs the summary command.
pub fn run<W: Write>(writer: &mut W, log: &LogService, args: &SummaryArgs) -> Result<()> {
    let Some(summary) = log.summarize_today().context("failed to load history")? else {
        if args.json {
            writeln!(writer, "null")?;
        } else {
            writeln!(writer, "No activity logged today.")?;
        }
        return Ok(());
    };

    if args.json {
        let report = SummaryReport {
            timezone: iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string()),
            summary: &summary,
        };
        serde_json::to_writer_pretty(&mut *writer, &report)?;
        writeln!(writer)?;
    } else if args.flat {
        render_flat(writer, &summary)?;
    } else {
        render_tables(writer, &summary)?;
    }
    Ok(())
}

fn render_flat<W: Write>(writer: &mut W, summary: &Summary) -> Result<()> {
    for entry in &summary.distinct {
        writeln!(writer, "{}", entry.content.trim())?;
    }
    Ok(())
}

fn render_tables<W: Write>(writer: &mut W, summary: &Summary) -> Result<()> {
    render_table(writer, "Directory Usage", "Directory", &summary.directories)?;
    writeln!(writer)?;
    render_table(writer, "Command Usage", "Command", &summary.commands)?;
    writeln!(writer)?;

    writeln!(writer, "Summary for {}", summary.day)?;
    writeln!(writer, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(writer, "Total entries: {}", summary.total)?;
    writeln!(writer, "Distinct commands: {}", summary.distinct.len())?;
    writeln!(
        writer,
        "Most used command: {} ({} times)",
        summary.most_used.command, summary.most_used.count
    )?;
    Ok(())
}

/// Writes a two-column table, most frequent first.
fn render_table<W: Write>(
    writer: &mut W,
    title: &str,
    heading: &str,
    frequencies: &Frequencies,
) -> Result<()> {
    let rule = "-".repeat(RULE_WIDTH);
    writeln!(writer, "{title}:")?;
    writeln!(writer, "{rule}")?;
    writeln!(writer, "{heading:<30} | Count")?;
    writeln!(writer, "{rule}")?;
    for (key, count) in frequencies.by_count_desc() {
        writeln!(writer, "{key:<30} | {count}")?;
    }
    Ok(())
}
