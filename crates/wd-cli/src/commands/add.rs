//! Add command for recording a single entry.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use wd_store::{LogService, RecordOutcome};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// The command or text to record. Multiple words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub text: Vec<String>,
}

/// Runs the add command, tagging the entry with the current directory.
pub fn run<W: Write>(writer: &mut W, log: &LogService, args: &AddArgs) -> Result<RecordOutcome> {
    let working_directory = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "could not determine working directory");
            String::new()
        }
    };
    record(writer, log, &args.text.join(" "), &working_directory)
}

fn record<W: Write>(
    writer: &mut W,
    log: &LogService,
    content: &str,
    working_directory: &str,
) -> Result<RecordOutcome> {
    let outcome = log
        .record(content, working_directory)
        .context("failed to record entry")?;

    match outcome {
        RecordOutcome::Recorded { total } => writeln!(writer, "Added entry #{total}")?,
        RecordOutcome::Duplicate => {
            writeln!(writer, "Entry already exists as most recent -- skipping")?;
        }
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    use wd_store::{Store, StoreConfig};

    fn service(dir: &std::path::Path) -> LogService {
        LogService::new(Store::open(StoreConfig::new(dir)).unwrap())
    }

    #[test]
    fn add_reports_entry_number_and_duplicates() {
        let temp = tempfile::tempdir().unwrap();
        let log = service(temp.path());
        let mut output = Vec::new();

        record(&mut output, &log, "cargo test", "/repo").unwrap();
        record(&mut output, &log, "cargo test", "/repo").unwrap();
        record(&mut output, &log, "cargo build", "/repo").unwrap();

        insta::assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        Added entry #1
        Entry already exists as most recent -- skipping
        Added entry #2
        ");
    }

    #[test]
    fn add_joins_words_and_uses_current_directory() {
        let temp = tempfile::tempdir().unwrap();
        let log = service(temp.path());
        let args = AddArgs {
            text: vec!["git".to_string(), "status".to_string()],
        };

        let outcome = run(&mut Vec::new(), &log, &args).unwrap();
        assert_eq!(outcome, RecordOutcome::Recorded { total: 1 });

        let entry = &log.recent(1).unwrap()[0];
        assert_eq!(entry.content, "git status");
        assert_eq!(
            entry.working_directory,
            std::env::current_dir().unwrap().display().to_string()
        );
    }

    #[test]
    fn add_blank_text_fails() {
        let temp = tempfile::tempdir().unwrap();
        let log = service(temp.path());
        let err = record(&mut Vec::new(), &log, " ", "/repo").unwrap_err();
        assert!(format!("{err:#}").contains("content cannot be empty"));
    }
}
