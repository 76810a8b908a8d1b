//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::add::AddArgs;
use crate::commands::list::ListArgs;
use crate::commands::summary::SummaryArgs;
use crate::commands::sync::SyncArgs;

/// What did I do?
///
/// Logs shell commands and snippets with the directory they ran in, and
/// summarizes the day's activity.
#[derive(Debug, Parser)]
#[command(name = "whatdidido", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record a command or snippet.
    Add(AddArgs),

    /// Show the most recent entries.
    List(ListArgs),

    /// Summarize today's activity.
    Summary(SummaryArgs),

    /// Import recent commands from the shell history file.
    Sync(SyncArgs),
}
