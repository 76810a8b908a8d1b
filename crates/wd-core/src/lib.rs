//! Core domain logic for the activity log.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries and the capped, insertion-ordered history
//! - Aggregation: day filtering, dedup, command and directory frequencies
//! - Splitting shell history lines into commands

mod aggregate;
mod command;
mod entry;
mod summary;
mod types;

pub use aggregate::{
    Frequencies, command_frequencies, deduplicate_by_content, directory_frequencies,
    entries_for_day, most_frequent,
};
pub use command::extract_command;
pub use entry::{Entry, History, MAX_ENTRIES, UNKNOWN_DIRECTORY};
pub use summary::{MostUsed, Summary};
pub use types::ValidationError;
