//! Daily usage summary.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::aggregate::{
    Frequencies, command_frequencies, deduplicate_by_content, directory_frequencies,
    entries_for_day, most_frequent,
};
use crate::entry::Entry;

/// Aggregated activity for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// The day being summarized.
    pub day: NaiveDate,
    /// Number of entries recorded on the day, duplicates included.
    pub total: usize,
    /// Raw occurrence counts per command.
    pub commands: Frequencies,
    /// Raw occurrence counts per working directory.
    pub directories: Frequencies,
    /// The most used command and its count.
    pub most_used: MostUsed,
    /// First occurrence of each distinct command, in recorded order.
    pub distinct: Vec<Entry>,
}

/// The single most used command of a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MostUsed {
    pub command: String,
    pub count: usize,
}

impl Summary {
    /// Builds the summary for `day` in time zone `tz`.
    ///
    /// Returns `None` when nothing was recorded on that day.
    pub fn for_day<Tz: TimeZone>(entries: &[Entry], day: NaiveDate, tz: &Tz) -> Option<Self> {
        let day_entries = entries_for_day(entries, day, tz);
        let commands = command_frequencies(&day_entries);
        let (command, count) = most_frequent(&commands)?;
        let most_used = MostUsed {
            command: command.to_string(),
            count,
        };

        Some(Self {
            day,
            total: day_entries.len(),
            directories: directory_frequencies(&day_entries),
            distinct: deduplicate_by_content(&day_entries),
            most_used,
            commands,
        })
    }
}
