//! Recorded activity entries and the persisted history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ValidationError;

/// Maximum number of entries retained in the history file.
pub const MAX_ENTRIES: usize = 100;

/// Label used when an entry has no working directory.
pub const UNKNOWN_DIRECTORY: &str = "Unknown";

/// One recorded activity: a shell command or clipboard snippet.
///
/// The capitalized aliases accept history files written by earlier
/// versions of the tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// The command or snippet text. Never empty.
    #[serde(alias = "Content")]
    pub content: String,
    /// Absolute directory the entry was recorded in. Empty means unknown.
    #[serde(default, alias = "WorkingDir")]
    pub working_directory: String,
    /// When the entry was recorded.
    #[serde(alias = "Timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    /// Creates a new entry after validating that `content` is not blank.
    pub fn new(
        content: impl Into<String>,
        working_directory: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(ValidationError::Empty { field: "content" });
        }
        Ok(Self {
            content,
            working_directory: working_directory.into(),
            timestamp,
        })
    }

    /// Returns the working directory, or [`UNKNOWN_DIRECTORY`] when unset.
    pub fn directory_label(&self) -> &str {
        if self.working_directory.is_empty() {
            UNKNOWN_DIRECTORY
        } else {
            &self.working_directory
        }
    }
}

/// The full ordered collection of entries, oldest first.
///
/// Entries are only ever appended or dropped from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    #[serde(default, alias = "Entries")]
    entries: Vec<Entry>,
}

impl History {
    /// Creates an empty history.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently recorded entry.
    pub fn last(&self) -> Option<&Entry> {
        self.entries.last()
    }

    /// Appends an entry at the end.
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// The last `n` entries (or all of them), oldest first.
    pub fn recent(&self, n: usize) -> &[Entry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Drops entries from the front until at most `max` remain.
    ///
    /// Returns the number of entries dropped.
    pub fn truncate_front(&mut self, max: usize) -> usize {
        let excess = self.entries.len().saturating_sub(max);
        if excess > 0 {
            self.entries.drain(..excess);
        }
        excess
    }
}

impl From<Vec<Entry>> for History {
    fn from(entries: Vec<Entry>) -> Self {
        Self { entries }
    }
}
