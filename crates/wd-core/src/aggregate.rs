//! Read-side aggregation over recorded entries.
//!
//! All functions preserve the original (oldest first) order of their input.
//! Frequency tables remember the order in which keys were first seen, which
//! is what [`most_frequent`] uses to break ties.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, TimeZone};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use crate::entry::Entry;

/// Returns the entries whose timestamp falls on `day` in the time zone `tz`.
pub fn entries_for_day<Tz: TimeZone>(entries: &[Entry], day: NaiveDate, tz: &Tz) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| e.timestamp.with_timezone(tz).date_naive() == day)
        .cloned()
        .collect()
}

/// Keeps the first entry seen for each distinct `content`, in order.
pub fn deduplicate_by_content(entries: &[Entry]) -> Vec<Entry> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for entry in entries {
        if seen.insert(entry.content.as_str()) {
            unique.push(entry.clone());
        }
    }
    unique
}

/// Counts raw occurrences of each distinct command.
pub fn command_frequencies(entries: &[Entry]) -> Frequencies {
    entries.iter().map(|e| e.content.as_str()).collect()
}

/// Counts raw occurrences of each working directory.
///
/// Entries without a directory are counted under
/// [`UNKNOWN_DIRECTORY`](crate::UNKNOWN_DIRECTORY).
pub fn directory_frequencies(entries: &[Entry]) -> Frequencies {
    entries.iter().map(Entry::directory_label).collect()
}

/// Returns the key with the strictly greatest count.
///
/// Ties go to the key that was seen first. Returns `None` for an empty table.
pub fn most_frequent(frequencies: &Frequencies) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for (key, count) in frequencies.iter() {
        if best.is_none_or(|(_, max)| count > max) {
            best = Some((key, count));
        }
    }
    best
}

/// Occurrence counts keyed by string, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frequencies {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Frequencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `key`.
    pub fn increment(&mut self, key: &str) {
        if let Some(&slot) = self.index.get(key) {
            self.counts[slot].1 += 1;
        } else {
            self.index.insert(key.to_string(), self.counts.len());
            self.counts.push((key.to_string(), 1));
        }
    }

    /// The count for `key`, zero if it was never seen.
    pub fn get(&self, key: &str) -> usize {
        self.index.get(key).map_or(0, |&slot| self.counts[slot].1)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates over `(key, count)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(key, count)| (key.as_str(), *count))
    }

    /// Pairs sorted by count, highest first. Equal counts keep first-seen order.
    pub fn by_count_desc(&self) -> Vec<(&str, usize)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }
}

impl<'a> FromIterator<&'a str> for Frequencies {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut frequencies = Self::new();
        for key in iter {
            frequencies.increment(key);
        }
        frequencies
    }
}

/// Serializes as a list of `{"key": .., "count": ..}` objects so that the
/// first-seen order survives in JSON output.
impl Serialize for Frequencies {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Row<'a> {
            key: &'a str,
            count: usize,
        }

        let mut seq = serializer.serialize_seq(Some(self.counts.len()))?;
        for (key, count) in self.iter() {
            seq.serialize_element(&Row { key, count })?;
        }
        seq.end()
    }
}
