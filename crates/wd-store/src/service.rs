//! Recording and reporting on top of the [`Store`].

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use wd_core::{Entry, MAX_ENTRIES, Summary, ValidationError};

use crate::StoreError;
use crate::store::{Change, Store};

/// Outcome of [`LogService::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// The entry was appended; `total` is the entry count after saving.
    Recorded { total: usize },
    /// The content matched the most recent entry and was not recorded.
    Duplicate,
}

/// Entry creation and read-side aggregation.
#[derive(Debug, Clone)]
pub struct LogService {
    store: Store,
}

impl LogService {
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Records `content` at the current time.
    ///
    /// Skips the write when `content` equals the most recent entry's content.
    pub fn record(&self, content: &str, working_directory: &str) -> Result<RecordOutcome, StoreError> {
        self.record_at(content, working_directory, Utc::now())
    }

    /// Records `content` with the given timestamp.
    ///
    /// The stored timestamp never precedes the most recent entry's.
    pub fn record_at(
        &self,
        content: &str,
        working_directory: &str,
        now: DateTime<Utc>,
    ) -> Result<RecordOutcome, StoreError> {
        if content.trim().is_empty() {
            return Err(ValidationError::Empty { field: "content" }.into());
        }

        let outcome = self.store.update(|history| {
            let last = history.last();
            if last.is_some_and(|e| e.content == content) {
                return Change::Skip(RecordOutcome::Duplicate);
            }

            let timestamp = last.map_or(now, |e| now.max(e.timestamp));
            history.push(Entry {
                content: content.to_string(),
                working_directory: working_directory.to_string(),
                timestamp,
            });
            Change::Write(RecordOutcome::Recorded {
                total: history.len().min(MAX_ENTRIES),
            })
        })?;

        match outcome {
            RecordOutcome::Recorded { total } => tracing::debug!(total, "recorded entry"),
            RecordOutcome::Duplicate => tracing::debug!("skipped duplicate of most recent entry"),
        }
        Ok(outcome)
    }

    /// The last `n` entries, oldest first.
    ///
    /// An empty history yields an empty list, not an error.
    pub fn recent(&self, n: usize) -> Result<Vec<Entry>, StoreError> {
        let history = self.store.load()?;
        Ok(history.recent(n).to_vec())
    }

    /// Summarizes today's activity in the local time zone.
    ///
    /// Returns `Ok(None)` when nothing was recorded today.
    pub fn summarize_today(&self) -> Result<Option<Summary>, StoreError> {
        self.summarize_day(Local::now().date_naive(), &Local)
    }

    /// Summarizes the activity of `day` as observed in time zone `tz`.
    pub fn summarize_day<Tz: TimeZone>(
        &self,
        day: NaiveDate,
        tz: &Tz,
    ) -> Result<Option<Summary>, StoreError> {
        let history = self.store.load()?;
        Ok(Summary::for_day(history.entries(), day, tz))
    }
}
