//! Storage layer for the activity log.
//!
//! Provides persistence of the [`History`](wd_core::History) as a single JSON
//! file, plus the recording and reporting API built on top of it.
//!
//! # Concurrency
//!
//! Processes sharing a data directory coordinate through an advisory lock on
//! `<history file>.lock`. [`Store::load`] and [`Store::save`] each take the
//! lock for their own duration only, so a caller doing `load` then `save`
//! can lose a concurrent writer's append. [`Store::update`] holds the lock
//! across the whole read-modify-write cycle and is what
//! [`LogService::record`] uses.
//!
//! Writes go to a temporary file in the data directory which is then renamed
//! over the history file, so readers never observe a partially written file.
//!
//! # File Format
//!
//! ```json
//! {
//!   "entries": [
//!     {"content": "git status", "workingDirectory": "/repo", "timestamp": "2024-01-15T10:30:00Z"}
//!   ]
//! }
//! ```
//!
//! A missing or whitespace-only file is an empty history.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

mod import;
mod service;
mod store;

pub use import::{DEFAULT_IMPORT_LIMIT, ImportReport, import_recent, read_history_lines};
pub use service::{LogService, RecordOutcome};
pub use store::{Change, HISTORY_FILE_NAME, Store, StoreConfig};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The lock file could not be locked within the configured timeout.
    #[error("timed out after {timeout:?} waiting for lock on {}", path.display())]
    Lock { path: PathBuf, timeout: Duration },
    /// A filesystem operation failed.
    #[error("{context}: {}", path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The history file exists but could not be parsed.
    #[error("corrupt history file {}", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The history could not be serialized.
    #[error("failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
    /// An entry failed validation.
    #[error(transparent)]
    Validation(#[from] wd_core::ValidationError),
}

impl StoreError {
    pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            context,
            path: path.into(),
            source,
        }
    }
}
