//! Locked, atomic persistence of the history file.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use fs2::FileExt;
use tempfile::NamedTempFile;
use wd_core::{History, MAX_ENTRIES};

use crate::StoreError;

/// File name of the history inside the data directory.
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Appended to the history path to form the lock file path.
const LOCK_SUFFIX: &str = ".lock";

/// Default bound on how long to wait for the lock.
const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay between attempts while the lock is held elsewhere.
const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Where and how the history is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the history, lock and temporary files.
    pub data_dir: PathBuf,
    /// File name of the history within `data_dir`.
    pub file_name: String,
    /// Maximum time to wait for the lock before failing.
    pub lock_timeout: Duration,
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            file_name: HISTORY_FILE_NAME.to_string(),
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Path of the history file.
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.file_name)
    }

    /// Path of the lock file: the history path with `.lock` appended.
    pub fn lock_path(&self) -> PathBuf {
        let mut path = self.history_path().into_os_string();
        path.push(LOCK_SUFFIX);
        path.into()
    }
}

/// Result of an [`Store::update`] mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change<T> {
    /// Persist the mutated history, then return the value.
    Write(T),
    /// Leave the file untouched and return the value.
    Skip(T),
}

/// Handle to the on-disk history.
///
/// Holds no in-memory state: every call reads the file afresh.
#[derive(Debug, Clone)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// Opens the store, creating the data directory if necessary.
    ///
    /// On Unix the directory is created with owner-only permissions.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        create_data_dir(&config.data_dir)?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Reads the history. A missing file is an empty history.
    pub fn load(&self) -> Result<History, StoreError> {
        let _lock = self.lock()?;
        self.read()
    }

    /// Writes the history, first dropping the oldest entries beyond
    /// [`MAX_ENTRIES`].
    pub fn save(&self, history: &mut History) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        self.write(history)
    }

    /// Runs a read-modify-write cycle under a single lock acquisition.
    ///
    /// The history is only written back when `f` returns [`Change::Write`].
    pub fn update<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut History) -> Change<T>,
    {
        let _lock = self.lock()?;
        let mut history = self.read()?;
        match f(&mut history) {
            Change::Write(value) => {
                self.write(&mut history)?;
                Ok(value)
            }
            Change::Skip(value) => Ok(value),
        }
    }

    fn lock(&self) -> Result<LockGuard, StoreError> {
        LockGuard::acquire(&self.config.lock_path(), self.config.lock_timeout)
    }

    fn read(&self) -> Result<History, StoreError> {
        let path = self.config.history_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "history file missing, starting empty");
                return Ok(History::new());
            }
            Err(e) => return Err(StoreError::io("failed to read history file", path, e)),
        };

        if content.trim().is_empty() {
            return Ok(History::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Format { path, source })
    }

    fn write(&self, history: &mut History) -> Result<(), StoreError> {
        let dropped = history.truncate_front(MAX_ENTRIES);
        if dropped > 0 {
            tracing::debug!(dropped, "dropped oldest entries beyond retention limit");
        }
        let staged = self.stage(history)?;
        self.commit(staged)?;
        tracing::debug!(entries = history.len(), "saved history");
        Ok(())
    }

    /// Writes the serialized history to a temporary file next to the real one.
    ///
    /// The temporary file is removed if it is dropped without being committed.
    fn stage(&self, history: &History) -> Result<NamedTempFile, StoreError> {
        let dir = &self.config.data_dir;
        let json = serde_json::to_string_pretty(history).map_err(StoreError::Serialize)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".history")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| StoreError::io("failed to create temp file", dir, e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|()| tmp.write_all(b"\n"))
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io("failed to write temp file", tmp.path(), e))?;

        Ok(tmp)
    }

    /// Atomically renames a staged file over the history file.
    fn commit(&self, staged: NamedTempFile) -> Result<(), StoreError> {
        let path = self.config.history_path();
        staged
            .persist(&path)
            .map_err(|e| StoreError::io("failed to replace history file", path, e.error))?;
        Ok(())
    }
}

fn create_data_dir(dir: &Path) -> Result<(), StoreError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
        .create(dir)
        .map_err(|e| StoreError::io("failed to create data directory", dir, e))
}

/// Exclusive advisory lock on the lock file, released on drop.
struct LockGuard {
    file: File,
    path: PathBuf,
}

impl LockGuard {
    fn acquire(path: &Path, timeout: Duration) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(|e| StoreError::io("failed to open lock file", path, e))?;

        let started = Instant::now();
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    tracing::trace!(path = %path.display(), waited = ?started.elapsed(), "acquired lock");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if is_contended(&e) => {
                    if started.elapsed() >= timeout {
                        return Err(StoreError::Lock {
                            path: path.to_path_buf(),
                            timeout,
                        });
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(StoreError::io("failed to lock", path, e)),
            }
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

fn is_contended(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{TimeZone, Utc};
    use wd_core::Entry;

    fn open_store(dir: &Path) -> Store {
        Store::open(StoreConfig::new(dir.join("data"))).unwrap()
    }

    fn history_of(count: usize) -> History {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..count)
            .map(|i| {
                let ts = start + chrono::Duration::seconds(i64::try_from(i).unwrap());
                Entry::new(format!("cmd {i}"), "/repo", ts).unwrap()
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "tmp"))
            .collect()
    }

    #[test]
    fn lock_path_appends_suffix() {
        let config = StoreConfig::new("/data/wd");
        assert_eq!(config.history_path(), PathBuf::from("/data/wd/history.json"));
        assert_eq!(config.lock_path(), PathBuf::from("/data/wd/history.json.lock"));
    }

    #[test]
    fn open_creates_data_dir() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        assert!(store.config().data_dir.is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn data_dir_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        let mode = fs::metadata(&store.config().data_dir).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }

    #[test]
    fn load_missing_file_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        assert!(store.load().unwrap().is_empty());
        assert!(store.config().lock_path().exists());
    }

    #[test]
    fn load_blank_file_is_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        fs::write(store.config().history_path(), "  \n").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        let mut history = history_of(3);
        let expected = history.clone();

        store.save(&mut history).unwrap();
        assert_eq!(store.load().unwrap(), expected);
    }

    #[test]
    fn saved_file_is_pretty_json_with_entries_key() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        store.save(&mut history_of(1)).unwrap();

        let raw = fs::read_to_string(store.config().history_path()).unwrap();
        assert!(raw.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["entries"][0]["content"], "cmd 0");
        assert_eq!(value["entries"][0]["workingDirectory"], "/repo");
        assert!(value["entries"][0]["timestamp"].is_string());
    }

    #[test]
    fn save_truncates_to_most_recent_entries() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        let mut history = history_of(MAX_ENTRIES + 20);

        store.save(&mut history).unwrap();
        assert_eq!(history.len(), MAX_ENTRIES);

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), MAX_ENTRIES);
        assert_eq!(loaded.entries()[0].content, "cmd 20");
        assert_eq!(loaded.entries()[MAX_ENTRIES - 1].content, "cmd 119");
    }

    #[test]
    fn corrupt_file_is_format_error() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        fs::write(store.config().history_path(), "{not json").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Format { .. }), "unexpected error: {err}");
    }

    #[test]
    fn lock_is_released_after_failed_load() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        fs::write(store.config().history_path(), "[]]").unwrap();
        assert!(store.load().is_err());

        let quick = Store::open(store.config().clone().with_lock_timeout(Duration::from_millis(50))).unwrap();
        quick.save(&mut history_of(1)).unwrap();
        assert_eq!(quick.load().unwrap().len(), 1);
    }

    #[test]
    fn held_lock_times_out() {
        let temp = tempfile::tempdir().unwrap();
        let config = StoreConfig::new(temp.path().join("data")).with_lock_timeout(Duration::from_millis(50));
        let store = Store::open(config).unwrap();

        let holder = File::create(store.config().lock_path()).unwrap();
        holder.lock_exclusive().unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::Lock { .. }), "unexpected error: {err}");
        let err = store.save(&mut history_of(1)).unwrap_err();
        assert!(matches!(err, StoreError::Lock { .. }), "unexpected error: {err}");

        FileExt::unlock(&holder).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn uncommitted_write_leaves_original_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        let mut original = history_of(2);
        store.save(&mut original).unwrap();
        let before = fs::read(store.config().history_path()).unwrap();

        // Simulate a crash between writing the temp file and renaming it.
        let staged = store.stage(&history_of(50)).unwrap();
        assert!(staged.path().starts_with(&store.config().data_dir));
        drop(staged);

        assert_eq!(fs::read(store.config().history_path()).unwrap(), before);
        assert_eq!(store.load().unwrap(), original);
        assert!(leftover_temp_files(&store.config().data_dir).is_empty());
    }

    #[test]
    fn committed_write_leaves_no_temp_files() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());
        store.save(&mut history_of(3)).unwrap();
        store.save(&mut history_of(4)).unwrap();
        assert!(leftover_temp_files(&store.config().data_dir).is_empty());
    }

    #[test]
    fn update_skip_does_not_write() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());

        let len = store.update(|history| Change::Skip(history.len())).unwrap();
        assert_eq!(len, 0);
        assert!(!store.config().history_path().exists());
    }

    #[test]
    fn update_write_persists_mutation() {
        let temp = tempfile::tempdir().unwrap();
        let store = open_store(temp.path());

        let len = store
            .update(|history| {
                history.push(Entry::new("ls", "", Utc::now()).unwrap());
                Change::Write(history.len())
            })
            .unwrap();
        assert_eq!(len, 1);
        assert_eq!(store.load().unwrap().entries()[0].content, "ls");
    }
}
