use crate::config::StoreConfig;
use burrow_core::{
    validate_target_url, Clock, Repository, Result, ShortCode, StoreError, SystemClock, UrlParams,
    UrlRecord,
};
use jiff::tz::TimeZone;
use jiff::Timestamp;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};

const BACKUP_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const MAX_BACKUPS_PER_STAMP: usize = 1000;

#[derive(Debug)]
struct State {
    cache: HashMap<ShortCode, UrlRecord>,
    /// Set by every successful mutation, cleared by a backup.
    dirty: bool,
    last_backup: Timestamp,
}

/// A [`Repository`] holding every record in memory and mirroring it to one JSON file.
///
/// All reads take the shared lock; mutations and backups take the exclusive
/// lock, so a reader sees either the complete state before a mutation or the
/// complete state after it.
///
/// Every mutation rewrites the whole records file before returning. The new
/// contents go to a sibling `.tmp` file which is fsynced and then renamed over
/// the records file, so a crash leaves either the old or the new file on disk.
/// If the write fails the in-memory change is rolled back and the error is
/// returned. The rewrite happens while holding the exclusive lock, which makes
/// file I/O the throughput bound for writers.
pub struct RecordStore {
    state: RwLock<State>,
    record_path: PathBuf,
    backup_dir: PathBuf,
    backup_interval: Duration,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("record_path", &self.record_path)
            .field("backup_dir", &self.backup_dir)
            .field("records", &self.len())
            .finish()
    }
}

impl RecordStore {
    /// Opens the store described by `config`, loading any existing records.
    ///
    /// A missing records file is an empty store. Malformed JSON fails with
    /// [`StoreError::InvalidData`].
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::open_with_clock(config, SystemClock)
    }

    /// Like [`RecordStore::open`], reading the current time from `clock`.
    pub fn open_with_clock(config: StoreConfig, clock: impl Clock) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)
            .map_err(|e| io_error("create data directory", &config.data_dir, e))?;

        let backup_dir = config.backup_path();
        fs::create_dir_all(&backup_dir)
            .map_err(|e| io_error("create backup directory", &backup_dir, e))?;

        let record_path = config.record_path();
        let cache = load_records(&record_path)?;
        let clock: Arc<dyn Clock> = Arc::new(clock);

        info!(
            path = %record_path.display(),
            records = cache.len(),
            "loaded url records"
        );

        Ok(Self {
            state: RwLock::new(State {
                cache,
                dirty: false,
                last_backup: clock.now(),
            }),
            record_path,
            backup_dir,
            backup_interval: config.backup_interval,
            clock,
        })
    }

    /// Backs up the records file if anything changed since the last backup.
    ///
    /// Copies the file verbatim to `<backup_dir>/<stem>_<YYYYMMDD_HHMMSS>.json`
    /// (local time) and returns its path, or `None` when the store is clean.
    /// Runs under the exclusive lock, so mutations wait for the copy.
    pub fn backup_now(&self) -> Result<Option<PathBuf>> {
        if !self.state.read().dirty {
            trace!("records unchanged, skipping backup");
            return Ok(None);
        }

        let mut state = self.state.write();
        if !state.dirty {
            return Ok(None);
        }

        let now = self.clock.now();
        let path = self.copy_to_backup(now)?;

        state.dirty = false;
        state.last_backup = now;
        info!(path = %path.display(), records = state.cache.len(), "backed up url records");
        Ok(Some(path))
    }

    /// Copies the records file into a backup file that did not exist before.
    ///
    /// Backups taken within the same second get a numeric suffix
    /// (`<stem>_<stamp>_1.json`, ...) instead of replacing each other.
    fn copy_to_backup(&self, now: Timestamp) -> Result<PathBuf> {
        let stem = self
            .record_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("records");
        let stamp = now
            .to_zoned(TimeZone::system())
            .strftime(BACKUP_STAMP_FORMAT)
            .to_string();

        let mut source = File::open(&self.record_path)
            .map_err(|e| io_error("open records file", &self.record_path, e))?;

        for suffix in 0..MAX_BACKUPS_PER_STAMP {
            let name = match suffix {
                0 => format!("{stem}_{stamp}.json"),
                n => format!("{stem}_{stamp}_{n}.json"),
            };
            let path = self.backup_dir.join(name);
            let mut target = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(io_error("create backup file", &path, e)),
            };

            let copied = io::copy(&mut source, &mut target).and_then(|_| target.sync_all());
            if let Err(e) = copied {
                let _ = fs::remove_file(&path);
                return Err(io_error("copy records file to", &path, e));
            }
            return Ok(path);
        }

        Err(StoreError::Io(format!(
            "too many backups for {stamp} in {}",
            self.backup_dir.display()
        )))
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.state.read().cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().cache.is_empty()
    }

    /// Whether a mutation happened since the last backup.
    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// When the last backup was taken (the open time if none was taken yet).
    pub fn last_backup(&self) -> Timestamp {
        self.state.read().last_backup
    }

    pub fn record_path(&self) -> &Path {
        &self.record_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn backup_interval(&self) -> Duration {
        self.backup_interval
    }

    /// Rewrites the records file from `cache`. Callers hold the write lock.
    fn write_records(&self, cache: &HashMap<ShortCode, UrlRecord>) -> Result<()> {
        let mut records: Vec<&UrlRecord> = cache.values().collect();
        // Stable file layout keeps backups diffable; it is not a read-order guarantee.
        records.sort_by(|a, b| {
            a.create_time
                .cmp(&b.create_time)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });

        let mut json = serde_json::to_vec_pretty(&records)
            .map_err(|e| StoreError::InvalidData(format!("serialize records: {e}")))?;
        json.push(b'\n');

        let tmp_path = tmp_path(&self.record_path);
        write_synced(&tmp_path, &json).map_err(|e| io_error("write", &tmp_path, e))?;
        if let Err(e) = fs::rename(&tmp_path, &self.record_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(io_error("replace records file", &self.record_path, e));
        }

        trace!(path = %self.record_path.display(), records = records.len(), "rewrote records file");
        Ok(())
    }
}

impl Repository for RecordStore {
    fn create_url(&self, params: UrlParams) -> Result<UrlRecord> {
        validate_target_url(&params.target_url)?;

        let mut state = self.state.write();
        if state.cache.contains_key(params.short_code.as_str()) {
            return Err(StoreError::Conflict(params.short_code.to_string()));
        }

        let record = params.into_record(self.clock.now());
        state
            .cache
            .insert(record.short_code.clone(), record.clone());

        if let Err(err) = self.write_records(&state.cache) {
            state.cache.remove(record.short_code.as_str());
            error!(code = %record.short_code, error = %err, "create rolled back, records file not written");
            return Err(err);
        }

        state.dirty = true;
        debug!(code = %record.short_code, target = %record.target_url, "created url record");
        Ok(record)
    }

    fn get_url_by_code(&self, code: &str) -> Result<UrlRecord> {
        self.state
            .read()
            .cache
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    fn get_all_urls(&self) -> Result<Vec<UrlRecord>> {
        Ok(self.state.read().cache.values().cloned().collect())
    }

    fn update_url(&self, params: UrlParams) -> Result<UrlRecord> {
        validate_target_url(&params.target_url)?;

        let mut state = self.state.write();
        let create_time = match state.cache.get(params.short_code.as_str()) {
            Some(existing) => existing.create_time,
            None => return Err(StoreError::NotFound(params.short_code.to_string())),
        };

        let record = params.into_record(create_time);
        let previous = state
            .cache
            .insert(record.short_code.clone(), record.clone());

        if let Err(err) = self.write_records(&state.cache) {
            if let Some(previous) = previous {
                state.cache.insert(previous.short_code.clone(), previous);
            }
            error!(code = %record.short_code, error = %err, "update rolled back, records file not written");
            return Err(err);
        }

        state.dirty = true;
        debug!(code = %record.short_code, target = %record.target_url, "updated url record");
        Ok(record)
    }

    fn delete_url(&self, code: &str) -> Result<()> {
        let mut state = self.state.write();
        let Some(removed) = state.cache.remove(code) else {
            return Err(StoreError::NotFound(code.to_string()));
        };

        if let Err(err) = self.write_records(&state.cache) {
            error!(code = %removed.short_code, error = %err, "delete rolled back, records file not written");
            state.cache.insert(removed.short_code.clone(), removed);
            return Err(err);
        }

        state.dirty = true;
        debug!(code = %code, "deleted url record");
        Ok(())
    }
}

fn load_records(path: &Path) -> Result<HashMap<ShortCode, UrlRecord>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "records file does not exist, starting empty");
            return Ok(HashMap::new());
        }
        Err(e) => return Err(io_error("read records file", path, e)),
    };

    // A `null` document is how an empty list has historically been written.
    let records: Option<Vec<UrlRecord>> = serde_json::from_slice(&bytes).map_err(|e| {
        StoreError::InvalidData(format!("parse records file {}: {e}", path.display()))
    })?;

    let mut cache = HashMap::new();
    for record in records.into_iter().flatten() {
        if let Some(previous) = cache.insert(record.short_code.clone(), record) {
            warn!(code = %previous.short_code, "duplicate short code in records file, keeping the later entry");
        }
    }
    Ok(cache)
}

fn write_synced(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(contents)?;
    file.sync_all()
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(action: &str, path: &Path, err: io::Error) -> StoreError {
    StoreError::Io(format!("{action} {}: {err}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::ManualClock;
    use jiff::SignedDuration;
    use tempfile::TempDir;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn params(c: &str, url: &str) -> UrlParams {
        UrlParams::new(code(c), url)
    }

    fn open(dir: &TempDir, clock: ManualClock) -> RecordStore {
        let config = StoreConfig::builder().data_dir(dir.path()).build();
        RecordStore::open_with_clock(config, clock).unwrap()
    }

    fn start_clock() -> ManualClock {
        ManualClock::new("2024-03-01T10:00:00Z".parse().unwrap())
    }

    #[test]
    fn create_and_get() {
        let dir = TempDir::new().unwrap();
        let clock = start_clock();
        let store = open(&dir, clock.clone());

        let created = store
            .create_url(params("abc123", "https://example.com").with_remark("home"))
            .unwrap();
        assert_eq!(created.create_time, clock.now());

        let fetched = store.get_url_by_code("abc123").unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.remark, "home");
        assert!(store.is_dirty());
    }

    #[test]
    fn get_nonexistent() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        let err = store.get_url_by_code("nope").unwrap_err();
        assert_eq!(err, StoreError::NotFound("nope".to_string()));
    }

    #[test]
    fn duplicate_create_conflicts_and_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        let first = store
            .create_url(params("abc123", "https://example.com"))
            .unwrap();
        let err = store
            .create_url(params("abc123", "https://other.com"))
            .unwrap_err();

        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_url_by_code("abc123").unwrap(), first);
    }

    #[test]
    fn codes_are_case_sensitive() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        store.create_url(params("abc", "https://lower.com")).unwrap();
        store.create_url(params("ABC", "https://upper.com")).unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.get_url_by_code("ABC").unwrap().target_url, "https://upper.com");
    }

    #[test]
    fn create_rejects_empty_target() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        let err = store.create_url(params("abc", "")).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.is_empty());
        assert!(!store.is_dirty());
    }

    #[test]
    fn update_preserves_create_time() {
        let dir = TempDir::new().unwrap();
        let clock = start_clock();
        let store = open(&dir, clock.clone());

        let created = store.create_url(params("a", "https://u1.example")).unwrap();
        clock.advance(SignedDuration::from_hours(3));

        let updated = store
            .update_url(params("a", "https://u2.example").with_remark("moved"))
            .unwrap();
        assert_eq!(updated.create_time, created.create_time);

        let fetched = store.get_url_by_code("a").unwrap();
        assert_eq!(fetched.target_url, "https://u2.example");
        assert_eq!(fetched.remark, "moved");
        assert_eq!(fetched.create_time, created.create_time);
    }

    #[test]
    fn update_nonexistent() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        let err = store.update_url(params("a", "https://example.com")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn delete_is_terminal_and_code_is_reusable() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        store.create_url(params("a", "https://example.com")).unwrap();
        store.delete_url("a").unwrap();

        assert!(matches!(store.get_url_by_code("a"), Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_url("a"), Err(StoreError::NotFound(_))));

        store.create_url(params("a", "https://again.example")).unwrap();
        assert_eq!(store.get_url_by_code("a").unwrap().target_url, "https://again.example");
    }

    #[test]
    fn returned_records_are_copies() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        store.create_url(params("a", "https://example.com")).unwrap();

        let mut copy = store.get_url_by_code("a").unwrap();
        copy.target_url = "https://evil.example".to_string();
        let mut all = store.get_all_urls().unwrap();
        all[0].remark = "changed".to_string();

        let stored = store.get_url_by_code("a").unwrap();
        assert_eq!(stored.target_url, "https://example.com");
        assert_eq!(stored.remark, "");
    }

    #[test]
    fn get_all_returns_every_record() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        for c in ["a", "b", "c"] {
            store.create_url(params(c, "https://example.com")).unwrap();
        }

        let mut codes: Vec<String> = store
            .get_all_urls()
            .unwrap()
            .into_iter()
            .map(|r| r.short_code.to_string())
            .collect();
        codes.sort();
        assert_eq!(codes, ["a", "b", "c"]);
    }

    #[test]
    fn failed_write_rolls_back_the_mutation() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());
        store.create_url(params("keep", "https://example.com")).unwrap();

        // A directory squatting on the temp path makes the rewrite fail.
        fs::create_dir(tmp_path(store.record_path())).unwrap();

        let err = store.create_url(params("new", "https://example.com")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(matches!(store.get_url_by_code("new"), Err(StoreError::NotFound(_))));

        let err = store.update_url(params("keep", "https://other.com")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.get_url_by_code("keep").unwrap().target_url, "https://example.com");

        let err = store.delete_url("keep").unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(store.get_url_by_code("keep").is_ok());
    }

    #[test]
    fn backup_skips_clean_store() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        assert_eq!(store.backup_now().unwrap(), None);
        assert_eq!(fs::read_dir(store.backup_dir()).unwrap().count(), 0);
    }

    #[test]
    fn backup_copies_file_and_clears_dirty() {
        let dir = TempDir::new().unwrap();
        let clock = start_clock();
        let store = open(&dir, clock.clone());

        store.create_url(params("a", "https://example.com")).unwrap();
        clock.advance(SignedDuration::from_mins(5));

        let path = store.backup_now().unwrap().expect("store was dirty");
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("shorten_records_"), "{name}");
        assert!(name.ends_with(".json"), "{name}");
        // shorten_records_YYYYMMDD_HHMMSS.json
        assert_eq!(name.len(), "shorten_records_".len() + 15 + ".json".len());

        assert_eq!(fs::read(&path).unwrap(), fs::read(store.record_path()).unwrap());
        assert!(!store.is_dirty());
        assert_eq!(store.last_backup(), clock.now());

        // Nothing changed since, so the next tick is a no-op.
        assert_eq!(store.backup_now().unwrap(), None);
    }

    #[test]
    fn backup_fails_when_records_file_vanished() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        store.create_url(params("a", "https://example.com")).unwrap();
        fs::remove_file(store.record_path()).unwrap();

        assert!(matches!(store.backup_now(), Err(StoreError::Io(_))));
        assert!(store.is_dirty());
    }

    #[test]
    fn backups_in_the_same_second_are_kept() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        store.create_url(params("a", "https://a.io")).unwrap();
        let first = store.backup_now().unwrap().expect("store was dirty");
        let first_contents = fs::read(&first).unwrap();

        store.create_url(params("b", "https://b.io")).unwrap();
        let second = store.backup_now().unwrap().expect("store was dirty");

        assert_ne!(first, second);
        let name = second.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("_1.json"), "{name}");
        assert_eq!(fs::read_dir(store.backup_dir()).unwrap().count(), 2);
        assert_eq!(fs::read(&first).unwrap(), first_contents);
        assert_eq!(fs::read(&second).unwrap(), fs::read(store.record_path()).unwrap());
    }

    #[test]
    fn failed_replace_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = open(&dir, start_clock());

        // A non-empty directory cannot be replaced by a file.
        fs::create_dir(store.record_path()).unwrap();
        fs::write(store.record_path().join("squatter"), b"x").unwrap();

        let err = store.create_url(params("a", "https://a.io")).unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
        assert!(!tmp_path(store.record_path()).exists());
        assert!(store.is_empty());
    }
}
