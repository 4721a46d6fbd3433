use std::path::PathBuf;
use std::time::Duration;
use typed_builder::TypedBuilder;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_RECORD_FILE: &str = "shorten_records.json";
pub const DEFAULT_BACKUP_DIR: &str = "backups";
pub const DEFAULT_BACKUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Where a [`RecordStore`](crate::RecordStore) keeps its files and how often it backs up.
///
/// ```
/// use burrow_storage::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::builder()
///     .data_dir("/var/lib/burrow")
///     .backup_interval(Duration::from_secs(60))
///     .build();
/// assert_eq!(config.record_file, "shorten_records.json");
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct StoreConfig {
    /// Directory holding the records file.
    #[builder(default = PathBuf::from(DEFAULT_DATA_DIR), setter(into))]
    pub data_dir: PathBuf,
    /// File name of the records file inside `data_dir`.
    #[builder(default = DEFAULT_RECORD_FILE.to_string(), setter(into))]
    pub record_file: String,
    /// Backup directory; relative paths resolve against `data_dir`.
    #[builder(default = PathBuf::from(DEFAULT_BACKUP_DIR), setter(into))]
    pub backup_dir: PathBuf,
    /// How often the backup job checks for changes.
    #[builder(default = DEFAULT_BACKUP_INTERVAL)]
    pub backup_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl StoreConfig {
    pub fn record_path(&self) -> PathBuf {
        self.data_dir.join(&self.record_file)
    }

    pub fn backup_path(&self) -> PathBuf {
        self.data_dir.join(&self.backup_dir)
    }
}
