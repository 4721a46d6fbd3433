//! File-backed record store.
//!
//! [`RecordStore`] keeps every short code in memory and mirrors the whole set
//! to a single JSON file on each mutation. A background job copies that file
//! into a backup directory whenever it changed since the last backup.

pub mod backup;
pub mod config;
pub mod store;

pub use backup::spawn_backup_scheduler;
pub use config::StoreConfig;
pub use store::RecordStore;
