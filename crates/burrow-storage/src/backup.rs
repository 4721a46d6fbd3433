use crate::store::RecordStore;
use burrow_core::PeriodicTask;
use std::sync::Arc;
use tracing::error;

/// Starts the job that backs up `store` every `backup_interval`.
///
/// A failed backup is logged and retried on the next tick; the dirty flag
/// stays set until a backup succeeds.
pub fn spawn_backup_scheduler(store: Arc<RecordStore>) -> PeriodicTask {
    let interval = store.backup_interval();
    PeriodicTask::spawn("record-backup", interval, move || {
        if let Err(err) = store.backup_now() {
            error!(error = %err, "url records backup failed");
        }
    })
}
