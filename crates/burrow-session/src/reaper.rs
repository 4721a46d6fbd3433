use crate::store::SessionStore;
use burrow_core::PeriodicTask;
use std::sync::Arc;

/// Starts the job that evicts expired sessions every `gc_interval`.
pub fn spawn_reaper(store: Arc<SessionStore>) -> PeriodicTask {
    let interval = store.config().gc_interval;
    PeriodicTask::spawn("session-reaper", interval, move || {
        store.gc();
    })
}
