use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, trace};

/// A supervised background job that runs a blocking closure on a fixed interval.
///
/// The first run happens one full interval after spawning. Each run executes on
/// tokio's blocking pool; a panicking run is logged and the schedule continues.
/// The job stops when [`PeriodicTask::shutdown`] is awaited or the handle is
/// dropped.
#[derive(Debug)]
pub struct PeriodicTask {
    name: &'static str,
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawns the job onto the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime context.
    pub fn spawn<F>(name: &'static str, interval: Duration, job: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let interval = interval.max(Duration::from_millis(1));
        let handle = tokio::spawn(Self::run(name, interval, Arc::new(job), shutdown_rx));

        debug!(task = name, interval_ms = interval.as_millis() as u64, "periodic task started");

        Self {
            name,
            shutdown_tx,
            handle: Some(handle),
        }
    }

    async fn run<F>(
        name: &'static str,
        interval: Duration,
        job: Arc<F>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) where
        F: Fn() + Send + Sync + 'static,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip the immediate first tick
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    trace!(task = name, "periodic task tick");
                    let job = Arc::clone(&job);
                    if let Err(err) = tokio::task::spawn_blocking(move || job()).await {
                        error!(task = name, error = %err, "periodic task run failed");
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        debug!(task = name, "periodic task stopped");
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Signals the job to stop and waits for an in-flight run to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(err) = handle.await {
                error!(task = self.name, error = %err, "periodic task ended abnormally");
            }
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn runs_repeatedly_until_shutdown() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let task = PeriodicTask::spawn("counter", Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        awaitility::at_most(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(10))
            .until_async(|| async { count.load(Ordering::SeqCst) >= 3 })
            .await;

        task.shutdown().await;
        let stopped_at = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), stopped_at);
    }

    #[tokio::test]
    async fn first_run_waits_a_full_interval() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let task = PeriodicTask::spawn("slow", Duration::from_secs(3600), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(task.name(), "slow");
        task.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn panicking_run_does_not_stop_the_schedule() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let task = PeriodicTask::spawn("flaky", Duration::from_millis(10), move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("first run fails");
            }
        });

        awaitility::at_most(Duration::from_secs(5))
            .poll_interval(Duration::from_millis(10))
            .until_async(|| async { count.load(Ordering::SeqCst) >= 2 })
            .await;

        task.shutdown().await;
    }
}
