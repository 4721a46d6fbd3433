use std::sync::Arc;
use std::time::Duration;

use burrow_core::ManualClock;
use burrow_session::{spawn_reaper, SessionConfig, SessionError, SessionStore};
use jiff::SignedDuration;

fn store(max_lifetime: Duration, gc_interval: Duration) -> (Arc<SessionStore>, ManualClock) {
    let clock = ManualClock::new("2024-03-01T10:00:00Z".parse().unwrap());
    let config = SessionConfig::builder()
        .max_lifetime(max_lifetime)
        .gc_interval(gc_interval)
        .build();
    (
        Arc::new(SessionStore::with_clock(config, clock.clone())),
        clock,
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reaper_reclaims_abandoned_sessions() {
    let (store, clock) = store(Duration::from_secs(60), Duration::from_millis(20));
    let task = spawn_reaper(Arc::clone(&store));

    for _ in 0..10 {
        store.start(None);
    }
    clock.advance(SignedDuration::from_secs(30));
    let survivor = store.start(None).session.id;
    assert_eq!(store.len(), 11);

    // The first ten are past their expiry, the survivor is not.
    clock.advance(SignedDuration::from_secs(45));

    awaitility::at_most(Duration::from_secs(5))
        .poll_interval(Duration::from_millis(10))
        .until_async(|| async { store.len() == 1 })
        .await;
    assert!(store.get(Some(&survivor)).is_ok());

    task.shutdown().await;
}

#[tokio::test]
async fn reaper_stops_on_shutdown() {
    let (store, clock) = store(Duration::from_secs(1), Duration::from_millis(20));
    spawn_reaper(Arc::clone(&store)).shutdown().await;

    store.start(None);
    clock.advance(SignedDuration::from_secs(2));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(store.len(), 1);
    assert_eq!(store.gc(), 1);
}

#[test]
fn expired_session_is_reported_then_gone() {
    let (store, clock) = store(Duration::from_secs(1), Duration::from_secs(600));
    let expired = store.start(None).session.id;
    let other = store.start(None).session.id;

    clock.advance(SignedDuration::from_secs(2));
    assert_eq!(store.get(Some(&expired)), Err(SessionError::Expired));

    let before = store.len();
    assert!(store.gc() >= 1);
    assert!(store.len() < before);
    assert_eq!(store.get(Some(&other)), Err(SessionError::NotExist));
}

#[test]
fn concurrent_starts_issue_distinct_sessions() {
    let (store, _clock) = store(Duration::from_secs(60), Duration::from_secs(600));

    let ids: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                scope.spawn(move || store.start(None).session.id)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let unique: std::collections::HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), 16);
    assert_eq!(store.len(), 16);
}
