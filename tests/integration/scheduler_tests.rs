use std::sync::Arc;
use std::time::Duration;

use quotesync::storage::{QuoteStore, StoreSnapshot};
use quotesync::sync::{NullObserver, SyncMetadata, SyncScheduler};
use quotesync::test_utils::{MockRemote, StoreFixture, quotes};

use crate::{coordinator, t};

fn remote() -> Arc<MockRemote> {
    Arc::new(MockRemote::serving(quotes(&[("Tick", "Server")]), t(0)))
}

#[tokio::test(start_paused = true)]
async fn runs_requested_number_of_cycles() {
    let fixture = StoreFixture::new();
    let remote = remote();
    let coord = coordinator(&fixture, &remote, Arc::new(NullObserver));

    let scheduler = SyncScheduler::new(Duration::from_secs(30)).with_max_cycles(Some(3));
    let summary = scheduler.run(&coord, std::future::pending()).await;

    assert_eq!(summary.cycles, 3);
    assert_eq!(summary.merged, 3);
    assert_eq!(remote.fetch_count(), 3);
    assert!(coord.is_shut_down());
}

#[tokio::test(start_paused = true)]
async fn handle_stops_between_ticks() {
    let fixture = StoreFixture::new();
    let remote = remote();
    let coord = coordinator(&fixture, &remote, Arc::new(NullObserver));

    let scheduler = SyncScheduler::new(Duration::from_secs(30));
    let handle = scheduler.handle();
    let (summary, ()) = tokio::join!(scheduler.run(&coord, std::future::pending()), async {
        tokio::time::sleep(Duration::from_secs(65)).await;
        handle.stop();
    });

    // Ticks at 0s, 30s and 60s.
    assert_eq!(summary.cycles, 3);
    assert!(coord.is_shut_down());
}

#[tokio::test(start_paused = true)]
async fn shutdown_future_ends_the_run() {
    let fixture = StoreFixture::new();
    let remote = remote();
    let coord = coordinator(&fixture, &remote, Arc::new(NullObserver));

    let scheduler = SyncScheduler::new(Duration::from_secs(30));
    let summary = scheduler
        .run(&coord, tokio::time::sleep(Duration::from_secs(45)))
        .await;

    assert_eq!(summary.cycles, 2);
    assert_eq!(remote.fetch_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn failures_do_not_stop_the_loop() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::unavailable());
    let coord = coordinator(&fixture, &remote, Arc::new(NullObserver));

    let scheduler = SyncScheduler::new(Duration::from_secs(10)).with_max_cycles(Some(4));
    let summary = scheduler.run(&coord, std::future::pending()).await;

    assert_eq!(summary.cycles, 4);
    assert_eq!(summary.failures, 4);
    assert_eq!(summary.merged, 0);
}

#[tokio::test(start_paused = true)]
async fn conflicts_are_counted_each_cycle() {
    let fixture = StoreFixture::new();
    fixture
        .store
        .save(&StoreSnapshot {
            quotes: quotes(&[("Offline", "Mine")]),
            metadata: SyncMetadata {
                last_sync_time: Some(t(-10)),
                local_modified_at: Some(t(-5)),
                server_modified_at: None,
            },
            ..StoreSnapshot::default()
        })
        .unwrap();
    let remote = remote();
    let coord = coordinator(&fixture, &remote, Arc::new(NullObserver));

    let scheduler = SyncScheduler::new(Duration::from_secs(30)).with_max_cycles(Some(2));
    let summary = scheduler.run(&coord, std::future::pending()).await;

    assert_eq!(summary.conflicts, 2);
    assert_eq!(summary.merged, 0);
    assert!(remote.pushes().is_empty());
    assert!(coord.pending_conflict().unwrap().is_some());
}
