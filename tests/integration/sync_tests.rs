use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use quotesync::QsError;
use quotesync::storage::{KeyValueBackend, KvQuoteStore, MemoryBackend, QuoteStore, StoreSnapshot};
use quotesync::sync::engine::resolve_pending;
use quotesync::sync::{
    ConflictChoice, MergePolicy, NullObserver, PendingConflict, RemoteSnapshot, SyncEvent,
    SyncMetadata, SyncOptions, SyncOutcome,
};
use quotesync::test_utils::{
    FetchBehavior, ManualClock, MockRemote, RecordingObserver, StoreFixture, TestLogger, quote,
    quotes,
};
use tokio::sync::Notify;

use crate::{coordinator, coordinator_with, t};

fn server_quotes() -> Vec<quotesync::core::Quote> {
    quotes(&[("Server one", "Server"), ("Server two", "Server")])
}

#[tokio::test]
async fn first_sync_merges_and_pushes() {
    let log = TestLogger::new("first_sync_merges_and_pushes");
    let fixture = StoreFixture::new();
    fixture.book().add("Local", "Mine").unwrap();

    let remote = Arc::new(MockRemote::serving(server_quotes(), t(-60)));
    let observer = Arc::new(RecordingObserver::default());
    let coord = coordinator(&fixture, &remote, observer.clone());

    log.step("sync against a store that has never synced");
    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::Merged);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.merged, 2);
    assert_eq!(report.total, 3);
    assert!(report.pushed);

    let snapshot = fixture.store.load().unwrap();
    log.log_snapshot("after sync", &snapshot);
    assert_eq!(snapshot.quotes[0], quote("Local", "Mine"));
    assert!(snapshot.categories.contains("Server"));
    assert_eq!(snapshot.metadata.last_sync_time, Some(t(0)));
    assert_eq!(snapshot.metadata.server_modified_at, Some(t(-60)));

    let pushes = remote.pushes();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0], snapshot.quotes);

    log.log_events(&observer.events());
    assert_eq!(
        observer.count(|e| matches!(e, SyncEvent::Merged { added: 2, .. })),
        1
    );
    log.pass();
}

#[tokio::test]
async fn local_edit_after_sync_is_a_conflict() {
    let log = TestLogger::new("local_edit_after_sync_is_a_conflict");
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let observer = Arc::new(RecordingObserver::default());
    let coord = coordinator(&fixture, &remote, observer.clone());

    log.step("sync at T0");
    coord.run_sync_cycle().await.unwrap();

    log.step("edit at T0+5");
    fixture.clock.advance_secs(5);
    fixture.book().add("Edited offline", "Mine").unwrap();

    log.step("sync at T0+10");
    fixture.clock.advance_secs(5);
    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::Conflict);
    assert_eq!(report.merged, 0);
    assert!(!report.pushed);
    assert_eq!(report.last_sync_time, Some(t(0)));

    let snapshot = fixture.store.load().unwrap();
    log.log_snapshot("after conflict", &snapshot);
    assert_eq!(snapshot.metadata.last_sync_time, Some(t(0)));
    assert_eq!(snapshot.metadata.local_modified_at, Some(t(5)));
    assert_eq!(snapshot.quotes.len(), 3);

    let pending = coord.pending_conflict().unwrap().expect("conflict stored");
    assert_eq!(pending.server_quotes, server_quotes());
    assert_eq!(pending.detected_at, t(10));
    assert_eq!(remote.pushes().len(), 1);
    assert_eq!(
        observer.count(|e| matches!(e, SyncEvent::ConflictDetected { .. })),
        1
    );
    log.pass();
}

#[tokio::test]
async fn resolve_with_server_overwrites_local() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let observer = Arc::new(RecordingObserver::default());
    let coord = coordinator(&fixture, &remote, observer.clone());

    coord.run_sync_cycle().await.unwrap();
    fixture.clock.advance_secs(5);
    fixture.book().add("Mine only", "Private").unwrap();
    fixture.clock.advance_secs(5);
    remote.set_response(FetchBehavior::Snapshot(RemoteSnapshot {
        quotes: quotes(&[("Fresh", "News")]),
        last_modified: t(8),
    }));
    coord.run_sync_cycle().await.unwrap();

    let resolution = coord.resolve_conflict(ConflictChoice::Server).unwrap();
    assert_eq!(resolution.quotes, 1);
    assert_eq!(resolution.last_sync_time, t(10));

    let snapshot = fixture.store.load().unwrap();
    assert_eq!(snapshot.quotes, quotes(&[("Fresh", "News")]));
    assert_eq!(snapshot.categories.iter().collect::<Vec<_>>(), vec!["News"]);
    assert!(!snapshot.metadata.has_conflict());
    assert!(coord.pending_conflict().unwrap().is_none());
    assert_eq!(
        observer.count(|e| matches!(
            e,
            SyncEvent::ConflictResolved {
                choice: ConflictChoice::Server,
                ..
            }
        )),
        1
    );
}

#[tokio::test]
async fn resolve_with_local_keeps_edits_and_next_sync_merges() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let observer = Arc::new(RecordingObserver::default());
    let coord = coordinator(&fixture, &remote, observer);

    coord.run_sync_cycle().await.unwrap();
    fixture.clock.advance_secs(5);
    fixture.book().add("Keep me", "Private").unwrap();
    fixture.clock.advance_secs(5);
    assert_eq!(
        coord.run_sync_cycle().await.unwrap().outcome,
        SyncOutcome::Conflict
    );

    let before = fixture.store.load().unwrap().quotes;
    coord.resolve_conflict(ConflictChoice::Local).unwrap();
    assert_eq!(fixture.store.load().unwrap().quotes, before);

    fixture.clock.advance_secs(5);
    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::Merged);
    assert_eq!(report.merged, 0);
    assert!(report.pushed);
    let pushed = remote.pushes().pop().unwrap();
    assert!(pushed.contains(&quote("Keep me", "Private")));
}

#[tokio::test]
async fn resolve_without_conflict_fails() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let coord = coordinator(&fixture, &remote, Arc::new(RecordingObserver::default()));

    let err = coord.resolve_conflict(ConflictChoice::Local).unwrap_err();
    assert!(matches!(err, QsError::NoPendingConflict));
}

#[tokio::test]
async fn last_sync_time_strictly_increases() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let coord = coordinator(&fixture, &remote, Arc::new(RecordingObserver::default()));

    let mut previous = None;
    for _ in 0..4 {
        let report = coord.run_sync_cycle().await.unwrap();
        assert_eq!(report.outcome, SyncOutcome::Merged);
        let current = report.last_sync_time;
        assert!(current > previous, "{current:?} should follow {previous:?}");
        previous = current;
    }
    assert_eq!(
        fixture.store.load().unwrap().metadata.last_sync_time,
        previous
    );
}

#[tokio::test]
async fn skip_existing_does_not_duplicate_on_resync() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let coord = coordinator(&fixture, &remote, Arc::new(RecordingObserver::default()));

    coord.run_sync_cycle().await.unwrap();
    fixture.clock.advance_secs(1);
    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.merged, 0);
    assert_eq!(fixture.store.load().unwrap().quotes.len(), 2);
}

#[tokio::test]
async fn append_policy_duplicates_on_resync() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let options = SyncOptions {
        merge_policy: MergePolicy::Append,
        auto_push: false,
    };
    let coord = coordinator_with(
        &fixture,
        &remote,
        Arc::new(RecordingObserver::default()),
        options,
    );

    coord.run_sync_cycle().await.unwrap();
    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.merged, 2);
    assert!(!report.pushed);
    assert_eq!(fixture.store.load().unwrap().quotes.len(), 4);
    assert!(remote.pushes().is_empty());
}

#[tokio::test]
async fn edit_during_fetch_is_seen_as_conflict() {
    let log = TestLogger::new("edit_during_fetch_is_seen_as_conflict");
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let coord = coordinator(&fixture, &remote, Arc::new(RecordingObserver::default()));
    coord.run_sync_cycle().await.unwrap();

    log.step("add a quote while the next fetch is in flight");
    let book = fixture.book();
    let clock = fixture.clock.clone();
    remote.on_fetch(move || {
        clock.advance_secs(3);
        book.add("Typed during fetch", "Mine").unwrap();
    });

    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::Conflict);

    let snapshot = fixture.store.load().unwrap();
    log.log_snapshot("after cycle", &snapshot);
    assert!(snapshot.quotes.contains(&quote("Typed during fetch", "Mine")));
    assert_eq!(snapshot.metadata.last_sync_time, Some(t(0)));
    log.pass();
}

#[tokio::test]
async fn pending_conflict_is_refreshed_not_merged() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let observer = Arc::new(RecordingObserver::default());
    let coord = coordinator(&fixture, &remote, observer.clone());

    coord.run_sync_cycle().await.unwrap();
    fixture.clock.advance_secs(5);
    fixture.book().add("Offline", "Mine").unwrap();
    fixture.clock.advance_secs(5);
    coord.run_sync_cycle().await.unwrap();
    let local_before = fixture.store.load().unwrap().quotes;

    remote.set_response(FetchBehavior::Snapshot(RemoteSnapshot {
        quotes: quotes(&[("A", "X"), ("B", "X"), ("C", "X")]),
        last_modified: t(20),
    }));
    fixture.clock.advance_secs(20);
    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::ConflictPending);
    assert_eq!(report.last_sync_time, Some(t(0)));

    let pending = coord.pending_conflict().unwrap().unwrap();
    assert_eq!(pending.server_quotes.len(), 3);
    assert_eq!(pending.server_modified_at, t(20));
    assert_eq!(pending.detected_at, t(10));
    assert_eq!(pending.refreshed_at, Some(t(30)));

    let snapshot = fixture.store.load().unwrap();
    assert_eq!(snapshot.quotes, local_before);
    assert_eq!(snapshot.metadata.server_modified_at, Some(t(20)));
    assert_eq!(remote.pushes().len(), 1);
    assert_eq!(
        observer.count(|e| matches!(e, SyncEvent::ConflictRefreshed { .. })),
        1
    );
}

#[tokio::test]
async fn push_failure_keeps_merge() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    remote.fail_pushes(true);
    let observer = Arc::new(RecordingObserver::default());
    let coord = coordinator(&fixture, &remote, observer.clone());

    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::Merged);
    assert!(!report.pushed);
    assert!(report.push_error.is_some());

    let snapshot = fixture.store.load().unwrap();
    assert_eq!(snapshot.quotes.len(), 2);
    assert_eq!(snapshot.metadata.last_sync_time, Some(t(0)));
    assert_eq!(
        observer.count(|e| matches!(e, SyncEvent::PushFailed { .. })),
        1
    );
}

#[tokio::test]
async fn fetch_failure_leaves_store_untouched() {
    let fixture = StoreFixture::new();
    fixture.book().add("Local", "Mine").unwrap();
    let before = fixture.store.load().unwrap();

    let remote = Arc::new(MockRemote::unavailable());
    let observer = Arc::new(RecordingObserver::default());
    let coord = coordinator(&fixture, &remote, observer.clone());

    let err = coord.run_sync_cycle().await.unwrap_err();
    assert!(matches!(err, QsError::RemoteUnavailable(_)));
    assert!(err.is_transient());
    assert_eq!(fixture.store.load().unwrap(), before);
    assert_eq!(
        observer.count(|e| matches!(e, SyncEvent::CycleFailed { .. })),
        1
    );

    remote.set_response(FetchBehavior::Malformed("bad body".to_string()));
    let err = coord.run_sync_cycle().await.unwrap_err();
    assert!(matches!(err, QsError::MalformedRemoteData(_)));
    assert_eq!(fixture.store.load().unwrap().metadata.last_sync_time, None);
}

#[tokio::test]
async fn fetch_completing_after_shutdown_is_discarded() {
    let fixture = StoreFixture::new();
    let release = Arc::new(Notify::new());
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)).gated(release.clone()));
    let started = remote.fetch_started();
    let observer = Arc::new(RecordingObserver::default());
    let coord = Arc::new(coordinator(&fixture, &remote, observer.clone()));

    let task = {
        let coord = Arc::clone(&coord);
        tokio::spawn(async move { coord.run_sync_cycle().await })
    };

    started.notified().await;
    coord.shutdown();
    release.notify_one();

    let report = task.await.unwrap().unwrap();
    assert_eq!(report.outcome, SyncOutcome::Discarded);
    assert_eq!(report.fetched, 0);

    let snapshot = fixture.store.load().unwrap();
    assert!(snapshot.quotes.is_empty());
    assert_eq!(snapshot.metadata.last_sync_time, None);
    assert!(remote.pushes().is_empty());
    assert_eq!(
        observer.count(|e| matches!(e, SyncEvent::Merged { .. })),
        0
    );
}

#[tokio::test]
async fn shut_down_coordinator_does_not_fetch() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let coord = coordinator(&fixture, &remote, Arc::new(RecordingObserver::default()));

    coord.shutdown();
    assert!(coord.is_shut_down());
    let report = coord.run_sync_cycle().await.unwrap();
    assert_eq!(report.outcome, SyncOutcome::Discarded);
    assert_eq!(remote.fetch_count(), 0);
}

#[tokio::test]
async fn status_reports_pending_conflict() {
    let fixture = StoreFixture::new();
    let remote = Arc::new(MockRemote::serving(server_quotes(), t(0)));
    let coord = coordinator(&fixture, &remote, Arc::new(RecordingObserver::default()));

    let status = coord.status().unwrap();
    assert_eq!(status.remote.as_deref(), Some("mock://remote"));
    assert!(status.pending_conflict.is_none());
    assert!(!status.local_changes);

    coord.run_sync_cycle().await.unwrap();
    fixture.clock.advance_secs(5);
    fixture.book().add("Offline", "Mine").unwrap();
    assert!(coord.status().unwrap().local_changes);

    fixture.clock.advance_secs(5);
    coord.run_sync_cycle().await.unwrap();
    let status = coord.status().unwrap();
    let pending = status.pending_conflict.unwrap();
    assert_eq!(pending.server_quotes, 2);
    assert_eq!(pending.detected_at, t(10));
    assert_eq!(status.quotes, 3);
}

/// Memory backend that rejects any write clearing the pending conflict while armed.
#[derive(Default)]
struct ClearFailsBackend {
    inner: MemoryBackend,
    armed: AtomicBool,
}

impl KeyValueBackend for ClearFailsBackend {
    fn get(&self, key: &str) -> quotesync::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set_many(&self, entries: &[(&str, Option<String>)]) -> quotesync::Result<()> {
        let clears_pending = entries
            .iter()
            .any(|(key, value)| *key == "pendingConflict" && value.is_none());
        if clears_pending && self.armed.load(Ordering::SeqCst) {
            return Err(QsError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set_many(entries)
    }
}

#[test]
fn failed_resolve_leaves_conflict_and_quotes_intact() {
    let store = KvQuoteStore::new(ClearFailsBackend::default());
    let clock = ManualClock::at(t(10));
    let mine = quotes(&[("Mine", "Local")]);
    store
        .save(&StoreSnapshot {
            quotes: mine.clone(),
            metadata: SyncMetadata {
                last_sync_time: Some(t(0)),
                local_modified_at: Some(t(5)),
                server_modified_at: None,
            },
            ..StoreSnapshot::default()
        })
        .unwrap();
    let conflict = PendingConflict::new(
        RemoteSnapshot {
            quotes: quotes(&[("Srv", "Server")]),
            last_modified: t(8),
        },
        t(9),
    );
    store.save_pending_conflict(Some(&conflict)).unwrap();

    store.backend().armed.store(true, Ordering::SeqCst);
    let err = resolve_pending(&store, &clock, &NullObserver, ConflictChoice::Server).unwrap_err();
    assert!(matches!(err, QsError::Io(_)));

    let after_failure = store.load().unwrap();
    assert_eq!(after_failure.quotes, mine);
    assert_eq!(after_failure.metadata.last_sync_time, Some(t(0)));
    assert_eq!(store.load_pending_conflict().unwrap(), Some(conflict));

    store.backend().armed.store(false, Ordering::SeqCst);
    resolve_pending(&store, &clock, &NullObserver, ConflictChoice::Local).unwrap();
    let resolved = store.load().unwrap();
    assert_eq!(resolved.quotes, mine);
    assert_eq!(resolved.metadata.last_sync_time, Some(t(10)));
    assert!(store.load_pending_conflict().unwrap().is_none());
}
