//! In-memory [`RemoteEndpoint`] with scripted fetch results.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::core::Quote;
use crate::error::{QsError, Result};
use crate::sync::remote::{RemoteEndpoint, RemoteSnapshot};

/// Scripted result of one fetch.
#[derive(Debug, Clone)]
pub enum FetchBehavior {
    Snapshot(RemoteSnapshot),
    Unavailable(String),
    Malformed(String),
}

type FetchHook = Box<dyn Fn() + Send + Sync>;

/// Fetch results are consumed from a queue; the last one repeats.
pub struct MockRemote {
    queue: Mutex<VecDeque<FetchBehavior>>,
    last: Mutex<FetchBehavior>,
    pushes: Mutex<Vec<Vec<Quote>>>,
    fail_push: AtomicBool,
    fetch_count: AtomicUsize,
    on_fetch: Mutex<Option<FetchHook>>,
    started: Arc<Notify>,
    gate: Option<Arc<Notify>>,
}

impl MockRemote {
    pub fn new(initial: FetchBehavior) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            last: Mutex::new(initial),
            pushes: Mutex::new(Vec::new()),
            fail_push: AtomicBool::new(false),
            fetch_count: AtomicUsize::new(0),
            on_fetch: Mutex::new(None),
            started: Arc::new(Notify::new()),
            gate: None,
        }
    }

    pub fn serving(quotes: Vec<Quote>, last_modified: DateTime<Utc>) -> Self {
        Self::new(FetchBehavior::Snapshot(RemoteSnapshot {
            quotes,
            last_modified,
        }))
    }

    pub fn unavailable() -> Self {
        Self::new(FetchBehavior::Unavailable("connection refused".to_string()))
    }

    /// Hold every fetch until `release` is notified.
    #[must_use]
    pub fn gated(mut self, release: Arc<Notify>) -> Self {
        self.gate = Some(release);
        self
    }

    /// Notified each time a fetch begins.
    pub fn fetch_started(&self) -> Arc<Notify> {
        Arc::clone(&self.started)
    }

    pub fn enqueue(&self, behavior: FetchBehavior) {
        self.queue.lock().push_back(behavior);
    }

    pub fn set_response(&self, behavior: FetchBehavior) {
        self.queue.lock().clear();
        *self.last.lock() = behavior;
    }

    /// Run `hook` while the fetch is in flight, before it returns.
    pub fn on_fetch(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_fetch.lock() = Some(Box::new(hook));
    }

    pub fn fail_pushes(&self, fail: bool) {
        self.fail_push.store(fail, Ordering::SeqCst);
    }

    pub fn pushes(&self) -> Vec<Vec<Quote>> {
        self.pushes.lock().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn next_behavior(&self) -> FetchBehavior {
        let mut queue = self.queue.lock();
        match queue.pop_front() {
            Some(next) => {
                *self.last.lock() = next.clone();
                next
            }
            None => self.last.lock().clone(),
        }
    }
}

#[async_trait]
impl RemoteEndpoint for MockRemote {
    async fn fetch_snapshot(&self) -> Result<RemoteSnapshot> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();

        if let Some(gate) = self.gate.clone() {
            gate.notified().await;
        }

        if let Some(hook) = self.on_fetch.lock().as_ref() {
            hook();
        }

        match self.next_behavior() {
            FetchBehavior::Snapshot(snapshot) => Ok(snapshot),
            FetchBehavior::Unavailable(msg) => Err(QsError::RemoteUnavailable(msg)),
            FetchBehavior::Malformed(msg) => Err(QsError::MalformedRemoteData(msg)),
        }
    }

    async fn push_snapshot(&self, quotes: &[Quote]) -> Result<()> {
        if self.fail_push.load(Ordering::SeqCst) {
            return Err(QsError::RemoteUnavailable("push rejected".to_string()));
        }
        self.pushes.lock().push(quotes.to_vec());
        Ok(())
    }

    fn describe(&self) -> String {
        "mock://remote".to_string()
    }
}
