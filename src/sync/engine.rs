//! Sync coordinator: fetch, compare, merge or hold a conflict, push.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::core::Clock;
use crate::error::{QsError, Result};
use crate::storage::QuoteStore;

use super::config::MergePolicy;
use super::events::{SyncEvent, SyncObserver};
use super::merge::{merge_remote, overwrite_with};
use super::remote::RemoteEndpoint;
use super::state::{ConflictChoice, PendingConflict, SyncMetadata};

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub merge_policy: MergePolicy,
    pub auto_push: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::default(),
            auto_push: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Server data merged, `lastSyncTime` advanced.
    Merged,
    /// Local edits since the last sync; a conflict is now pending.
    Conflict,
    /// A conflict was already pending; its server snapshot was refreshed.
    ConflictPending,
    /// The coordinator was shut down while the fetch was in flight.
    Discarded,
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Merged => "merged",
            Self::Conflict => "conflict",
            Self::ConflictPending => "conflict pending",
            Self::Discarded => "discarded",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub remote: String,
    pub outcome: SyncOutcome,
    pub fetched: usize,
    pub merged: usize,
    pub total: usize,
    pub pushed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_error: Option<String>,
    pub last_sync_time: Option<DateTime<Utc>>,
    pub server_modified_at: Option<DateTime<Utc>>,
    pub duration_ms: u128,
}

impl SyncReport {
    fn new(remote: String, outcome: SyncOutcome) -> Self {
        Self {
            remote,
            outcome,
            fetched: 0,
            merged: 0,
            total: 0,
            pushed: false,
            push_error: None,
            last_sync_time: None,
            server_modified_at: None,
            duration_ms: 0,
        }
    }

    #[must_use]
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{}: {} ↓{} +{} ={}",
            self.remote, self.outcome, self.fetched, self.merged, self.total
        );
        if self.pushed {
            line.push_str(" ↑");
        } else if self.push_error.is_some() {
            line.push_str(" ↑✗");
        }
        line
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub choice: ConflictChoice,
    pub quotes: usize,
    pub last_sync_time: DateTime<Utc>,
}

/// Summary of the pending conflict for status output.
#[derive(Debug, Clone, Serialize)]
pub struct PendingSummary {
    pub server_quotes: usize,
    pub server_modified_at: DateTime<Utc>,
    pub detected_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl From<&PendingConflict> for PendingSummary {
    fn from(conflict: &PendingConflict) -> Self {
        Self {
            server_quotes: conflict.server_quotes.len(),
            server_modified_at: conflict.server_modified_at,
            detected_at: conflict.detected_at,
            refreshed_at: conflict.refreshed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
    pub quotes: usize,
    pub categories: usize,
    pub metadata: SyncMetadata,
    pub local_changes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_conflict: Option<PendingSummary>,
}

pub struct SyncCoordinator {
    store: Arc<dyn QuoteStore>,
    remote: Arc<dyn RemoteEndpoint>,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn SyncObserver>,
    options: SyncOptions,
    torn_down: AtomicBool,
}

impl SyncCoordinator {
    pub fn new(
        store: Arc<dyn QuoteStore>,
        remote: Arc<dyn RemoteEndpoint>,
        clock: Arc<dyn Clock>,
        observer: Arc<dyn SyncObserver>,
        options: SyncOptions,
    ) -> Self {
        Self {
            store,
            remote,
            clock,
            observer,
            options,
            torn_down: AtomicBool::new(false),
        }
    }

    /// Stop accepting cycle results. A fetch still in flight is discarded.
    pub fn shutdown(&self) {
        if !self.torn_down.swap(true, Ordering::SeqCst) {
            debug!("sync coordinator shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// Run one fetch/compare/merge/push cycle.
    ///
    /// Fetch and store failures abort the cycle without advancing
    /// `lastSyncTime`; they are reported to the observer and returned. A push
    /// failure is carried in the report instead.
    pub async fn run_sync_cycle(&self) -> Result<SyncReport> {
        let started = Instant::now();
        let result = self.cycle().await;
        match result {
            Ok(mut report) => {
                report.duration_ms = started.elapsed().as_millis();
                info!(
                    outcome = %report.outcome,
                    fetched = report.fetched,
                    merged = report.merged,
                    pushed = report.pushed,
                    duration_ms = report.duration_ms,
                    "sync cycle finished"
                );
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, "sync cycle failed");
                if !self.is_shut_down() {
                    self.observer.on_event(&SyncEvent::CycleFailed {
                        message: err.to_string(),
                    });
                }
                Err(err)
            }
        }
    }

    async fn cycle(&self) -> Result<SyncReport> {
        let remote_name = self.remote.describe();
        if self.is_shut_down() {
            return Ok(SyncReport::new(remote_name, SyncOutcome::Discarded));
        }

        self.observer
            .on_event(&SyncEvent::status("Syncing with server..."));
        let snapshot = self.remote.fetch_snapshot().await?;

        if self.is_shut_down() {
            debug!("discarding fetch completed after shutdown");
            return Ok(SyncReport::new(remote_name, SyncOutcome::Discarded));
        }

        // Re-read after the fetch so edits made while it was in flight count.
        let mut local = self.store.load()?;
        let now = self.clock.now();
        local.metadata.server_modified_at = Some(snapshot.last_modified);

        let mut report = SyncReport::new(remote_name, SyncOutcome::Merged);
        report.fetched = snapshot.quotes.len();
        report.server_modified_at = Some(snapshot.last_modified);

        if let Some(mut pending) = self.store.load_pending_conflict()? {
            pending.refresh(snapshot, now);
            self.store.commit(&local, Some(&pending))?;
            self.observer.on_event(&SyncEvent::ConflictRefreshed {
                server_quotes: pending.server_quotes.len(),
                server_modified_at: pending.server_modified_at,
            });
            report.outcome = SyncOutcome::ConflictPending;
            report.total = local.quotes.len();
            report.last_sync_time = local.metadata.last_sync_time;
            return Ok(report);
        }

        if local.metadata.has_conflict() {
            let conflict = PendingConflict::new(snapshot, now);
            self.store.commit(&local, Some(&conflict))?;
            info!(
                local_modified_at = ?local.metadata.local_modified_at,
                last_sync_time = ?local.metadata.last_sync_time,
                "conflict detected; waiting for resolution"
            );
            self.observer.on_event(&SyncEvent::ConflictDetected {
                server_quotes: conflict.server_quotes.len(),
                server_modified_at: conflict.server_modified_at,
                local_modified_at: local.metadata.local_modified_at,
                last_sync_time: local.metadata.last_sync_time,
            });
            report.outcome = SyncOutcome::Conflict;
            report.total = local.quotes.len();
            report.last_sync_time = local.metadata.last_sync_time;
            return Ok(report);
        }

        let merged = merge_remote(
            &mut local.quotes,
            &mut local.categories,
            &snapshot.quotes,
            self.options.merge_policy,
        );
        let last_sync = local.metadata.complete_sync(now);
        self.store.save(&local)?;
        self.observer.on_event(&SyncEvent::Merged {
            added: merged,
            total: local.quotes.len(),
            last_sync_time: last_sync,
        });

        report.merged = merged;
        report.total = local.quotes.len();
        report.last_sync_time = Some(last_sync);

        if self.options.auto_push {
            match self.remote.push_snapshot(&local.quotes).await {
                Ok(()) => report.pushed = true,
                Err(err) => {
                    warn!(error = %err, "push failed; merged data kept locally");
                    self.observer.on_event(&SyncEvent::PushFailed {
                        message: err.to_string(),
                    });
                    report.push_error = Some(err.to_string());
                }
            }
        }

        Ok(report)
    }

    pub fn pending_conflict(&self) -> Result<Option<PendingConflict>> {
        self.store.load_pending_conflict()
    }

    /// Settle the pending conflict with one side's data.
    pub fn resolve_conflict(&self, choice: ConflictChoice) -> Result<Resolution> {
        resolve_pending(&*self.store, &*self.clock, &*self.observer, choice)
    }

    pub fn status(&self) -> Result<SyncStatus> {
        SyncStatus::collect(&*self.store, Some(self.remote.describe()))
    }
}

impl SyncStatus {
    pub fn collect(store: &dyn QuoteStore, remote: Option<String>) -> Result<Self> {
        let local = store.load()?;
        let pending = store.load_pending_conflict()?;
        Ok(Self {
            remote,
            quotes: local.quotes.len(),
            categories: local.categories.len(),
            local_changes: local.metadata.has_conflict()
                || (local.metadata.last_sync_time.is_none()
                    && local.metadata.local_modified_at.is_some()),
            metadata: local.metadata,
            pending_conflict: pending.as_ref().map(PendingSummary::from),
        })
    }
}

/// Apply `choice` to the stored pending conflict.
///
/// `Server` replaces quotes and categories with the held snapshot; `Local`
/// keeps them. Either way `lastSyncTime` advances and the conflict is cleared.
pub fn resolve_pending(
    store: &dyn QuoteStore,
    clock: &dyn Clock,
    observer: &dyn SyncObserver,
    choice: ConflictChoice,
) -> Result<Resolution> {
    let pending = store
        .load_pending_conflict()?
        .ok_or(QsError::NoPendingConflict)?;

    let mut local = store.load()?;
    if choice == ConflictChoice::Server {
        overwrite_with(
            &mut local.quotes,
            &mut local.categories,
            pending.server_quotes,
        );
    }
    let last_sync = local.metadata.complete_sync(clock.now());
    store.commit(&local, None)?;

    info!(choice = %choice, quotes = local.quotes.len(), "conflict resolved");
    observer.on_event(&SyncEvent::ConflictResolved {
        choice,
        quotes: local.quotes.len(),
    });

    Ok(Resolution {
        choice,
        quotes: local.quotes.len(),
        last_sync_time: last_sync,
    })
}
