//! Notifications emitted by the sync coordinator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::state::ConflictChoice;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    Status {
        message: String,
    },
    ConflictDetected {
        server_quotes: usize,
        server_modified_at: DateTime<Utc>,
        local_modified_at: Option<DateTime<Utc>>,
        last_sync_time: Option<DateTime<Utc>>,
    },
    ConflictRefreshed {
        server_quotes: usize,
        server_modified_at: DateTime<Utc>,
    },
    ConflictResolved {
        choice: ConflictChoice,
        quotes: usize,
    },
    Merged {
        added: usize,
        total: usize,
        last_sync_time: DateTime<Utc>,
    },
    PushFailed {
        message: String,
    },
    CycleFailed {
        message: String,
    },
}

impl SyncEvent {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    /// One-line rendering for status bars and logs.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Status { message } => message.clone(),
            Self::ConflictDetected { server_quotes, .. } => format!(
                "Conflict: local changes since last sync; server has {server_quotes} quotes. Run `qs resolve local|server`."
            ),
            Self::ConflictRefreshed { server_quotes, .. } => {
                format!("Conflict still pending; server snapshot refreshed ({server_quotes} quotes)")
            }
            Self::ConflictResolved { choice, quotes } => {
                format!("Conflict resolved with {choice} data ({quotes} quotes)")
            }
            Self::Merged { added, total, .. } => {
                format!("Synced: {added} new quotes, {total} total")
            }
            Self::PushFailed { message } => format!("Push failed: {message}"),
            Self::CycleFailed { message } => format!("Sync failed: {message}"),
        }
    }
}

/// Receiver for sync notifications (the UI side of the coordinator).
pub trait SyncObserver: Send + Sync {
    fn on_event(&self, event: &SyncEvent);
}

/// Forwards events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SyncObserver for TracingObserver {
    fn on_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::PushFailed { .. } | SyncEvent::ConflictDetected { .. } => {
                warn!(event = ?event, "{}", event.message());
            }
            SyncEvent::CycleFailed { .. } => error!("{}", event.message()),
            _ => info!("{}", event.message()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SyncObserver for NullObserver {
    fn on_event(&self, _event: &SyncEvent) {}
}
