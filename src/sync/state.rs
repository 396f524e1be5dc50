use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::core::Quote;

use super::remote::RemoteSnapshot;

/// Sync markers persisted next to the quote list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncMetadata {
    #[serde(default)]
    pub last_sync_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub local_modified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub server_modified_at: Option<DateTime<Utc>>,
}

impl SyncMetadata {
    /// Local data changed after the last agreed sync point.
    ///
    /// Both markers must be present; a store that has never synced, or never
    /// been edited, is never in conflict.
    #[must_use]
    pub fn has_conflict(&self) -> bool {
        match (self.last_sync_time, self.local_modified_at) {
            (Some(last_sync), Some(local)) => local > last_sync,
            _ => false,
        }
    }

    pub fn mark_local_modified(&mut self, at: DateTime<Utc>) {
        self.local_modified_at = Some(at);
    }

    /// Record a completed sync at `now`, returning the stored value.
    ///
    /// The stored value is strictly greater than the previous one; a clock
    /// that has not moved forward is nudged by one millisecond.
    pub fn complete_sync(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let at = match self.last_sync_time {
            Some(previous) if now <= previous => previous + Duration::milliseconds(1),
            _ => now,
        };
        self.last_sync_time = Some(at);
        at
    }
}

/// Server data that could not be merged automatically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingConflict {
    pub server_quotes: Vec<Quote>,
    pub server_modified_at: DateTime<Utc>,
    pub detected_at: DateTime<Utc>,
    #[serde(default)]
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl PendingConflict {
    #[must_use]
    pub fn new(snapshot: RemoteSnapshot, detected_at: DateTime<Utc>) -> Self {
        Self {
            server_quotes: snapshot.quotes,
            server_modified_at: snapshot.last_modified,
            detected_at,
            refreshed_at: None,
        }
    }

    /// Replace the held server data with a newer fetch, keeping the conflict open.
    pub fn refresh(&mut self, snapshot: RemoteSnapshot, at: DateTime<Utc>) {
        self.server_quotes = snapshot.quotes;
        self.server_modified_at = snapshot.last_modified;
        self.refreshed_at = Some(at);
    }
}

/// Which side wins an explicit conflict resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictChoice {
    /// Keep the local quotes, discard the server snapshot
    Local,
    /// Overwrite local quotes with the server snapshot
    Server,
}

impl fmt::Display for ConflictChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Server => f.write_str("server"),
        }
    }
}
