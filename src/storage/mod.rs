//! Storage layer for qs
//!
//! Quotes, categories, sync markers, the pending conflict, and the selected
//! filter live as JSON documents in a key-value backend (SQLite on disk, or
//! a map in memory).

pub mod kv;
pub mod memory;
pub mod migrations;
pub mod sqlite;

use serde::{Deserialize, Serialize};

use crate::core::{CategoryFilter, CategorySet, Quote};
use crate::error::Result;
use crate::sync::state::{PendingConflict, SyncMetadata};

pub use kv::{KeyValueBackend, KvQuoteStore};
pub use memory::{MemoryBackend, MemoryStore};
pub use sqlite::{SqliteBackend, SqliteStore};

/// Everything a sync cycle or a local mutation reads and writes together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub quotes: Vec<Quote>,
    pub categories: CategorySet,
    pub metadata: SyncMetadata,
}

/// Persistent home of the local quote state.
pub trait QuoteStore: Send + Sync {
    fn load(&self) -> Result<StoreSnapshot>;

    fn save(&self, snapshot: &StoreSnapshot) -> Result<()>;

    /// Write `snapshot` and the pending conflict (or its removal) together.
    /// Either both land or neither does.
    fn commit(&self, snapshot: &StoreSnapshot, conflict: Option<&PendingConflict>) -> Result<()>;

    fn load_pending_conflict(&self) -> Result<Option<PendingConflict>>;

    /// Persist the outstanding conflict, or clear it with `None`.
    fn save_pending_conflict(&self, conflict: Option<&PendingConflict>) -> Result<()>;

    fn load_filter(&self) -> Result<CategoryFilter>;

    fn save_filter(&self, filter: &CategoryFilter) -> Result<()>;
}
