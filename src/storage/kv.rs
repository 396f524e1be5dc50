//! [`QuoteStore`] over any string key-value backend.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::{CategoryFilter, CategorySet, Quote, default_quotes};
use crate::error::Result;
use crate::sync::state::{PendingConflict, SyncMetadata};

use super::{QuoteStore, StoreSnapshot};

pub const KEY_QUOTES: &str = "quotes";
pub const KEY_CATEGORIES: &str = "categories";
pub const KEY_SYNC_METADATA: &str = "syncMetadata";
pub const KEY_PENDING_CONFLICT: &str = "pendingConflict";
pub const KEY_SELECTED_FILTER: &str = "selectedFilter";

/// Raw string storage. `None` in [`set_many`](Self::set_many) removes a key.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Apply every write or none of them.
    fn set_many(&self, entries: &[(&str, Option<String>)]) -> Result<()>;

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.set_many(&[(key, Some(value))])
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.set_many(&[(key, None)])
    }
}

pub struct KvQuoteStore<B> {
    backend: B,
}

impl<B: KeyValueBackend> KvQuoteStore<B> {
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Seed the default quotes into a store that has never held any.
    ///
    /// A store that was cleared keeps its empty list.
    pub fn with_seed_defaults(self) -> Result<Self> {
        if self.backend.get(KEY_QUOTES)?.is_none() {
            let quotes = default_quotes();
            debug!(count = quotes.len(), "seeding default quotes");
            let categories = CategorySet::from_quotes(&quotes);
            self.backend.set_many(&[
                (KEY_QUOTES, Some(serde_json::to_string(&quotes)?)),
                (KEY_CATEGORIES, Some(serde_json::to_string(&categories)?)),
            ])?;
        }
        Ok(self)
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.backend.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Option<String>> {
    Ok(Some(serde_json::to_string(value)?))
}

impl<B: KeyValueBackend> QuoteStore for KvQuoteStore<B> {
    fn load(&self) -> Result<StoreSnapshot> {
        let quotes: Vec<Quote> = self.get_json(KEY_QUOTES)?.unwrap_or_default();
        let categories = match self.get_json::<CategorySet>(KEY_CATEGORIES)? {
            Some(mut stored) => {
                stored.extend_from(&quotes);
                stored
            }
            None => CategorySet::from_quotes(&quotes),
        };
        let metadata: SyncMetadata = self.get_json(KEY_SYNC_METADATA)?.unwrap_or_default();

        Ok(StoreSnapshot {
            quotes,
            categories,
            metadata,
        })
    }

    fn save(&self, snapshot: &StoreSnapshot) -> Result<()> {
        self.backend.set_many(&[
            (KEY_QUOTES, to_json(&snapshot.quotes)?),
            (KEY_CATEGORIES, to_json(&snapshot.categories)?),
            (KEY_SYNC_METADATA, to_json(&snapshot.metadata)?),
        ])
    }

    fn commit(&self, snapshot: &StoreSnapshot, conflict: Option<&PendingConflict>) -> Result<()> {
        let pending = match conflict {
            Some(conflict) => to_json(conflict)?,
            None => None,
        };
        self.backend.set_many(&[
            (KEY_QUOTES, to_json(&snapshot.quotes)?),
            (KEY_CATEGORIES, to_json(&snapshot.categories)?),
            (KEY_SYNC_METADATA, to_json(&snapshot.metadata)?),
            (KEY_PENDING_CONFLICT, pending),
        ])
    }

    fn load_pending_conflict(&self) -> Result<Option<PendingConflict>> {
        self.get_json(KEY_PENDING_CONFLICT)
    }

    fn save_pending_conflict(&self, conflict: Option<&PendingConflict>) -> Result<()> {
        match conflict {
            Some(conflict) => self
                .backend
                .set(KEY_PENDING_CONFLICT, serde_json::to_string(conflict)?),
            None => self.backend.remove(KEY_PENDING_CONFLICT),
        }
    }

    fn load_filter(&self) -> Result<CategoryFilter> {
        Ok(self
            .backend
            .get(KEY_SELECTED_FILTER)?
            .map(CategoryFilter::from)
            .unwrap_or_default())
    }

    fn save_filter(&self, filter: &CategoryFilter) -> Result<()> {
        self.backend.set(KEY_SELECTED_FILTER, filter.to_string())
    }
}
