use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::core::{Quote, QuoteBook};
use crate::storage::{QuoteStore, SqliteStore};

use super::clock::ManualClock;

/// Build a quote from literals; panics on blank input.
pub fn quote(text: &str, category: &str) -> Quote {
    Quote::new(text, category).unwrap_or_else(|err| panic!("bad fixture quote: {err}"))
}

pub fn quotes(pairs: &[(&str, &str)]) -> Vec<Quote> {
    pairs.iter().map(|(text, category)| quote(text, category)).collect()
}

/// SQLite-backed store in an isolated temp directory, with a manual clock.
pub struct StoreFixture {
    pub temp_dir: TempDir,
    pub db_path: PathBuf,
    pub store: Arc<SqliteStore>,
    pub clock: Arc<ManualClock>,
}

impl StoreFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap_or_else(|err| panic!("temp dir: {err}"));
        let db_path = temp_dir.path().join("quotes.db");
        let store = SqliteStore::open(&db_path).unwrap_or_else(|err| panic!("open store: {err}"));

        println!("[FIXTURE] Created store: {}", db_path.display());

        Self {
            temp_dir,
            db_path,
            store: Arc::new(store),
            clock: Arc::new(ManualClock::default()),
        }
    }

    pub fn store(&self) -> Arc<dyn QuoteStore> {
        self.store.clone()
    }

    pub fn book(&self) -> QuoteBook {
        QuoteBook::new(self.store(), self.clock.clone())
    }

    /// Reopen the same database file, as a fresh process would.
    pub fn reopen(&self) -> SqliteStore {
        SqliteStore::open(&self.db_path).unwrap_or_else(|err| panic!("reopen store: {err}"))
    }
}

impl Default for StoreFixture {
    fn default() -> Self {
        Self::new()
    }
}
