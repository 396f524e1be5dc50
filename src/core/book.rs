//! Local quote operations: add, import, export, clear, random display.
//!
//! Every mutation stamps `localModifiedAt` so the next sync cycle can tell
//! local edits apart from the last agreed sync point.

use std::sync::Arc;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::storage::{QuoteStore, StoreSnapshot};

use super::clock::Clock;
use super::quote::{CategoryFilter, CategorySet, Quote};
use super::transfer::{export_quotes, parse_import};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub total: usize,
    pub new_categories: Vec<String>,
}

pub struct QuoteBook {
    store: Arc<dyn QuoteStore>,
    clock: Arc<dyn Clock>,
}

impl QuoteBook {
    pub fn new(store: Arc<dyn QuoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn quotes(&self) -> Result<Vec<Quote>> {
        Ok(self.store.load()?.quotes)
    }

    pub fn categories(&self) -> Result<CategorySet> {
        Ok(self.store.load()?.categories)
    }

    /// Trim, validate, and append a quote.
    pub fn add(&self, text: &str, category: &str) -> Result<Quote> {
        let quote = Quote::new(text, category)?;
        self.mutate(|snapshot| {
            snapshot.categories.insert(quote.category.clone());
            snapshot.quotes.push(quote.clone());
        })?;
        info!(category = %quote.category, "quote added");
        Ok(quote)
    }

    /// Append every quote in an exported JSON array.
    ///
    /// Nothing is written unless the whole payload parses.
    pub fn import_json(&self, raw: &str) -> Result<ImportSummary> {
        let imported = parse_import(raw)?;
        let mut new_categories = Vec::new();
        let mut total = 0;
        self.mutate(|snapshot| {
            for quote in &imported {
                if snapshot.categories.insert(quote.category.clone()) {
                    new_categories.push(quote.category.clone());
                }
            }
            snapshot.quotes.extend(imported.iter().cloned());
            total = snapshot.quotes.len();
        })?;
        info!(added = imported.len(), total, "quotes imported");
        Ok(ImportSummary {
            added: imported.len(),
            total,
            new_categories,
        })
    }

    pub fn export_json(&self) -> Result<String> {
        export_quotes(&self.quotes()?)
    }

    /// Remove every quote and category. Returns how many quotes were dropped.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        self.mutate(|snapshot| {
            removed = snapshot.quotes.len();
            snapshot.quotes.clear();
            snapshot.categories.clear();
        })?;
        info!(removed, "quotes cleared");
        Ok(removed)
    }

    /// Uniform draw among quotes matching `filter`; `None` when nothing matches.
    pub fn random_quote<R: Rng + ?Sized>(
        &self,
        filter: &CategoryFilter,
        rng: &mut R,
    ) -> Result<Option<Quote>> {
        let quotes = self.quotes()?;
        let candidates: Vec<&Quote> = quotes.iter().filter(|q| q.matches(filter)).collect();
        debug!(filter = %filter, candidates = candidates.len(), "drawing random quote");
        Ok(candidates.choose(rng).map(|quote| (*quote).clone()))
    }

    pub fn filter(&self) -> Result<CategoryFilter> {
        self.store.load_filter()
    }

    pub fn set_filter(&self, filter: &CategoryFilter) -> Result<()> {
        self.store.save_filter(filter)
    }

    fn mutate(&self, apply: impl FnOnce(&mut StoreSnapshot)) -> Result<()> {
        let mut snapshot = self.store.load()?;
        apply(&mut snapshot);
        snapshot.metadata.mark_local_modified(self.clock.now());
        self.store.save(&snapshot)
    }
}
