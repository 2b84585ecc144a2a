//! Quote store
//!
//! Owns the in-memory quote list and keeps it in sync with the key-value surface.
//! Every successful mutation is persisted before returning.

use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::catalog::CatalogError;
use crate::storage::{KeyValueStore, StorageError, QUOTES_KEY};
use crate::types::{default_quotes, CategoryFilter, Quote};

pub struct QuoteStore {
    kv: Arc<dyn KeyValueStore>,
    quotes: Vec<Quote>,
    seed_defaults: bool,
}

impl QuoteStore {
    /// Create an empty store. Call [`QuoteStore::load`] to read persisted quotes.
    pub fn new(kv: Arc<dyn KeyValueStore>, seed_defaults: bool) -> Self {
        Self {
            kv,
            quotes: Vec::new(),
            seed_defaults,
        }
    }

    /// Create a store and load it immediately
    pub fn open(kv: Arc<dyn KeyValueStore>, seed_defaults: bool) -> Self {
        let mut store = Self::new(kv, seed_defaults);
        store.load();
        store
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// Never fails: an absent key yields the seed set (or nothing), and unreadable
    /// or corrupt data yields an empty store.
    pub fn load(&mut self) {
        self.quotes = match self.read_persisted() {
            Ok(Some(quotes)) => quotes,
            Ok(None) if self.seed_defaults => {
                tracing::info!("No persisted quotes, starting from the default set");
                default_quotes()
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to load persisted quotes, starting empty: {}", e);
                Vec::new()
            }
        };
    }

    fn read_persisted(&self) -> Result<Option<Vec<Quote>>, StorageError> {
        let Some(json) = self.kv.get(QUOTES_KEY)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    /// Serialize the current list to the persistence surface
    pub fn save(&self) -> Result<(), CatalogError> {
        let json = serde_json::to_string(&self.quotes).map_err(StorageError::from)?;
        self.kv.set(QUOTES_KEY, &json)?;
        tracing::debug!("Persisted {} quotes", self.quotes.len());
        Ok(())
    }

    /// Append a quote after trimming and validating both fields.
    ///
    /// Uniqueness is not checked here; merge handles that.
    pub fn add(&mut self, quote: Quote) -> Result<(), CatalogError> {
        let quote = validate(quote)?;
        self.quotes.push(quote);
        if let Err(e) = self.save() {
            self.quotes.pop();
            return Err(e);
        }
        Ok(())
    }

    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.quotes.iter().any(|q| q.text == text)
    }

    pub fn filtered(&self, filter: &CategoryFilter) -> Vec<&Quote> {
        self.quotes.iter().filter(|q| filter.matches(q)).collect()
    }

    /// Uniformly random quote among those matching `filter`
    pub fn random(&self, filter: &CategoryFilter) -> Option<&Quote> {
        let candidates = self.filtered(filter);
        candidates.choose(&mut rand::thread_rng()).copied()
    }

    /// Append a batch and persist once. An empty batch writes nothing.
    pub(crate) fn append_batch(&mut self, batch: Vec<Quote>) -> Result<usize, CatalogError> {
        if batch.is_empty() {
            return Ok(0);
        }
        let count = batch.len();
        let previous_len = self.quotes.len();
        self.quotes.extend(batch);
        if let Err(e) = self.save() {
            self.quotes.truncate(previous_len);
            return Err(e);
        }
        Ok(count)
    }

    /// Give every local quote sharing a text with `remote` the remote category when
    /// it differs (case-insensitively), then persist once. Returns the number of
    /// remote quotes that changed something. On a failed save the old categories are
    /// restored.
    pub(crate) fn resolve_conflicts(&mut self, remote: &[Quote]) -> Result<usize, CatalogError> {
        let mut overwritten: Vec<(usize, String)> = Vec::new();
        let mut resolved = 0;
        for quote in remote {
            let before = overwritten.len();
            for (position, local) in self.quotes.iter_mut().enumerate() {
                if local.text == quote.text && !local.in_category(&quote.category) {
                    let old = std::mem::replace(&mut local.category, quote.category.clone());
                    overwritten.push((position, old));
                }
            }
            if overwritten.len() > before {
                resolved += 1;
            }
        }

        if resolved == 0 {
            return Ok(0);
        }
        if let Err(e) = self.save() {
            for (position, old) in overwritten.into_iter().rev() {
                self.quotes[position].category = old;
            }
            return Err(e);
        }
        Ok(resolved)
    }
}

/// Trim both fields and reject blanks
pub fn validate(quote: Quote) -> Result<Quote, CatalogError> {
    let text = quote.text.trim();
    let category = quote.category.trim();
    if text.is_empty() || category.is_empty() {
        return Err(CatalogError::Validation(
            "Please fill in both the quote and its category.".to_string(),
        ));
    }
    Ok(Quote::new(text, category))
}
