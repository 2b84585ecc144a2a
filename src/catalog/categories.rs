//! Category index
//!
//! Derives the distinct categories from the quote store and owns the persisted
//! filter selection. Category lists are recomputed from the store on demand.

use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::{CatalogError, QuoteStore};
use crate::storage::{KeyValueStore, SELECTED_CATEGORY_KEY};
use crate::types::{CategoryFilter, ALL_CATEGORIES};

pub struct CategoryIndex {
    kv: Arc<dyn KeyValueStore>,
    /// Filter options as last rendered: the `all` sentinel followed by categories
    options: Vec<String>,
    selection: CategoryFilter,
}

impl CategoryIndex {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            options: vec![ALL_CATEGORIES.to_string()],
            selection: CategoryFilter::All,
        }
    }

    /// Distinct categories in first-seen order, case-folded
    pub fn categories(store: &QuoteStore) -> Vec<String> {
        let mut seen = HashSet::new();
        store
            .all()
            .iter()
            .map(|q| q.category_key())
            .filter(|key| seen.insert(key.clone()))
            .collect()
    }

    /// Recompute the filter options from the store
    pub fn refresh(&mut self, store: &QuoteStore) -> &[String] {
        self.options = std::iter::once(ALL_CATEGORIES.to_string())
            .chain(Self::categories(store))
            .collect();
        tracing::debug!("Category index refreshed: {} options", self.options.len());
        &self.options
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn selection(&self) -> &CategoryFilter {
        &self.selection
    }

    /// Read the last persisted selection. Missing or unreadable values mean `all`.
    pub fn restore_selection(&mut self) -> CategoryFilter {
        self.selection = match self.kv.get(SELECTED_CATEGORY_KEY) {
            Ok(Some(value)) => CategoryFilter::parse(&value),
            Ok(None) => CategoryFilter::All,
            Err(e) => {
                tracing::warn!("Failed to read category selection: {}", e);
                CategoryFilter::All
            }
        };
        self.selection.clone()
    }

    /// Persist a new selection and make it current
    pub fn remember_selection(&mut self, value: &str) -> Result<CategoryFilter, CatalogError> {
        let selection = CategoryFilter::parse(value);
        self.kv.set(SELECTED_CATEGORY_KEY, selection.as_str())?;
        self.selection = selection.clone();
        Ok(selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;
    use crate::types::Quote;

    #[test]
    fn test_categories_fold_case_and_dedup() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut store = QuoteStore::open(kv, false);
        store.add(Quote::new("A", "Life")).unwrap();
        store.add(Quote::new("B", "life")).unwrap();
        store.add(Quote::new("C", "Work")).unwrap();

        assert_eq!(CategoryIndex::categories(&store), vec!["life", "work"]);
    }

    #[test]
    fn test_added_category_appears() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut store = QuoteStore::open(kv.clone(), true);
        let mut index = CategoryIndex::new(kv);

        assert!(!CategoryIndex::categories(&store).contains(&"motivation".to_string()));
        store.add(Quote::new("Keep going.", "Motivation")).unwrap();
        assert!(CategoryIndex::categories(&store).contains(&"motivation".to_string()));

        let options = index.refresh(&store);
        assert_eq!(options[0], ALL_CATEGORIES);
        assert!(options.contains(&"motivation".to_string()));
    }

    #[test]
    fn test_selection_round_trip() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut index = CategoryIndex::new(kv.clone());
        index.remember_selection("inspiration").unwrap();

        let mut restored = CategoryIndex::new(kv);
        assert_eq!(restored.restore_selection().as_str(), "inspiration");
        assert_eq!(restored.selection().as_str(), "inspiration");
    }

    #[test]
    fn test_missing_selection_defaults_to_all() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let mut index = CategoryIndex::new(kv);
        assert_eq!(index.restore_selection(), CategoryFilter::All);
    }
}
