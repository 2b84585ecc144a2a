//! JSON import and export
//!
//! Export writes the whole quote list as pretty JSON. Import parses and checks the
//! full payload before the store is touched, so a bad file never causes a partial write.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::catalog::store::validate;
use crate::catalog::{CatalogError, QuoteStore};
use crate::storage::StorageError;
use crate::types::Quote;

/// Outcome of an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub added: usize,
    /// Elements dropped for blank text or category
    pub skipped: usize,
}

pub fn export_json(store: &QuoteStore) -> Result<String, CatalogError> {
    serde_json::to_string_pretty(store.all()).map_err(|e| StorageError::from(e).into())
}

pub fn export_to_file(store: &QuoteStore, path: &Path) -> Result<(), CatalogError> {
    let json = export_json(store)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(StorageError::from)?;
        }
    }
    fs::write(path, json).map_err(StorageError::from)?;
    tracing::info!("Exported {} quotes to {}", store.len(), path.display());
    Ok(())
}

/// Parse an import payload. It must be a JSON array of `{text, category}` objects.
pub fn parse_import(json: &str) -> Result<Vec<Quote>, CatalogError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| CatalogError::Parse(format!("Invalid JSON: {}", e)))?;

    let Value::Array(items) = value else {
        return Err(CatalogError::Parse(
            "Imported file must contain a JSON array of quotes".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<Quote>(item)
                .map_err(|e| CatalogError::Parse(format!("Quote #{}: {}", i + 1, e)))
        })
        .collect()
}

/// Import quotes from a JSON string into the store, persisting once
pub fn import_json(store: &mut QuoteStore, json: &str) -> Result<ImportReport, CatalogError> {
    let quotes = parse_import(json)?;

    let mut valid = Vec::with_capacity(quotes.len());
    let mut skipped = 0;
    for quote in quotes {
        match validate(quote) {
            Ok(quote) => valid.push(quote),
            Err(_) => skipped += 1,
        }
    }

    let added = store.append_batch(valid)?;
    tracing::info!("Imported {} quotes ({} skipped)", added, skipped);
    Ok(ImportReport { added, skipped })
}

pub fn import_file(store: &mut QuoteStore, path: &Path) -> Result<ImportReport, CatalogError> {
    let json = fs::read_to_string(path).map_err(StorageError::from)?;
    import_json(store, &json)
}
