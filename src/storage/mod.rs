//! Persistent storage
//!
//! This module owns the key-value persistence surface used for the quote list and the
//! category filter selection, plus the settings file.

pub mod kv;
pub mod settings;

use std::path::PathBuf;
use thiserror::Error;

pub use kv::{FileKvStore, MemoryKvStore};

/// Key holding the JSON array of quotes
pub const QUOTES_KEY: &str = "quotes";

/// Key holding the last selected category filter (plain text)
pub const SELECTED_CATEGORY_KEY: &str = "selectedCategory";

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine a data directory")]
    NoDataDir,
}

/// String key-value surface. Each key is read and written independently;
/// there are no multi-key transactions.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Resolve the application data directory.
///
/// `QUOTESYNC_DATA_DIR` wins over the platform default.
pub fn get_data_dir() -> Result<PathBuf, StorageError> {
    if let Some(path) = std::env::var_os("QUOTESYNC_DATA_DIR") {
        return Ok(PathBuf::from(path));
    }
    directories::ProjectDirs::from("com", "quotesync", "quotesync")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or(StorageError::NoDataDir)
}
