//! Quote catalog
//!
//! The quote store, the category index derived from it, and JSON import/export.

pub mod categories;
pub mod store;
pub mod transfer;

use thiserror::Error;

use crate::storage::StorageError;

pub use categories::CategoryIndex;
pub use store::QuoteStore;
pub use transfer::ImportReport;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
