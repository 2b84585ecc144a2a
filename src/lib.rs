//! quotesync library
//!
//! Quote catalog with local persistence, category filtering, JSON import/export
//! and periodic merging of a remote collection.

pub mod app;
pub mod catalog;
pub mod storage;
pub mod sync;
pub mod types;
