//! Shared type definitions
//!
//! This module contains the data types shared across the catalog and sync layers.

pub mod quote;

pub use quote::{default_quotes, CategoryFilter, Quote, ALL_CATEGORIES};
