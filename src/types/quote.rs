//! Quote types
//!
//! The quote record and the category filter selection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel filter value meaning "every category"
pub const ALL_CATEGORIES: &str = "all";

/// A single quote. `text` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub text: String,
    pub category: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }

    /// Category folded for comparison; storage keeps the original case.
    pub fn category_key(&self) -> String {
        self.category.to_lowercase()
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.category.to_lowercase() == category.to_lowercase()
    }
}

/// Built-in quotes used when nothing has been persisted yet
pub fn default_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            "The best way to predict the future is to create it.",
            "motivational",
        ),
        Quote::new(
            "Life is 10% what happens to us and 90% how we react to it.",
            "inspirational",
        ),
        Quote::new(
            "Your time is limited, so don’t waste it living someone else’s life.",
            "motivational",
        ),
        Quote::new(
            "The journey of a thousand miles begins with one step.",
            "philosophical",
        ),
    ]
}

/// Current category filter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Category(String),
}

impl CategoryFilter {
    /// Parse a persisted or user-supplied value. Blank and `all` mean no filter.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case(ALL_CATEGORIES) {
            CategoryFilter::All
        } else {
            CategoryFilter::Category(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Category(category) => category,
        }
    }

    pub fn matches(&self, quote: &Quote) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Category(category) => quote.in_category(category),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
