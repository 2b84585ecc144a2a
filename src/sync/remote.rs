//! Remote quote source
//!
//! Reads the remote collection over HTTP and adapts its records into quotes.
//! Posting a new quote is fire-and-forget: only the status code is checked.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::settings::AppSettings;
use crate::types::Quote;

/// Remote fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Remote collection of quotes
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Retrieve the remote collection, already adapted to local quotes
    async fn fetch(&self) -> Result<Vec<Quote>, FetchError>;

    /// Send a newly added quote to the remote collection
    async fn post(&self, quote: &Quote) -> Result<(), FetchError>;
}

/// Record shape served by the remote endpoint. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteQuoteRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
struct PostQuoteRequest<'a> {
    title: &'a str,
    category: &'a str,
}

/// Map remote records to quotes: `title` becomes the text, and records without a
/// category of their own get `default_category`. Blank titles are dropped.
pub fn adapt_records(records: Vec<RemoteQuoteRecord>, default_category: &str) -> Vec<Quote> {
    records
        .into_iter()
        .filter_map(|record| {
            let text = record.title?.trim().to_string();
            if text.is_empty() {
                return None;
            }
            let category = record
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| default_category.to_string());
            Some(Quote::new(text, category))
        })
        .collect()
}

/// HTTP-backed remote source
pub struct HttpRemote {
    client: reqwest::Client,
    endpoint: String,
    default_category: String,
}

impl HttpRemote {
    pub fn new(settings: &AppSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout())
            .user_agent(concat!("quotesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(
            client,
            settings.endpoint.clone(),
            settings.remote_category.clone(),
        ))
    }

    pub fn with_client(client: reqwest::Client, endpoint: String, default_category: String) -> Self {
        Self {
            client,
            endpoint,
            default_category,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn fetch(&self) -> Result<Vec<Quote>, FetchError> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!(
                "GET {} returned {}",
                self.endpoint, status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let records: Vec<RemoteQuoteRecord> =
            serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))?;

        let quotes = adapt_records(records, &self.default_category);
        tracing::debug!("Fetched {} quotes from {}", quotes.len(), self.endpoint);
        Ok(quotes)
    }

    async fn post(&self, quote: &Quote) -> Result<(), FetchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&PostQuoteRequest {
                title: &quote.text,
                category: &quote.category,
            })
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Network(format!(
                "POST {} returned {}",
                self.endpoint, status
            )));
        }
        Ok(())
    }
}
