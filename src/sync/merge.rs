//! Merge engine
//!
//! Reconciles a batch of remote quotes with the local store. Quotes whose text is
//! unknown locally are appended; known texts with a different category take the
//! remote category. The store is reloaded from persistence first, and the whole
//! merge runs under the store lock.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::catalog::{CatalogError, CategoryIndex, QuoteStore};
use crate::sync::notifier::Notifier;
use crate::types::Quote;

pub type SharedStore = Arc<Mutex<QuoteStore>>;
pub type SharedIndex = Arc<Mutex<CategoryIndex>>;

/// What a merge changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub conflicts_resolved: usize,
}

impl MergeReport {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.conflicts_resolved > 0
    }
}

pub struct MergeEngine {
    store: SharedStore,
    index: SharedIndex,
    notifier: Arc<dyn Notifier>,
}

impl MergeEngine {
    pub fn new(store: SharedStore, index: SharedIndex, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            index,
            notifier,
        }
    }

    /// Merge `remote` into the store, refresh categories on change and notify.
    /// An empty batch is a no-op.
    ///
    /// If a later step fails after earlier ones were persisted, the persisted part is
    /// still reflected in the category index and notified before the error returns.
    pub async fn merge(&self, remote: Vec<Quote>) -> Result<MergeReport, CatalogError> {
        if remote.is_empty() {
            return Ok(MergeReport::default());
        }

        let (report, result) = {
            let mut store = self.store.lock().await;
            store.load();
            let (report, result) = match reconcile(&mut store, remote) {
                Ok(report) => (report, Ok(())),
                Err(e) => (e.applied, Err(e.source)),
            };
            if report.changed() {
                self.index.lock().await.refresh(&store);
            }
            (report, result)
        };

        if report.added > 0 {
            self.notifier
                .notify(&format!("{} new quotes added.", report.added));
        }
        if report.conflicts_resolved > 0 {
            self.notifier.notify(&format!(
                "{} conflicts resolved: server data took precedence.",
                report.conflicts_resolved
            ));
        }

        result.map(|()| report)
    }
}

/// A merge step failed to persist. `applied` is what had already been saved.
#[derive(Debug, Error)]
#[error("Merge stopped early: {source}")]
pub struct MergeError {
    pub applied: MergeReport,
    pub source: CatalogError,
}

/// Apply a remote batch to an already loaded store.
///
/// New quotes are appended in arrival order and persisted once; repeated new texts
/// within the batch keep their first occurrence. Category conflicts are then
/// resolved in favour of the remote value and persisted once if anything changed.
/// A failed save undoes that step in memory, so the store always matches what was
/// last persisted.
pub fn reconcile(store: &mut QuoteStore, remote: Vec<Quote>) -> Result<MergeReport, MergeError> {
    let local: HashSet<String> = store.all().iter().map(|q| q.text.clone()).collect();
    let mut batch_texts = HashSet::new();
    let mut fresh = Vec::new();
    let mut known = Vec::new();

    for quote in remote {
        if local.contains(&quote.text) {
            known.push(quote);
        } else if batch_texts.insert(quote.text.clone()) {
            fresh.push(quote);
        } else {
            tracing::debug!("Dropping repeated remote quote: {}", quote.text);
        }
    }

    let added = store.append_batch(fresh).map_err(|source| MergeError {
        applied: MergeReport::default(),
        source,
    })?;

    let conflicts_resolved = store.resolve_conflicts(&known).map_err(|source| MergeError {
        applied: MergeReport {
            added,
            conflicts_resolved: 0,
        },
        source,
    })?;

    let report = MergeReport {
        added,
        conflicts_resolved,
    };
    tracing::debug!(
        "Merge finished: {} added, {} conflicts resolved",
        report.added,
        report.conflicts_resolved
    );
    Ok(report)
}
