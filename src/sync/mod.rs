//! Remote synchronization
//!
//! A sync cycle fetches the remote collection and merges it into the local store.
//! Fetch failures count as "no remote quotes this cycle" so the next tick retries.

pub mod merge;
pub mod notifier;
pub mod remote;
pub mod scheduler;

use std::sync::Arc;

pub use merge::{MergeEngine, MergeError, MergeReport, SharedIndex, SharedStore};
pub use notifier::{Notification, Notifier, ToastNotifier};
pub use remote::{FetchError, HttpRemote, RemoteSource};
pub use scheduler::SyncScheduler;

/// One fetch-then-merge pipeline
pub struct SyncService {
    remote: Arc<dyn RemoteSource>,
    engine: MergeEngine,
}

impl SyncService {
    pub fn new(remote: Arc<dyn RemoteSource>, engine: MergeEngine) -> Self {
        Self { remote, engine }
    }

    pub fn engine(&self) -> &MergeEngine {
        &self.engine
    }

    /// Run one sync cycle. Never fails: errors are logged and reported as no change.
    pub async fn run_cycle(&self) -> MergeReport {
        let remote = match self.remote.fetch().await {
            Ok(quotes) => quotes,
            Err(e) => {
                tracing::warn!("Fetching remote quotes failed, skipping this cycle: {}", e);
                Vec::new()
            }
        };

        match self.engine.merge(remote).await {
            Ok(report) => report,
            Err(e) => {
                tracing::error!("Merging remote quotes failed: {}", e);
                MergeReport::default()
            }
        }
    }
}
