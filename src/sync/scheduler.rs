//! Sync scheduler
//!
//! Runs one sync cycle immediately and then one per interval until stopped.
//! Each cycle is spawned as its own task: a slow or hung fetch does not delay the
//! next tick, and cycles may overlap. Stopping cancels the timer only; cycles
//! already in flight run to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::sync::SyncService;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub struct SyncScheduler {
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    /// Intervals below 1ms are raised to 1ms.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            handle: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Start the periodic trigger. Does nothing if already running.
    pub fn start(&mut self, service: Arc<SyncService>) {
        if self.is_active() {
            tracing::debug!("Sync scheduler already running");
            return;
        }

        let interval = self.interval;
        tracing::info!("Starting sync scheduler (every {:?})", interval);

        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // First tick completes immediately: the startup cycle.
                ticker.tick().await;
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    service.run_cycle().await;
                });
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("Sync scheduler stopped");
        }
    }
}

impl Drop for SyncScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CategoryIndex, QuoteStore};
    use crate::storage::MemoryKvStore;
    use crate::sync::merge::{MergeEngine, SharedStore};
    use crate::sync::notifier::ToastNotifier;
    use crate::sync::remote::{FetchError, RemoteSource};
    use crate::types::Quote;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// Returns one new quote per call; with `hang_first` the first call never completes
    #[derive(Default)]
    struct CountingRemote {
        calls: AtomicUsize,
        hang_first: bool,
    }

    #[async_trait]
    impl RemoteSource for CountingRemote {
        async fn fetch(&self) -> Result<Vec<Quote>, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 && self.hang_first {
                std::future::pending::<()>().await;
            }
            Ok(vec![Quote::new(format!("remote {}", call), "Remote")])
        }

        async fn post(&self, _quote: &Quote) -> Result<(), FetchError> {
            Ok(())
        }
    }

    fn service(remote: Arc<CountingRemote>) -> (Arc<SyncService>, SharedStore) {
        let kv = Arc::new(MemoryKvStore::new());
        let store = Arc::new(Mutex::new(QuoteStore::open(kv.clone(), false)));
        let index = Arc::new(Mutex::new(CategoryIndex::new(kv)));
        let notifier = Arc::new(ToastNotifier::new(Duration::from_secs(3)));
        let engine = MergeEngine::new(store.clone(), index, notifier);
        (Arc::new(SyncService::new(remote, engine)), store)
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_interval() {
        let remote = Arc::new(CountingRemote::default());
        let (service, store) = service(remote.clone());
        let mut scheduler = SyncScheduler::new(Duration::from_secs(30));

        scheduler.start(service);
        assert!(scheduler.is_active());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.lock().await.len(), 1);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.lock().await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_future_cycles() {
        let remote = Arc::new(CountingRemote::default());
        let (service, _store) = service(remote.clone());
        let mut scheduler = SyncScheduler::new(Duration::from_secs(30));

        scheduler.start(service);
        tokio::time::sleep(Duration::from_secs(1)).await;
        scheduler.stop();
        assert!(!scheduler.is_active());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_cycle_does_not_block_next_tick() {
        let remote = Arc::new(CountingRemote {
            calls: AtomicUsize::new(0),
            hang_first: true,
        });
        let (service, store) = service(remote.clone());
        let mut scheduler = SyncScheduler::new(Duration::from_secs(30));

        scheduler.start(service);
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert_eq!(remote.calls.load(Ordering::SeqCst), 2);
        let store = store.lock().await;
        assert_eq!(store.all(), &[Quote::new("remote 1", "Remote")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_is_clamped() {
        let remote = Arc::new(CountingRemote::default());
        let (service, _store) = service(remote.clone());
        let mut scheduler = SyncScheduler::new(Duration::ZERO);
        assert_eq!(scheduler.interval(), Duration::from_millis(1));

        scheduler.start(service);
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(scheduler.is_active());
        assert!(remote.calls.load(Ordering::SeqCst) >= 2);
        scheduler.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice_keeps_single_timer() {
        let remote = Arc::new(CountingRemote::default());
        let (service, _store) = service(remote.clone());
        let mut scheduler = SyncScheduler::new(Duration::from_secs(30));

        scheduler.start(service.clone());
        scheduler.start(service);
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(remote.calls.load(Ordering::SeqCst), 1);
    }
}
