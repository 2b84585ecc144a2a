//! Application state
//!
//! Wires the store, category index, remote source, notifier and scheduler together
//! and exposes the calls a front end needs.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::catalog::{transfer, CatalogError, CategoryIndex, ImportReport, QuoteStore};
use crate::storage::settings::{load_settings_from, AppSettings};
use crate::storage::{FileKvStore, KeyValueStore};
use crate::sync::{
    FetchError, HttpRemote, MergeEngine, MergeReport, Notifier, RemoteSource, SharedIndex,
    SharedStore, SyncScheduler, SyncService, ToastNotifier,
};
use crate::types::{CategoryFilter, Quote};

pub struct QuoteApp {
    settings: AppSettings,
    store: SharedStore,
    index: SharedIndex,
    remote: Arc<dyn RemoteSource>,
    notifier: Arc<ToastNotifier>,
    sync: Arc<SyncService>,
    scheduler: SyncScheduler,
}

impl QuoteApp {
    pub fn new(
        settings: AppSettings,
        kv: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteSource>,
    ) -> Self {
        let store = QuoteStore::open(kv.clone(), settings.seed_defaults);
        let mut index = CategoryIndex::new(kv);
        index.refresh(&store);
        let selection = index.restore_selection();

        let store = Arc::new(Mutex::new(store));
        let index = Arc::new(Mutex::new(index));
        let notifier = Arc::new(ToastNotifier::new(settings.notification_duration()));
        let engine = MergeEngine::new(store.clone(), index.clone(), notifier.clone());
        let sync = Arc::new(SyncService::new(remote.clone(), engine));
        let scheduler = SyncScheduler::new(settings.sync_interval());

        tracing::info!("Quote app initialized (filter: {})", selection);

        Self {
            settings,
            store,
            index,
            remote,
            notifier,
            sync,
            scheduler,
        }
    }

    /// Open the app on a data directory: settings, file-backed storage and HTTP remote
    pub fn open(data_dir: &Path) -> Result<Self, FetchError> {
        let settings = load_settings_from(data_dir);
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(data_dir));
        let remote: Arc<dyn RemoteSource> = Arc::new(HttpRemote::new(&settings)?);
        Ok(Self::new(settings, kv, remote))
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn notifier(&self) -> &ToastNotifier {
        &self.notifier
    }

    pub async fn all(&self) -> Vec<Quote> {
        self.store.lock().await.all().to_vec()
    }

    pub async fn categories(&self) -> Vec<String> {
        CategoryIndex::categories(&*self.store.lock().await)
    }

    /// Filter options as last refreshed, starting with `all`
    pub async fn filter_options(&self) -> Vec<String> {
        self.index.lock().await.options().to_vec()
    }

    pub async fn selection(&self) -> CategoryFilter {
        self.index.lock().await.selection().clone()
    }

    pub async fn set_filter(&self, value: &str) -> Result<CategoryFilter, CatalogError> {
        self.index.lock().await.remember_selection(value)
    }

    /// Quotes matching the current filter
    pub async fn filtered(&self) -> Vec<Quote> {
        let selection = self.selection().await;
        self.filtered_by(&selection).await
    }

    /// Quotes matching `filter`, leaving the remembered selection alone
    pub async fn filtered_by(&self, filter: &CategoryFilter) -> Vec<Quote> {
        let store = self.store.lock().await;
        store.filtered(filter).into_iter().cloned().collect()
    }

    /// Random quote matching the current filter
    pub async fn random_quote(&self) -> Option<Quote> {
        let selection = self.selection().await;
        self.random_in(&selection).await
    }

    pub async fn random_in(&self, filter: &CategoryFilter) -> Option<Quote> {
        self.store.lock().await.random(filter).cloned()
    }

    /// Add a user quote, refresh categories and, if enabled, post it to the remote.
    ///
    /// The returned handle belongs to the fire-and-forget post; callers may ignore it.
    pub async fn add_quote(&self, quote: Quote) -> Result<Option<JoinHandle<()>>, CatalogError> {
        let added = {
            let mut store = self.store.lock().await;
            store.add(quote)?;
            self.index.lock().await.refresh(&store);
            store.all().last().cloned()
        };

        let Some(added) = added else {
            return Ok(None);
        };
        tracing::info!("Added quote in category '{}'", added.category);

        if !self.settings.post_new_quotes {
            return Ok(None);
        }

        let remote = self.remote.clone();
        Ok(Some(tokio::spawn(async move {
            match remote.post(&added).await {
                Ok(()) => tracing::debug!("Posted quote to remote"),
                Err(e) => tracing::warn!("Posting quote to remote failed: {}", e),
            }
        })))
    }

    pub async fn merge(&self, remote: Vec<Quote>) -> Result<MergeReport, CatalogError> {
        self.sync.engine().merge(remote).await
    }

    /// Run one sync cycle now
    pub async fn sync_now(&self) -> MergeReport {
        self.sync.run_cycle().await
    }

    pub fn start_sync(&mut self) {
        self.scheduler.start(self.sync.clone());
    }

    pub fn stop_sync(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_syncing(&self) -> bool {
        self.scheduler.is_active()
    }

    pub async fn export_json(&self) -> Result<String, CatalogError> {
        transfer::export_json(&*self.store.lock().await)
    }

    pub async fn export_to_file(&self, path: &Path) -> Result<(), CatalogError> {
        transfer::export_to_file(&*self.store.lock().await, path)
    }

    pub async fn import_json(&self, json: &str) -> Result<ImportReport, CatalogError> {
        let mut store = self.store.lock().await;
        let result = transfer::import_json(&mut store, json);
        self.finish_import(&store, result).await
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportReport, CatalogError> {
        let mut store = self.store.lock().await;
        let result = transfer::import_file(&mut store, path);
        self.finish_import(&store, result).await
    }

    async fn finish_import(
        &self,
        store: &QuoteStore,
        result: Result<ImportReport, CatalogError>,
    ) -> Result<ImportReport, CatalogError> {
        match &result {
            Ok(report) => {
                self.index.lock().await.refresh(store);
                self.notifier
                    .notify(&format!("{} quotes imported successfully.", report.added));
            }
            Err(e) => self.notifier.notify(&format!("Import failed: {}", e)),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKvStore;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct FakeRemote {
        quotes: Vec<Quote>,
        posted: StdMutex<Vec<Quote>>,
    }

    #[async_trait]
    impl RemoteSource for FakeRemote {
        async fn fetch(&self) -> Result<Vec<Quote>, FetchError> {
            Ok(self.quotes.clone())
        }

        async fn post(&self, quote: &Quote) -> Result<(), FetchError> {
            if let Ok(mut posted) = self.posted.lock() {
                posted.push(quote.clone());
            }
            Ok(())
        }
    }

    fn app_with(remote: Arc<FakeRemote>) -> (Arc<MemoryKvStore>, QuoteApp) {
        let kv = Arc::new(MemoryKvStore::new());
        let settings = AppSettings {
            seed_defaults: false,
            ..AppSettings::default()
        };
        let app = QuoteApp::new(settings, kv.clone(), remote);
        (kv, app)
    }

    #[tokio::test]
    async fn test_add_refreshes_options_and_posts() {
        let remote = Arc::new(FakeRemote::default());
        let (_, app) = app_with(remote.clone());

        assert!(!app.categories().await.contains(&"motivation".to_string()));

        let post = app
            .add_quote(Quote::new("Keep going.", "Motivation"))
            .await
            .unwrap();
        post.unwrap().await.unwrap();

        assert!(app.categories().await.contains(&"motivation".to_string()));
        assert_eq!(app.filter_options().await, vec!["all", "motivation"]);
        assert_eq!(
            remote.posted.lock().unwrap().as_slice(),
            &[Quote::new("Keep going.", "Motivation")]
        );
    }

    #[tokio::test]
    async fn test_add_rejects_blank_without_posting() {
        let remote = Arc::new(FakeRemote::default());
        let (_, app) = app_with(remote.clone());

        let result = app.add_quote(Quote::new("", "x")).await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
        assert!(app.all().await.is_empty());
        assert!(remote.posted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_survives_restart() {
        let remote = Arc::new(FakeRemote::default());
        let (kv, app) = app_with(remote.clone());
        app.add_quote(Quote::new("A", "Inspiration")).await.unwrap();
        app.add_quote(Quote::new("B", "Work")).await.unwrap();
        app.set_filter("inspiration").await.unwrap();

        let restarted = QuoteApp::new(AppSettings::default(), kv, remote);

        assert_eq!(restarted.selection().await.as_str(), "inspiration");
        assert_eq!(restarted.filtered().await, vec![Quote::new("A", "Inspiration")]);
        assert_eq!(
            restarted.random_quote().await,
            Some(Quote::new("A", "Inspiration"))
        );
    }

    #[tokio::test]
    async fn test_one_off_filter_keeps_remembered_selection() {
        let remote = Arc::new(FakeRemote::default());
        let (kv, app) = app_with(remote);
        app.add_quote(Quote::new("A", "Inspiration")).await.unwrap();
        app.add_quote(Quote::new("B", "Work")).await.unwrap();
        app.set_filter("work").await.unwrap();

        let filter = CategoryFilter::parse("inspiration");
        assert_eq!(
            app.filtered_by(&filter).await,
            vec![Quote::new("A", "Inspiration")]
        );
        assert_eq!(
            app.random_in(&filter).await,
            Some(Quote::new("A", "Inspiration"))
        );

        assert_eq!(app.selection().await.as_str(), "work");
        assert_eq!(
            kv.get(crate::storage::SELECTED_CATEGORY_KEY).unwrap().as_deref(),
            Some("work")
        );
    }

    #[tokio::test]
    async fn test_sync_now_merges_remote() {
        let remote = Arc::new(FakeRemote {
            quotes: vec![Quote::new("B", "y")],
            ..FakeRemote::default()
        });
        let (_, app) = app_with(remote);
        app.add_quote(Quote::new("A", "x")).await.unwrap();

        let report = app.sync_now().await;

        assert_eq!(report.added, 1);
        assert_eq!(app.all().await, vec![Quote::new("A", "x"), Quote::new("B", "y")]);
        assert!(app.notifier().visible().contains(&"1 new quotes added.".to_string()));
    }

    #[tokio::test]
    async fn test_import_non_array_reports_error() {
        let (_, app) = app_with(Arc::new(FakeRemote::default()));
        app.add_quote(Quote::new("A", "x")).await.unwrap();

        let result = app.import_json(r#"{"text":"x"}"#).await;

        assert!(matches!(result, Err(CatalogError::Parse(_))));
        assert_eq!(app.all().await, vec![Quote::new("A", "x")]);
        assert!(app.notifier().history()[0].message.starts_with("Import failed"));
    }

    #[tokio::test]
    async fn test_import_refreshes_categories() {
        let (_, app) = app_with(Arc::new(FakeRemote::default()));

        let report = app
            .import_json(r#"[{"text":"A","category":"Humor"}]"#)
            .await
            .unwrap();

        assert_eq!(report.added, 1);
        assert_eq!(app.filter_options().await, vec!["all", "humor"]);
    }

    #[tokio::test]
    async fn test_export_json_is_pretty_array() {
        let (_, app) = app_with(Arc::new(FakeRemote::default()));
        app.add_quote(Quote::new("A", "x")).await.unwrap();

        let json = app.export_json().await.unwrap();
        let parsed: Vec<Quote> = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, vec![Quote::new("A", "x")]);
        assert!(json.contains('\n'));
    }
}
