//! Settings storage
//!
//! Manages persistence of sync and notification settings.

use crate::storage::{get_data_dir, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";
pub const DEFAULT_REMOTE_CATEGORY: &str = "Remote";

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Remote collection endpoint (GET lists records, POST accepts a new quote)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Category assigned to remote records that carry none
    #[serde(default = "default_remote_category")]
    pub remote_category: String,
    /// Seconds between sync cycles
    #[serde(default = "default_sync_interval")]
    pub sync_interval_secs: u64,
    /// Seconds a notification stays visible
    #[serde(default = "default_notification_secs")]
    pub notification_secs: u64,
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Start with the built-in quotes when nothing has been persisted yet
    #[serde(default = "default_true")]
    pub seed_defaults: bool,
    /// POST user-added quotes to the endpoint
    #[serde(default = "default_true")]
    pub post_new_quotes: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_remote_category() -> String {
    DEFAULT_REMOTE_CATEGORY.to_string()
}

fn default_sync_interval() -> u64 {
    30
}

fn default_notification_secs() -> u64 {
    3
}

fn default_request_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            remote_category: default_remote_category(),
            sync_interval_secs: default_sync_interval(),
            notification_secs: default_notification_secs(),
            request_timeout_secs: default_request_timeout(),
            seed_defaults: true,
            post_new_quotes: true,
        }
    }
}

impl AppSettings {
    /// Validate settings values
    ///
    /// Durations are at least one second; blank strings fall back to defaults.
    pub fn validate(&mut self) {
        self.sync_interval_secs = self.sync_interval_secs.max(1);
        self.notification_secs = self.notification_secs.max(1);
        self.request_timeout_secs = self.request_timeout_secs.max(1);

        if self.endpoint.trim().is_empty() {
            self.endpoint = default_endpoint();
        }

        if self.remote_category.trim().is_empty() {
            self.remote_category = default_remote_category();
        }
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn settings_path_in(dir: &Path) -> PathBuf {
    dir.join("settings.json")
}

/// Load settings from the default data directory
///
/// Returns default settings if the file doesn't exist or is corrupted
pub fn load_settings() -> AppSettings {
    match get_data_dir() {
        Ok(dir) => load_settings_from(&dir),
        Err(e) => {
            tracing::warn!("Failed to resolve data directory, using default settings: {}", e);
            AppSettings::default()
        }
    }
}

/// Load settings from `dir/settings.json`, falling back to defaults
pub fn load_settings_from(dir: &Path) -> AppSettings {
    match load_settings_internal(dir) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Failed to load settings, using defaults: {}", e);
            AppSettings::default()
        }
    }
}

fn load_settings_internal(dir: &Path) -> Result<AppSettings, StorageError> {
    let path = settings_path_in(dir);

    if !path.exists() {
        tracing::info!("Settings file not found, using defaults");
        return Ok(AppSettings::default());
    }

    let json = fs::read_to_string(&path)?;
    let mut settings: AppSettings = serde_json::from_str(&json)?;
    settings.validate();

    tracing::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Save settings to `dir/settings.json`
pub fn save_settings_to(dir: &Path, settings: &AppSettings) -> Result<(), StorageError> {
    fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(settings)?;
    fs::write(settings_path_in(dir), json)?;

    tracing::debug!("Saved settings to disk");
    Ok(())
}
