//! Preference manager that merges config.toml defaults with stored overrides.
//!
//! Config values serve as defaults; values saved in the local store override
//! them. Writes always go to the store, never to the config file.
use std::collections::HashMap;
use std::time::Duration;

use crate::config::Config;
use crate::router::RouteMode;
use crate::storage::{keys, LocalStore, StoreError};
use crate::theme::ThemeVariant;

/// Prefix of store keys holding preference overrides other than the theme.
const PREF_PREFIX: &str = "foxweb_pref.";

// ============================================================================
// PreferenceManager
// ============================================================================

/// Merged preference view: config.toml defaults + store overrides.
pub struct PreferenceManager {
    prefs: HashMap<String, String>,
}

impl PreferenceManager {
    /// Load preferences by merging config defaults with store overrides.
    pub async fn load(config: &Config, store: &LocalStore) -> Result<Self, StoreError> {
        let mut prefs = Self::flatten_config(config);

        if let Some(theme) = store.get_item(keys::THEME).await? {
            prefs.insert("theme".to_string(), theme);
        }
        for key in store.keys().await? {
            if let Some(name) = key.strip_prefix(PREF_PREFIX) {
                if let Some(value) = store.get_item(&key).await? {
                    prefs.insert(name.to_string(), value);
                }
            }
        }

        Ok(Self { prefs })
    }

    /// Create from config only. Fallback for when the store cannot be read.
    pub fn from_config(config: &Config) -> Self {
        Self {
            prefs: Self::flatten_config(config),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prefs.get(key).map(String::as_str)
    }

    /// Set a preference: writes to the store and updates the in-memory map.
    pub async fn set(&mut self, store: &LocalStore, key: &str, value: &str) -> Result<(), StoreError> {
        store.set_item(&Self::store_key(key), value).await?;
        self.prefs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    // ========================================================================
    // Type-safe Accessors
    // ========================================================================

    pub fn theme_variant(&self) -> ThemeVariant {
        self.get("theme")
            .and_then(ThemeVariant::from_str_name)
            .unwrap_or(ThemeVariant::Dark)
    }

    pub fn route_mode(&self) -> RouteMode {
        match self.get("route_mode") {
            Some("path") => RouteMode::Path,
            _ => RouteMode::Hash,
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.parse_or("search_debounce_ms", 300))
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.parse_or("toast_seconds", 3))
    }

    pub fn issue_repo(&self) -> &str {
        self.get("issue_repo")
            .unwrap_or("foxorange224/foxorange224.github.io")
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn parse_or(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
    }

    fn store_key(key: &str) -> String {
        match key {
            "theme" => keys::THEME.to_string(),
            other => format!("{}{}", PREF_PREFIX, other),
        }
    }

    /// Flatten Config struct into key-value pairs.
    fn flatten_config(config: &Config) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("theme".to_string(), config.theme.clone());
        map.insert(
            "route_mode".to_string(),
            match config.route_mode {
                RouteMode::Hash => "hash",
                RouteMode::Path => "path",
            }
            .to_string(),
        );
        map.insert(
            "search_debounce_ms".to_string(),
            config.search_debounce_ms.to_string(),
        );
        map.insert("toast_seconds".to_string(), config.toast_seconds.to_string());
        map.insert("issue_repo".to_string(), config.issue_repo.clone());

        for (action, key_str) in &config.keybindings {
            map.insert(format!("keybind.{}", action), key_str.clone());
        }

        map
    }
}

// ============================================================================
// Tests
// ============================================================================
