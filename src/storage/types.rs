use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Local store errors with user-friendly messages
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another instance of the application has locked the store
    #[error("Another instance of foxweb appears to be running. Please close it and try again.")]
    InstanceLocked,

    /// Migration failed
    #[error("Store migration failed: {0}")]
    Migration(String),

    /// A single value is larger than the per-key quota.
    #[error("Storage quota exceeded for '{key}': {size} bytes (max {max} bytes)")]
    QuotaExceeded { key: String, size: usize, max: usize },

    /// A value could not be encoded as JSON.
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Generic database error
    #[error("Store error: {0}")]
    Other(#[from] sqlx::Error),
}

impl StoreError {
    /// Check if a sqlx error indicates store locking
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        let error_string = err.to_string().to_lowercase();

        // SQLITE_BUSY (5), SQLITE_LOCKED (6), SQLITE_CANTOPEN (14)
        if error_string.contains("database is locked")
            || error_string.contains("database table is locked")
            || error_string.contains("sqlite_busy")
            || error_string.contains("sqlite_locked")
            || error_string.contains("unable to open database file")
        {
            return StoreError::InstanceLocked;
        }

        StoreError::Other(err)
    }
}

// ============================================================================
// Storage Keys
// ============================================================================

/// Flat key names used in the local store.
///
/// These mirror the keys the web page kept in `localStorage`, so a store
/// dump reads the same way.
pub mod keys {
    pub const THEME: &str = "foxweb_theme";
    pub const FIRST_VISIT: &str = "foxweb_first_visit";
    pub const APP_STATE: &str = "foxweb_state";
    pub const FAVORITES: &str = "foxweb_favorites";
    pub const NOTIFICATIONS: &str = "foxweb_notifications";
    pub const SUGGESTIONS: &str = "foxweb_sugerencias";
    pub const CATALOG_FINGERPRINT: &str = "foxweb_db_version_1";
    pub const CATALOG_NAMES: &str = "foxweb_db_version_1_data";
}
