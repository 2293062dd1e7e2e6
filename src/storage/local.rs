use serde::de::DeserializeOwned;
use serde::Serialize;

use super::schema::LocalStore;
use super::types::StoreError;

/// Maximum size of a single stored value (5 MiB, the usual browser quota).
pub const MAX_VALUE_BYTES: usize = 5 * 1024 * 1024;

impl LocalStore {
    // ========================================================================
    // Raw Key/Value Operations
    // ========================================================================

    /// Get the raw value stored under `key`, or `None` if not set.
    pub async fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM local_storage WHERE key = ?")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(value,)| value))
    }

    /// Store `value` under `key` (UPSERT).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::QuotaExceeded` if `value` is larger than
    /// [`MAX_VALUE_BYTES`]; nothing is written in that case.
    pub async fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if value.len() > MAX_VALUE_BYTES {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
                size: value.len(),
                max: MAX_VALUE_BYTES,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?, ?, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Remove `key`. Returns true if a value was removed.
    pub async fn remove_item(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All stored keys, ordered.
    pub async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(key,)| key).collect())
    }

    /// Remove every key. Returns the number of entries removed.
    pub async fn clear(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM local_storage")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    // ========================================================================
    // JSON Helpers
    // ========================================================================

    /// Read and decode a JSON value.
    ///
    /// A missing key yields `Ok(None)`. A value that fails to decode is
    /// logged and also yields `Ok(None)`, so callers fall back to defaults.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.get_item(key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring corrupt stored value");
                Ok(None)
            }
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.set_item(key, &encoded).await
    }
}
