//! Site settings storage.
//!
//! Settings live as one JSONB document per key in the `settings` table. The
//! site settings document is created with defaults on first read.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use orchard_core::models::SiteSettings;

use super::RepositoryError;

/// Key of the site settings document.
pub const SITE_SETTINGS_KEY: &str = "site";

/// Repository for settings database operations.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored JSON does not
    /// match `T`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, RepositoryError> {
        let value: Option<JsonValue> = sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;

        value
            .map(|v| {
                serde_json::from_value(v).map_err(|e| {
                    RepositoryError::DataCorruption(format!("invalid setting {key}: {e}"))
                })
            })
            .transpose()
    }

    /// Set a setting value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(value).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize setting {key}: {e}"))
        })?;

        sqlx::query(
            r"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(value)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// The site settings, storing the defaults if none exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if reading or writing the document fails.
    pub async fn site(&self) -> Result<SiteSettings, RepositoryError> {
        if let Some(settings) = self.get::<SiteSettings>(SITE_SETTINGS_KEY).await? {
            return Ok(settings);
        }

        let defaults = SiteSettings::default();
        sqlx::query("INSERT INTO settings (key, value) VALUES ($1, $2) ON CONFLICT (key) DO NOTHING")
            .bind(SITE_SETTINGS_KEY)
            .bind(sqlx::types::Json(&defaults))
            .execute(self.pool)
            .await?;
        tracing::info!("Created default site settings");

        // Another request may have won the insert race; return what is stored.
        Ok(self
            .get::<SiteSettings>(SITE_SETTINGS_KEY)
            .await?
            .unwrap_or(defaults))
    }

    /// Store the site settings document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the write fails.
    pub async fn save_site(&self, settings: &SiteSettings) -> Result<(), RepositoryError> {
        self.set(SITE_SETTINGS_KEY, settings).await
    }
}
