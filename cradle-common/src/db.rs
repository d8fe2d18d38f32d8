//! Settings table helpers
//!
//! Key/value persistence shared by Cradle services. The settings table is
//! the authoritative tier for runtime-editable configuration (e.g. the
//! classifier API key).

use crate::Result;
use sqlx::SqlitePool;

/// Create the settings table if it does not exist
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Read a setting value by key
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;

    Ok(value)
}

/// Write a setting value (insert or overwrite)
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value) VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    tracing::debug!(key = %key, "Setting updated");

    Ok(())
}
