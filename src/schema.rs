//! Database schema management for `platescan`.
//!
//! Ensures the key-value table backing profile and ledger storage exists
//! before serving requests. Applied once on startup from `main.rs`
//! (EMBP: single gateway call).

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// The service stores everything through the `kv_store` table: the profile
/// under one key and each ledger date partition under a `meals_<date>` key.
/// Safe to call on every startup; no-op if the table already exists.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key        TEXT        PRIMARY KEY,
            value      TEXT        NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
