//! Key-value persistence for profile and ledger data.
//!
//! The pipeline only ever needs `get/set/delete/clear` over string keys, so
//! persistence is a [`KvStore`] trait with two implementations: a
//! Postgres-backed store over the single `kv_store` table (production, via
//! the sqlx pool built in `main.rs`) and an in-memory store used by tests.
//! Values are JSON documents serialized by the callers.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::error::PipelineError;
use crate::models::Profile;

// ---

/// KV key under which the single user profile is stored.
const PROFILE_KEY: &str = "profile";

/// Minimal key-value contract required by the ledger and profile repo.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, PipelineError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), PipelineError>;
    async fn delete(&self, key: &str) -> Result<(), PipelineError>;

    /// Remove every key. Irreversible.
    async fn clear(&self) -> Result<(), PipelineError>;
}

// ---

/// Postgres-backed store over the `kv_store` table created by `schema`.
pub struct PgKvStore {
    pool: PgPool,
}

impl PgKvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvStore for PgKvStore {
    // ---
    async fn get(&self, key: &str) -> Result<Option<String>, PipelineError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PipelineError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PipelineError> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), PipelineError> {
        sqlx::query("DELETE FROM kv_store")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

// ---

/// In-memory store backing unit tests and local experiments.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    // ---
    async fn get(&self, key: &str) -> Result<Option<String>, PipelineError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), PipelineError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), PipelineError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), PipelineError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PipelineError::Storage(e.to_string()))?;
        entries.clear();
        Ok(())
    }
}

// ---

/// Load/save access for the single stored [`Profile`].
pub struct ProfileRepo {
    store: Arc<dyn KvStore>,
}

impl ProfileRepo {
    // ---
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn load(&self) -> Result<Option<Profile>, PipelineError> {
        match self.store.get(PROFILE_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    pub async fn save(&self, profile: &Profile) -> Result<(), PipelineError> {
        let json = serde_json::to_string(profile)?;
        self.store.set(PROFILE_KEY, &json).await
    }
}
