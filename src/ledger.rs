//! Date-partitioned, append-only nutrition ledger.
//!
//! Each local calendar date owns one KV partition (`meals_<YYYY-MM-DD>`)
//! holding the day's meal records in logging order. Appends go through a
//! single async mutex so two concurrent logs for the same date can never
//! interleave their get/push/save sequences and drop a record. Aggregate
//! totals are always recomputed from the stored records; there is no cached
//! running counter that could drift.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::error::PipelineError;
use crate::models::{MealRecord, NutritionFacts};
use crate::storage::KvStore;

// ---

/// Prefix for per-date partition keys.
const MEALS_PREFIX: &str = "meals_";

/// Append-only meal store with per-day aggregate queries.
pub struct NutritionLedger {
    store: Arc<dyn KvStore>,
    append_lock: Mutex<()>,
}

impl NutritionLedger {
    // ---
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            append_lock: Mutex::new(()),
        }
    }

    /// Append a record to the date's partition, creating it lazily.
    ///
    /// Existing records are never mutated; the partition is re-read and
    /// re-written under the append lock.
    pub async fn append(&self, date: NaiveDate, record: MealRecord) -> Result<(), PipelineError> {
        // ---
        let _guard = self.append_lock.lock().await;

        let key = partition_key(date);
        let mut records = self.read_partition(&key).await?;
        records.push(record);

        let json = serde_json::to_string(&records)?;
        self.store.set(&key, &json).await
    }

    /// Sum of all four macro fields across the date's records.
    ///
    /// A date with no records yields all-zero facts, not an error.
    pub async fn daily_totals(&self, date: NaiveDate) -> Result<NutritionFacts, PipelineError> {
        // ---
        let records = self.meals_for(date).await?;

        let mut totals = NutritionFacts::zero();
        for record in &records {
            totals.accumulate(&record.nutrition);
        }
        Ok(totals)
    }

    /// The date's records in logging order; empty for unknown dates.
    pub async fn meals_for(&self, date: NaiveDate) -> Result<Vec<MealRecord>, PipelineError> {
        // ---
        self.read_partition(&partition_key(date)).await
    }

    /// Delete every partition and everything else in the store, including
    /// the profile. Irreversible.
    pub async fn clear_all(&self) -> Result<(), PipelineError> {
        // ---
        self.store.clear().await
    }

    async fn read_partition(&self, key: &str) -> Result<Vec<MealRecord>, PipelineError> {
        // ---
        match self.store.get(key).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }
}

fn partition_key(date: NaiveDate) -> String {
    format!("{MEALS_PREFIX}{}", date.format("%Y-%m-%d"))
}
