//! Storage abstractions used by the ledger, the configuration service and the response cache

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::core::models::{ModelConfig, ModelFilter, UsageRecord};
use crate::utils::error::Result;

/// Persistent model configurations
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Insert a new model. A duplicate name fails with `Conflict`.
    async fn insert(&self, model: ModelConfig) -> Result<ModelConfig>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ModelConfig>>;

    async fn get_by_name(&self, name: &str) -> Result<Option<ModelConfig>>;

    /// Look up by UUID first, then by name
    async fn find(&self, id_or_name: &str) -> Result<Option<ModelConfig>> {
        if let Ok(id) = Uuid::parse_str(id_or_name) {
            if let Some(model) = self.get_by_id(id).await? {
                return Ok(Some(model));
            }
        }
        self.get_by_name(id_or_name).await
    }

    /// One page of models matching `filter`, newest first, with the total match count
    async fn list(&self, filter: &ModelFilter) -> Result<(Vec<ModelConfig>, u64)>;

    /// Replace a stored model. Missing fails with `NotFound`, a name clash with `Conflict`.
    async fn update(&self, model: ModelConfig) -> Result<ModelConfig>;

    /// Hard delete; returns whether a row was removed
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Append-only usage ledger
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn append(&self, record: UsageRecord) -> Result<()>;

    /// Sum of `tokens_used` over successful records with `created_at` in `[from, to)`
    async fn sum_tokens(&self, model_id: Uuid, from: DateTime<Utc>, to: DateTime<Utc>)
    -> Result<i64>;

    /// Most recent records for a model, newest first
    async fn list_for_model(&self, model_id: Uuid, limit: u64) -> Result<Vec<UsageRecord>>;
}

/// Key-value store with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Whether the backing store is reachable
    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
