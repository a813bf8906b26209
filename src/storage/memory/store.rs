//! In-process model and usage storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::core::models::{ModelConfig, ModelFilter, UsageRecord, UsageStatus};
use crate::storage::traits::{ModelStore, UsageStore};
use crate::utils::error::{GatewayError, Result};

/// Model and usage storage kept in memory.
///
/// Used when no database is configured and in tests. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    models: RwLock<HashMap<Uuid, ModelConfig>>,
    usage: RwLock<Vec<UsageRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn usage_count(&self) -> usize {
        self.usage.read().len()
    }
}

#[async_trait]
impl ModelStore for InMemoryStore {
    async fn insert(&self, model: ModelConfig) -> Result<ModelConfig> {
        let mut models = self.models.write();
        if models.values().any(|m| m.name == model.name) {
            return Err(GatewayError::conflict(format!(
                "model '{}' already exists",
                model.name
            )));
        }
        if models.contains_key(&model.id) {
            return Err(GatewayError::conflict(format!("model id {} already exists", model.id)));
        }
        models.insert(model.id, model.clone());
        Ok(model)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ModelConfig>> {
        Ok(self.models.read().get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ModelConfig>> {
        Ok(self.models.read().values().find(|m| m.name == name).cloned())
    }

    async fn list(&self, filter: &ModelFilter) -> Result<(Vec<ModelConfig>, u64)> {
        let filter = filter.clone().normalized();
        let mut matching: Vec<ModelConfig> = self
            .models
            .read()
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.name.cmp(&b.name)));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.page_size as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, model: ModelConfig) -> Result<ModelConfig> {
        let mut models = self.models.write();
        if !models.contains_key(&model.id) {
            return Err(GatewayError::not_found("model not found"));
        }
        if models
            .values()
            .any(|m| m.id != model.id && m.name == model.name)
        {
            return Err(GatewayError::conflict(format!(
                "model '{}' already exists",
                model.name
            )));
        }
        models.insert(model.id, model.clone());
        Ok(model)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.models.write().remove(&id).is_some())
    }
}

#[async_trait]
impl UsageStore for InMemoryStore {
    async fn append(&self, record: UsageRecord) -> Result<()> {
        self.usage.write().push(record);
        Ok(())
    }

    async fn sum_tokens(
        &self,
        model_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        Ok(self
            .usage
            .read()
            .iter()
            .filter(|r| {
                r.model_id == model_id
                    && r.status == UsageStatus::Success
                    && r.created_at >= from
                    && r.created_at < to
            })
            .map(|r| r.tokens_used)
            .sum())
    }

    async fn list_for_model(&self, model_id: Uuid, limit: u64) -> Result<Vec<UsageRecord>> {
        let mut records: Vec<UsageRecord> = self
            .usage
            .read()
            .iter()
            .filter(|r| r.model_id == model_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit as usize);
        Ok(records)
    }
}
