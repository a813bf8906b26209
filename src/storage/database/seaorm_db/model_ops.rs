use crate::core::models::{ModelConfig, ModelFilter};
use crate::storage::traits::ModelStore;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use super::super::entities::{self, ai_model};
use super::types::SeaOrmDatabase;

/// Map unique-constraint violations on the model name to `Conflict`
fn map_write_error(err: DbErr, name: &str) -> GatewayError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            GatewayError::conflict(format!("model '{}' already exists", name))
        }
        _ => GatewayError::Database(err),
    }
}

#[async_trait]
impl ModelStore for SeaOrmDatabase {
    async fn insert(&self, model: ModelConfig) -> Result<ModelConfig> {
        debug!("Creating model: {}", model.name);

        let active_model = ai_model::Model::from_domain_model(&model);
        entities::AiModel::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(|e| map_write_error(e, &model.name))?;

        Ok(model)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ModelConfig>> {
        debug!("Finding model by ID: {}", id);

        let model = entities::AiModel::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(model.map(ai_model::Model::to_domain_model))
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<ModelConfig>> {
        debug!("Finding model by name: {}", name);

        let model = entities::AiModel::find()
            .filter(ai_model::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(model.map(ai_model::Model::to_domain_model))
    }

    async fn list(&self, filter: &ModelFilter) -> Result<(Vec<ModelConfig>, u64)> {
        let filter = filter.clone().normalized();
        debug!("Listing models with filter: {:?}", filter);

        let mut query = entities::AiModel::find();
        if let Some(provider) = &filter.provider {
            query = query.filter(ai_model::Column::Provider.eq(provider.to_lowercase()));
        }
        if let Some(status) = filter.status {
            query = query.filter(ai_model::Column::Status.eq(status.as_str()));
        }

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let models = query
            .order_by_desc(ai_model::Column::CreatedAt)
            .order_by_asc(ai_model::Column::Name)
            .offset(filter.offset())
            .limit(filter.page_size)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok((
            models
                .into_iter()
                .map(ai_model::Model::to_domain_model)
                .collect(),
            total,
        ))
    }

    async fn update(&self, model: ModelConfig) -> Result<ModelConfig> {
        debug!("Updating model: {}", model.id);

        entities::AiModel::find_by_id(model.id)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?
            .ok_or_else(|| GatewayError::not_found("model not found"))?;

        let active_model = ai_model::Model::from_domain_model(&model);
        let updated = active_model
            .update(&self.db)
            .await
            .map_err(|e| map_write_error(e, &model.name))?;

        Ok(updated.to_domain_model())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        debug!("Deleting model: {}", id);

        let result = entities::AiModel::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(result.rows_affected > 0)
    }
}
