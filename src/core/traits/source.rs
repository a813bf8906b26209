//! Model configuration lookup used by routing

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::models::{Credentials, ModelConfig};
use crate::utils::error::Result;

/// Source of model configurations and their credentials.
///
/// Implemented by the configuration service; the router depends only on this trait.
#[async_trait]
pub trait ModelConfigSource: Send + Sync {
    /// Look up a model by id or name
    async fn resolve_model(&self, id_or_name: &str) -> Result<Option<ModelConfig>>;

    /// Decrypted credentials for a resolved model
    async fn credentials(&self, model: &ModelConfig) -> Result<Credentials>;
}

/// Notified after a model configuration is updated or deleted
pub trait ModelChangeListener: Send + Sync {
    fn model_changed(&self, model_id: Uuid);
}
