//! Model resolution and provider selection

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::balancer::KeyBalancer;
use crate::core::models::{Credentials, ModelConfig};
use crate::core::providers::ProviderFactory;
use crate::core::traits::{LLMProvider, ModelChangeListener, ModelConfigSource};
use crate::utils::error::{GatewayError, Result};

/// Everything needed to invoke a provider for one request
#[derive(Debug, Clone)]
pub struct Route {
    pub model: ModelConfig,
    pub provider: Arc<dyn LLMProvider>,
    /// Credentials bound to the key selected for this call
    pub credentials: Credentials,
}

impl Route {
    /// Circuit breaker key of the provider serving this route
    pub fn provider_id(&self) -> String {
        self.provider.provider_id()
    }
}

/// Resolves model ids to provider instances and credentials.
///
/// Provider instances are created lazily, one per model configuration, and reused until
/// evicted. Keys from a multi-key credential pool are rotated per call.
pub struct Router {
    source: Arc<dyn ModelConfigSource>,
    factory: Arc<dyn ProviderFactory>,
    providers: RwLock<HashMap<Uuid, Arc<dyn LLMProvider>>>,
    balancer: KeyBalancer,
}

impl Router {
    pub fn new(source: Arc<dyn ModelConfigSource>, factory: Arc<dyn ProviderFactory>) -> Self {
        Self {
            source,
            factory,
            providers: RwLock::new(HashMap::new()),
            balancer: KeyBalancer::new(),
        }
    }

    /// Look up an active model by id or name
    pub async fn resolve(&self, model_id: &str) -> Result<ModelConfig> {
        let model = self
            .source
            .resolve_model(model_id)
            .await?
            .ok_or_else(|| GatewayError::ModelNotFound(model_id.to_string()))?;
        ensure_active(&model)?;
        Ok(model)
    }

    /// Resolve a model id or name to a ready-to-call route
    pub async fn route(&self, model_id: &str) -> Result<Route> {
        let model = self.resolve(model_id).await?;
        self.route_model(model).await
    }

    /// Route an already resolved model configuration
    pub async fn route_model(&self, model: ModelConfig) -> Result<Route> {
        ensure_active(&model)?;

        let provider = self.provider_for(&model)?;
        let credentials = self.source.credentials(&model).await?;
        let credentials = self.select_key(&model, credentials);

        debug!(
            "Routed model {} to provider {}",
            model.name,
            provider.provider_id()
        );

        Ok(Route {
            model,
            provider,
            credentials,
        })
    }

    /// Cached provider instance for a model, created on first use
    pub fn provider_for(&self, model: &ModelConfig) -> Result<Arc<dyn LLMProvider>> {
        if let Some(provider) = self.providers.read().get(&model.id) {
            return Ok(Arc::clone(provider));
        }

        let mut providers = self.providers.write();
        if let Some(provider) = providers.get(&model.id) {
            return Ok(Arc::clone(provider));
        }

        let provider = self.factory.create(model)?;
        info!(
            "Created provider {} for model {}",
            provider.provider_id(),
            model.name
        );
        providers.insert(model.id, Arc::clone(&provider));
        Ok(provider)
    }

    /// Drop the cached provider for a model so the next call rebuilds it
    pub fn evict(&self, model_id: Uuid) -> bool {
        let removed = self.providers.write().remove(&model_id).is_some();
        self.balancer.reset(&model_id.to_string());
        removed
    }

    /// Number of cached provider instances
    pub fn cached_providers(&self) -> usize {
        self.providers.read().len()
    }

    fn select_key(&self, model: &ModelConfig, credentials: Credentials) -> Credentials {
        if credentials.extra_keys.is_empty() {
            return credentials;
        }
        let pool = credentials.key_pool();
        match self.balancer.next_key(&model.id.to_string(), &pool) {
            Some(key) => credentials.with_selected_key(key.clone()),
            None => credentials,
        }
    }
}

impl ModelChangeListener for Router {
    fn model_changed(&self, model_id: Uuid) {
        if self.evict(model_id) {
            debug!("Evicted provider for changed model {}", model_id);
        }
    }
}

fn ensure_active(model: &ModelConfig) -> Result<()> {
    if model.is_active() {
        Ok(())
    } else {
        Err(GatewayError::ModelInactive(format!(
            "{} ({})",
            model.name, model.status
        )))
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("cached_providers", &self.cached_providers())
            .finish()
    }
}
