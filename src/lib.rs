//! # llmgate
//!
//! Admission and resilience layer for an internal LLM gateway.
//!
//! Every completion request passes through the same pipeline:
//!
//! - **Quota admission**: daily and monthly token budgets per model, derived from the usage ledger
//! - **Response caching**: deterministic requests (temperature 0) are answered from cache
//! - **Credential custody**: provider keys encrypted at rest or fetched from a Vault-compatible store
//! - **Circuit breaking**: one breaker per provider, with optional fallback models
//! - **Usage accounting**: one ledger row per provider call, success or failure
//!
//! ## Gateway Mode
//!
//! ```rust,no_run
//! use llmgate::{Config, Gateway, RequestContext};
//! use llmgate::core::types::{CompletionRequest, Message};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/gateway.yaml").await?;
//!     let gateway = Gateway::new(config).await?;
//!
//!     let request = CompletionRequest::new(
//!         "claude-sonnet-4-5-20250929",
//!         vec![Message::user("What is the capital of France?")],
//!     );
//!     let result = gateway.complete(&request, &RequestContext::default()).await?;
//!     println!("{}", result.response.content);
//!
//!     gateway.shutdown().await;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{GatewayError, Result, ResultCode};

pub use crate::core::cache::ResponseCache;
pub use crate::core::circuit_breaker::{CircuitBreakerConfig, CircuitBreakerRegistry, CircuitState};
pub use crate::core::health::{ComponentHealth, GatewayHealth, HealthStatus, ProviderStatus};
pub use crate::core::models::{
    CreateModelPayload, Credentials, LogUsagePayload, ModelConfig, ModelFilter, ModelStatus,
    QuotaStatus, UpdateModelPayload, UsageRecord, UsageStatus,
};
pub use crate::core::pipeline::{CompletionResult, RequestContext, RequestPipeline, StreamSummary};
pub use crate::core::providers::{HttpProviderFactory, ProviderFactory, ProviderType};
pub use crate::core::quota::QuotaLedger;
pub use crate::core::router::Router;
pub use crate::core::traits::{
    LLMProvider, ModelChangeListener, ModelConfigSource, StreamCallback,
};
pub use crate::core::types::{CompletionRequest, CompletionResponse, Message, StreamChunk, Usage};
pub use crate::core::vault::{CredentialVault, HttpSecretStore, InMemorySecretStore, SecretStore};
pub use services::{ModelConfigApi, ModelConfigService, ServiceResponse};

use std::sync::{Arc, Weak};
use tracing::{info, warn};

use storage::{CacheStore, InMemoryCacheStore, InMemoryStore, ModelStore, UsageStore};

/// A fully assembled gateway: storage, credential vault, configuration service and
/// the request pipeline sharing one router, breaker registry and cache.
pub struct Gateway {
    config: Config,
    database: Option<storage::Database>,
    vault: Arc<CredentialVault>,
    service: Arc<ModelConfigService>,
    api: ModelConfigApi,
    pipeline: RequestPipeline,
}

impl Gateway {
    /// Connect storage and build every component from `config`.
    ///
    /// Without a database the gateway keeps models and usage in memory. Without Redis the
    /// response cache is in-process. Without a Vault address only locally encrypted keys work.
    pub async fn new(config: Config) -> Result<Self> {
        info!("Creating new gateway instance");
        config.validate()?;

        let (database, models, usage) = open_storage(&config).await?;
        let cache_store = open_cache_store(&config).await;

        let secrets: Arc<dyn SecretStore> = match HttpSecretStore::from_config(config.vault())? {
            Some(store) => Arc::new(store),
            None => {
                warn!("No vault address configured; vault-backed credentials are unavailable");
                Arc::new(InMemorySecretStore::new())
            }
        };
        let vault = Arc::new(CredentialVault::from_config(
            &config.gateway.security.master_key,
            secrets,
            config.vault(),
        ));

        let ledger = QuotaLedger::new(models.clone(), usage);
        let service = Arc::new(ModelConfigService::new(models, vault.clone(), ledger.clone()));
        let api = ModelConfigApi::new(service.clone());

        let factory = Arc::new(HttpProviderFactory::new(
            config.pipeline().request_timeout_duration(),
        )?);
        let router = Arc::new(Router::new(service.clone(), factory));
        let listener: Weak<dyn ModelChangeListener> = Arc::<Router>::downgrade(&router);
        service.subscribe(listener);
        let breakers = Arc::new(CircuitBreakerRegistry::new(CircuitBreakerConfig::from(
            config.circuit_breaker(),
        )));
        let cache = ResponseCache::from_config(cache_store, config.cache());
        let pipeline =
            RequestPipeline::new(router, cache, breakers, ledger).with_config(config.pipeline());

        let gateway = Self {
            config,
            database,
            vault,
            service,
            api,
            pipeline,
        };

        if gateway.config.gateway.seed.enabled {
            gateway.seed().await?;
        }

        info!("Gateway ready");
        Ok(gateway)
    }

    /// Create the default models that do not exist yet
    pub async fn seed(&self) -> Result<usize> {
        let created = services::seed_default_models(&self.service).await?;
        info!("Seeded {} default models", created);
        Ok(created)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn service(&self) -> &Arc<ModelConfigService> {
        &self.service
    }

    pub fn api(&self) -> &ModelConfigApi {
        &self.api
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    pub fn vault(&self) -> &Arc<CredentialVault> {
        &self.vault
    }

    /// Run a completion through the full pipeline
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        ctx: &RequestContext,
    ) -> Result<CompletionResult> {
        self.pipeline.complete(request, ctx).await
    }

    /// Stream a completion through the pipeline, relaying chunks to `callback`
    pub async fn stream_complete(
        &self,
        request: &CompletionRequest,
        ctx: &RequestContext,
        callback: StreamCallback<'_>,
    ) -> Result<StreamSummary> {
        self.pipeline.stream_complete(request, ctx, callback).await
    }

    /// Update a model; the router drops its cached provider through the service
    pub async fn update_model(&self, payload: UpdateModelPayload) -> Result<ModelConfig> {
        self.service.update_model(payload).await
    }

    /// Delete a model and its cached provider
    pub async fn delete_model(&self, id_or_name: &str) -> Result<()> {
        self.service.delete_model(id_or_name).await
    }

    /// Check storage and cache reachability and report every provider's breaker.
    ///
    /// Storage is critical; an unreachable cache or an open breaker only degrades.
    pub async fn health(&self) -> GatewayHealth {
        let storage = match &self.database {
            Some(database) => ComponentHealth::check("storage", database.health_check()).await,
            None => ComponentHealth::check("storage", async { Ok(()) }).await,
        };
        let cache = ComponentHealth::check("cache", self.pipeline.cache().health_check()).await;

        let health =
            GatewayHealth::aggregate(vec![storage, cache], self.provider_status(), &["storage"]);
        if !health.is_healthy() {
            warn!("Gateway health is {}", health.status.as_str());
        }
        health
    }

    /// Breaker state of every provider that has been called
    pub fn provider_status(&self) -> Vec<ProviderStatus> {
        self.pipeline
            .breakers()
            .snapshot()
            .into_iter()
            .map(|(provider_id, metrics)| ProviderStatus::new(provider_id, metrics))
            .collect()
    }

    /// Route `model_id` and ask its provider for a health response, bypassing the breaker
    pub async fn check_model(&self, model_id: &str) -> Result<ComponentHealth> {
        let route = self.pipeline.router().route(model_id).await?;
        Ok(ComponentHealth::check(
            route.provider_id(),
            route.provider.health_check(&route.credentials),
        )
        .await)
    }

    /// Stop background tasks and close the database
    pub async fn shutdown(self) {
        info!("Shutting down gateway");
        self.vault.shutdown().await;
        if let Some(database) = self.database {
            if let Err(e) = database.close().await {
                warn!("Failed to close database: {}", e);
            }
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("database", &self.database.is_some())
            .field("vault", &self.vault)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

type Stores = (
    Option<storage::Database>,
    Arc<dyn ModelStore>,
    Arc<dyn UsageStore>,
);

async fn open_storage(config: &Config) -> Result<Stores> {
    let database_config = &config.storage().database;
    if !database_config.enabled {
        warn!("Database disabled; models and usage are kept in memory");
        let store = Arc::new(InMemoryStore::new());
        let models: Arc<dyn ModelStore> = store.clone();
        let usage: Arc<dyn UsageStore> = store;
        return Ok((None, models, usage));
    }

    let database = storage::Database::new(database_config).await?;
    database.migrate().await?;
    let shared = Arc::new(database.clone());
    let models: Arc<dyn ModelStore> = shared.clone();
    let usage: Arc<dyn UsageStore> = shared;
    Ok((Some(database), models, usage))
}

async fn open_cache_store(config: &Config) -> Arc<dyn CacheStore> {
    #[cfg(feature = "redis")]
    {
        let redis_config = &config.storage().redis;
        if redis_config.enabled {
            match storage::RedisPool::new(redis_config).await {
                Ok(pool) => return Arc::new(storage::RedisCacheStore::new(pool)),
                Err(e) => warn!("Redis unavailable, using in-process response cache: {}", e),
            }
        }
    }
    Arc::new(InMemoryCacheStore::new(config.cache().max_entries))
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> Config {
        let mut config = Config::default();
        config.gateway.security.master_key = "test-master-key".to_string();
        config.gateway.storage.database.enabled = false;
        config.gateway.storage.redis.enabled = false;
        config
    }

    #[test]
    fn test_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(NAME, "llmgate");
        assert!(!DESCRIPTION.is_empty());
    }

    #[tokio::test]
    async fn test_in_memory_gateway_seeds_once() {
        let mut config = memory_config();
        config.gateway.seed.enabled = true;
        let gateway = Gateway::new(config).await.unwrap();

        let (models, total) = gateway.service().list_models(ModelFilter::default()).await.unwrap();
        assert_eq!(total, 4);
        assert!(models.iter().all(|m| m.provider == "anthropic"));
        assert_eq!(gateway.seed().await.unwrap(), 0);

        gateway.shutdown().await;
    }

    #[tokio::test]
    async fn test_missing_master_key_rejected() {
        let mut config = memory_config();
        config.gateway.security.master_key.clear();
        assert!(Gateway::new(config).await.is_err());
    }

    #[tokio::test]
    async fn test_update_and_delete_evict_provider() {
        let gateway = Gateway::new(memory_config()).await.unwrap();
        gateway.seed().await.unwrap();

        let model = gateway.service().get_model("claude-haiku-4-5-20251001").await.unwrap();
        let router = gateway.pipeline().router();
        router.provider_for(&model).unwrap();
        assert_eq!(router.cached_providers(), 1);

        gateway
            .update_model(UpdateModelPayload {
                id: model.name.clone(),
                base_url: Some("http://localhost:9/v1".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(router.cached_providers(), 0);

        router.provider_for(&model).unwrap();
        gateway.delete_model(&model.name).await.unwrap();
        assert_eq!(router.cached_providers(), 0);
        assert!(gateway.service().get_model(&model.name).await.is_err());
    }

    #[tokio::test]
    async fn test_api_changes_evict_provider() {
        let gateway = Gateway::new(memory_config()).await.unwrap();
        gateway.seed().await.unwrap();

        let model = gateway.service().get_model("claude-haiku-4-5-20251001").await.unwrap();
        let router = gateway.pipeline().router();
        router.provider_for(&model).unwrap();

        let updated = gateway
            .api()
            .update_model(UpdateModelPayload {
                id: model.id.to_string(),
                quota_daily: Some(1000),
                ..Default::default()
            })
            .await;
        assert_eq!(updated.code, ResultCode::Success);
        assert_eq!(router.cached_providers(), 0);

        router.provider_for(&model).unwrap();
        let deleted = gateway.api().delete_model(&model.name).await;
        assert_eq!(deleted.code, ResultCode::Success);
        assert_eq!(router.cached_providers(), 0);
    }

    #[tokio::test]
    async fn test_health_of_in_memory_gateway() {
        let gateway = Gateway::new(memory_config()).await.unwrap();

        let health = gateway.health().await;
        assert_eq!(health.status, HealthStatus::Healthy);
        let names: Vec<_> = health.components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["storage", "cache"]);
        assert!(health.providers.is_empty());
        assert!(gateway.provider_status().is_empty());
    }

    #[tokio::test]
    async fn test_provider_status_reports_open_breaker() {
        let gateway = Gateway::new(memory_config()).await.unwrap();
        let breakers = gateway.pipeline().breakers();
        for _ in 0..5 {
            let _ = breakers
                .execute("anthropic:claude", async {
                    Err::<(), _>(GatewayError::provider("down"))
                })
                .await;
        }
        breakers
            .execute("openai:gpt", async { Ok::<_, GatewayError>(()) })
            .await
            .unwrap();

        let status = gateway.provider_status();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].provider_id, "anthropic:claude");
        assert_eq!(status[0].state, CircuitState::Open);
        assert!(!status[0].available);
        assert!(status[1].available);

        let health = gateway.health().await;
        assert_eq!(health.status, HealthStatus::Degraded);
    }

    #[tokio::test]
    async fn test_check_model_unknown() {
        let gateway = Gateway::new(memory_config()).await.unwrap();
        let err = gateway.check_model("missing").await.unwrap_err();
        assert!(matches!(err, GatewayError::ModelNotFound(_)));
    }
}
