//! Scripted collaborators for unit tests

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

use crate::core::models::{Credentials, ModelConfig, ModelStatus};
use crate::core::providers::ProviderFactory;
use crate::core::traits::{LLMProvider, ModelConfigSource, ProviderInfo, StreamCallback};
use crate::core::types::{CompletionRequest, CompletionResponse, StreamChunk, Usage};
use crate::utils::error::{GatewayError, Result};

/// Build an active model config
pub fn model(name: &str, provider: &str) -> ModelConfig {
    let now = Utc::now();
    ModelConfig {
        id: Uuid::new_v4(),
        name: name.to_string(),
        provider: provider.to_string(),
        model_id: format!("{}-upstream", name),
        base_url: "http://localhost".to_string(),
        encrypted_api_key: String::new(),
        config: HashMap::new(),
        quota_daily: 0,
        quota_monthly: 0,
        cost_per_1k_tokens: 0.0,
        status: ModelStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

/// Provider answering from a script of outcomes, then with a default reply
#[derive(Debug)]
pub struct ScriptedProvider {
    id: String,
    script: Mutex<VecDeque<std::result::Result<String, String>>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
    keys: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(id: &str) -> Arc<Self> {
        Arc::new(Self {
            id: id.to_string(),
            script: Mutex::new(VecDeque::new()),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
            keys: Mutex::new(Vec::new()),
        })
    }

    pub fn push_ok(&self, text: &str) {
        self.script.lock().push_back(Ok(text.to_string()));
    }

    pub fn push_err(&self, message: &str) {
        self.script.lock().push_back(Err(message.to_string()));
    }

    pub fn fail_times(&self, n: usize) {
        for _ in 0..n {
            self.push_err("upstream failure");
        }
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// API keys seen, in call order
    pub fn keys_seen(&self) -> Vec<String> {
        self.keys.lock().clone()
    }

    async fn next(&self, credentials: &Credentials) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.keys.lock().push(credentials.api_key.clone());
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let outcome = self.script.lock().pop_front();
        match outcome {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(GatewayError::provider(message)),
            None => Ok(format!("reply from {}", self.id)),
        }
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: self.id.clone(),
            provider_type: "scripted".to_string(),
            base_url: "http://localhost".to_string(),
            model: self.id.clone(),
        }
    }

    fn provider_id(&self) -> String {
        self.id.clone()
    }

    async fn complete(
        &self,
        _request: &CompletionRequest,
        credentials: &Credentials,
    ) -> Result<CompletionResponse> {
        let content = self.next(credentials).await?;
        Ok(CompletionResponse {
            content,
            usage: Usage::new(10, 5),
            finish_reason: "stop".to_string(),
            model: self.id.clone(),
        })
    }

    async fn stream_complete(
        &self,
        _request: &CompletionRequest,
        credentials: &Credentials,
        callback: StreamCallback<'_>,
    ) -> Result<()> {
        let content = self.next(credentials).await?;
        for word in content.split_inclusive(' ') {
            callback(StreamChunk::text(word))?;
        }
        callback(StreamChunk {
            content: String::new(),
            usage: Some(Usage::new(10, 5)),
            finish_reason: Some("stop".to_string()),
        })
    }

    async fn health_check(&self, _credentials: &Credentials) -> Result<()> {
        Ok(())
    }
}

/// Factory handing out pre-built providers by model name
#[derive(Default)]
pub struct StaticFactory {
    providers: Mutex<HashMap<String, Arc<ScriptedProvider>>>,
    created: AtomicUsize,
}

impl StaticFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn register(&self, model_name: &str, provider: Arc<ScriptedProvider>) {
        self.providers.lock().insert(model_name.to_string(), provider);
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

impl ProviderFactory for StaticFactory {
    fn create(&self, model: &ModelConfig) -> Result<Arc<dyn LLMProvider>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let provider = self
            .providers
            .lock()
            .get(&model.name)
            .cloned()
            .ok_or_else(|| GatewayError::UnsupportedProvider(model.provider.clone()))?;
        Ok(provider)
    }
}

/// Config source over a fixed set of models
#[derive(Default)]
pub struct StaticSource {
    models: Mutex<Vec<ModelConfig>>,
    credentials: Mutex<HashMap<Uuid, Credentials>>,
}

impl StaticSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, model: ModelConfig, credentials: Credentials) {
        self.credentials.lock().insert(model.id, credentials);
        self.models.lock().push(model);
    }
}

#[async_trait]
impl ModelConfigSource for StaticSource {
    async fn resolve_model(&self, id_or_name: &str) -> Result<Option<ModelConfig>> {
        Ok(self
            .models
            .lock()
            .iter()
            .find(|m| m.name == id_or_name || m.id.to_string() == id_or_name)
            .cloned())
    }

    async fn credentials(&self, model: &ModelConfig) -> Result<Credentials> {
        self.credentials
            .lock()
            .get(&model.id)
            .cloned()
            .ok_or_else(|| GatewayError::VaultPathNotFound(model.name.clone()))
    }
}
