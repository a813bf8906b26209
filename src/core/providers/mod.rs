//! LLM provider integrations
//!
//! Each vendor implements [`LLMProvider`]; [`ProviderType`] is the dispatch table from a
//! configured provider string to a constructor.

pub mod anthropic;
pub mod ollama;
pub mod openai;
pub mod sse;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::core::models::{Credentials, ModelConfig};
use crate::core::traits::LLMProvider;
use crate::utils::error::{GatewayError, Result};

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAIProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    Anthropic,
    OpenAI,
    /// Ollama or another local model server
    Ollama,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Anthropic => "anthropic",
            ProviderType::OpenAI => "openai",
            ProviderType::Ollama => "ollama",
        }
    }
}

impl FromStr for ProviderType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(ProviderType::Anthropic),
            "openai" => Ok(ProviderType::OpenAI),
            "ollama" | "local" => Ok(ProviderType::Ollama),
            other => Err(GatewayError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds provider instances for model configurations
pub trait ProviderFactory: Send + Sync {
    fn create(&self, model: &ModelConfig) -> Result<Arc<dyn LLMProvider>>;
}

/// Factory for the HTTP provider clients
#[derive(Debug, Clone)]
pub struct HttpProviderFactory {
    client: Client,
}

impl HttpProviderFactory {
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn create(&self, model: &ModelConfig) -> Result<Arc<dyn LLMProvider>> {
        let client = self.client.clone();
        let provider: Arc<dyn LLMProvider> = match model.provider.parse::<ProviderType>()? {
            ProviderType::Anthropic => Arc::new(AnthropicProvider::new(
                client,
                &model.name,
                &model.base_url,
                &model.model_id,
            )),
            ProviderType::OpenAI => Arc::new(OpenAIProvider::new(
                client,
                &model.name,
                &model.base_url,
                &model.model_id,
            )),
            ProviderType::Ollama => Arc::new(OllamaProvider::new(
                client,
                &model.name,
                &model.base_url,
                &model.model_id,
            )),
        };
        Ok(provider)
    }
}

/// Rough token count: one token per four characters
pub fn estimate_tokens(text: &str) -> u32 {
    (text.trim().chars().count() / 4) as u32
}

/// Base URL for a call: the credential override, else the configured one
pub(crate) fn effective_base_url<'a>(credentials: &'a Credentials, configured: &'a str) -> &'a str {
    credentials
        .base_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .unwrap_or(configured)
        .trim_end_matches('/')
}

/// Extra headers carried by the credentials. Invalid names or values are skipped.
pub(crate) fn credential_headers(credentials: &Credentials) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (key, value) in &credentials.headers {
        if let (Ok(name), Ok(value)) = (
            key.parse::<HeaderName>(),
            value.parse::<HeaderValue>(),
        ) {
            headers.insert(name, value);
        }
    }
    headers
}

/// Header value from a secret, rejecting characters HTTP cannot carry
pub(crate) fn secret_header(value: &str) -> Result<HeaderValue> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| GatewayError::InvalidCredentials("api key is not a valid header value".into()))?;
    header.set_sensitive(true);
    Ok(header)
}

/// Pass successful responses through; turn error statuses into provider errors
pub(crate) async fn check_status(provider: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    let body: String = body.chars().take(512).collect();

    Err(match status.as_u16() {
        401 | 403 => GatewayError::provider(format!("{}: authentication failed ({})", provider, status)),
        408 | 504 => GatewayError::timeout(format!("{}: upstream timeout ({})", provider, status)),
        _ => GatewayError::provider(format!("{} returned {}: {}", provider, status, body)),
    })
}

/// Map a transport failure, keeping timeouts distinguishable
pub(crate) fn send_error(provider: &str, error: &reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::timeout(format!("{}: request timed out", provider))
    } else {
        GatewayError::provider(format!("{}: request failed: {}", provider, error))
    }
}
