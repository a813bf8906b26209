//! Core LLM Provider trait definitions
//!
//! Defines the unified interface for all AI providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::core::models::Credentials;
use crate::core::types::{CompletionRequest, CompletionResponse, StreamChunk};
use crate::utils::error::Result;

/// Callback receiving streamed chunks in order.
///
/// Returning an error stops the stream and propagates that error.
pub type StreamCallback<'a> = &'a mut (dyn FnMut(StreamChunk) -> Result<()> + Send);

/// Metadata describing a provider instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Human-readable name
    pub name: String,
    /// Provider type string, e.g. `anthropic`
    pub provider_type: String,
    pub base_url: String,
    /// Provider-side model served by this instance
    pub model: String,
}

/// Unified LLM Provider interface
///
/// Every vendor integration implements this trait. One instance serves one provider-side
/// model; the router caches instances per model configuration.
///
/// # Design Principles
///
/// 1. **Credentials are arguments**: keys are passed on every call and never stored on the
///    instance or the request, so one instance can serve many keys concurrently
/// 2. **Approximate usage is acceptable**: when the vendor reports no usage, implementations
///    estimate it
/// 3. **Async first**: all I/O is asynchronous and cancellable by dropping the future
#[async_trait]
pub trait LLMProvider: Send + Sync + Debug + 'static {
    // ==================== Basic Metadata ====================

    /// Provider metadata
    fn info(&self) -> ProviderInfo;

    /// Stable identifier of this provider instance, `<provider type>:<model>`.
    ///
    /// Used as the circuit breaker key.
    fn provider_id(&self) -> String {
        let info = self.info();
        format!("{}:{}", info.provider_type, info.model)
    }

    // ==================== Core Functions ====================

    /// Run a completion and return the full response
    async fn complete(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
    ) -> Result<CompletionResponse>;

    /// Run a completion, delivering partial content through `callback`.
    ///
    /// The final chunk carries usage when the vendor reports it.
    async fn stream_complete(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
        callback: StreamCallback<'_>,
    ) -> Result<()>;

    /// Verify the provider is reachable with these credentials
    async fn health_check(&self, credentials: &Credentials) -> Result<()>;
}
