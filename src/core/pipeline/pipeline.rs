//! Admission-and-resilience request pipeline

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::context::RequestContext;
use crate::config::PipelineConfig;
use crate::core::cache::ResponseCache;
use crate::core::circuit_breaker::{CircuitBreakerRegistry, FallbackOutcome};
use crate::core::models::{LogUsagePayload, ModelConfig, UsageStatus};
use crate::core::providers::estimate_tokens;
use crate::core::quota::QuotaLedger;
use crate::core::router::{Route, Router};
use crate::core::traits::StreamCallback;
use crate::core::types::{CompletionRequest, CompletionResponse, StreamChunk, Usage};
use crate::utils::error::{GatewayError, Result};
use crate::utils::hashing::sha256_hex;

/// Default per-request deadline
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A completed request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResult {
    pub response: CompletionResponse,
    pub from_cache: bool,
    /// Provider id that produced the response; `None` for cache hits
    pub served_by: Option<String>,
    pub used_fallback: bool,
}

/// Summary of a finished stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSummary {
    /// Cumulative usage for the whole stream
    pub usage: Usage,
    pub finish_reason: Option<String>,
    pub served_by: String,
}

/// Request lifecycle: quota check, cache lookup, routing, breaker-guarded provider call,
/// cache store and usage logging.
///
/// Bookkeeping failures (cache and usage writes) are logged and never fail the request.
pub struct RequestPipeline {
    router: Arc<Router>,
    cache: ResponseCache,
    breakers: Arc<CircuitBreakerRegistry>,
    ledger: QuotaLedger,
    /// Fallback model per primary model, keyed by name or id
    fallbacks: HashMap<String, String>,
    default_timeout: Duration,
}

impl RequestPipeline {
    pub fn new(
        router: Arc<Router>,
        cache: ResponseCache,
        breakers: Arc<CircuitBreakerRegistry>,
        ledger: QuotaLedger,
    ) -> Self {
        Self {
            router,
            cache,
            breakers,
            ledger,
            fallbacks: HashMap::new(),
            default_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_config(mut self, config: &PipelineConfig) -> Self {
        self.fallbacks = config.fallbacks.clone();
        self.default_timeout = config.request_timeout_duration();
        self
    }

    pub fn with_fallback(mut self, model: impl Into<String>, fallback: impl Into<String>) -> Self {
        self.fallbacks.insert(model.into(), fallback.into());
        self
    }

    /// Deadline applied when the caller sets none; zero disables it
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn breakers(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.breakers
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn ledger(&self) -> &QuotaLedger {
        &self.ledger
    }

    /// Run one completion through the full pipeline
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        ctx: &RequestContext,
    ) -> Result<CompletionResult> {
        validate_request(request)?;
        let ctx = ctx.or_timeout(self.default_timeout);
        let started = Instant::now();

        let model = ctx.run(self.router.resolve(&request.model_id)).await?;
        ctx.run(self.ledger.admit(&model)).await?;

        let cache_key = self
            .cache
            .is_cacheable(request)
            .then(|| self.cache.key(&model.id.to_string(), request));

        if let Some(key) = &cache_key {
            let cached = ctx.run(async { Ok(self.cache.get(key).await) }).await?;
            if let Some(response) = cached {
                debug!("Request {} served from cache", ctx.request_id);
                return Ok(CompletionResult {
                    response,
                    from_cache: true,
                    served_by: None,
                    used_fallback: false,
                });
            }
        }

        let route = ctx.run(self.router.route_model(model)).await?;
        let outcome = self.execute(&route, request, &ctx).await;

        match outcome {
            Ok(outcome) => {
                let (served_model, response) = outcome.value;

                if let Some(key) = &cache_key {
                    self.cache.put(key, &response).await;
                }
                self.record(
                    &served_model,
                    request,
                    &ctx,
                    started,
                    UsageStatus::Success,
                    i64::from(response.usage.total_tokens),
                    None,
                )
                .await;

                info!(
                    "Request {} completed by {} in {}ms",
                    ctx.request_id,
                    outcome.provider_id,
                    started.elapsed().as_millis()
                );
                Ok(CompletionResult {
                    response,
                    from_cache: false,
                    served_by: Some(outcome.provider_id),
                    used_fallback: outcome.used_fallback,
                })
            }
            Err(e) => {
                self.record_failure(&route.model, request, &ctx, started, &e)
                    .await;
                Err(e)
            }
        }
    }

    /// Stream one completion, delivering chunks through `callback`.
    ///
    /// Streams bypass the response cache and never fall back, since chunks may already
    /// have reached the caller. Usage is recorded once, after the stream ends.
    pub async fn stream_complete(
        &self,
        request: &CompletionRequest,
        ctx: &RequestContext,
        callback: StreamCallback<'_>,
    ) -> Result<StreamSummary> {
        validate_request(request)?;
        let ctx = ctx.or_timeout(self.default_timeout);
        let started = Instant::now();

        let model = ctx.run(self.router.resolve(&request.model_id)).await?;
        ctx.run(self.ledger.admit(&model)).await?;
        let route = ctx.run(self.router.route_model(model)).await?;
        let provider_id = route.provider_id();

        let mut reported: Option<Usage> = None;
        let mut finish_reason: Option<String> = None;
        let mut streamed = String::new();
        let mut consumer_error: Option<GatewayError> = None;
        let mut relay = |chunk: StreamChunk| -> Result<()> {
            if let Some(usage) = chunk.usage {
                reported = Some(usage);
            }
            if let Some(reason) = &chunk.finish_reason {
                finish_reason = Some(reason.clone());
            }
            streamed.push_str(&chunk.content);
            // a consumer that stops reading is not a provider failure
            callback(chunk).map_err(|e| {
                let stopped = GatewayError::cancelled(format!("stream consumer stopped: {}", e));
                consumer_error = Some(e);
                stopped
            })
        };

        let result = self
            .breakers
            .execute(
                &provider_id,
                ctx.run(
                    route
                        .provider
                        .stream_complete(request, &route.credentials, &mut relay),
                ),
            )
            .await;

        if let Some(e) = consumer_error {
            debug!(
                "Request {} stream stopped by consumer: {}",
                ctx.request_id, e
            );
            return Err(e);
        }
        if let Err(e) = result {
            self.record_failure(&route.model, request, &ctx, started, &e)
                .await;
            return Err(e);
        }

        let usage = reported.unwrap_or_else(|| {
            Usage::new(
                estimate_tokens(&request.prompt_text()),
                estimate_tokens(&streamed),
            )
        });
        self.record(
            &route.model,
            request,
            &ctx,
            started,
            UsageStatus::Success,
            i64::from(usage.total_tokens),
            None,
        )
        .await;

        Ok(StreamSummary {
            usage,
            finish_reason,
            served_by: provider_id,
        })
    }

    /// Breaker-guarded provider call with lazy fallback.
    ///
    /// Each attempt carries its own deadline inside the breaker, so a hanging provider
    /// counts as a failure. With a fallback configured the primary gets half of the
    /// remaining budget and the fallback route is resolved only after the primary fails.
    async fn execute(
        &self,
        route: &Route,
        request: &CompletionRequest,
        ctx: &RequestContext,
    ) -> Result<FallbackOutcome<(ModelConfig, CompletionResponse)>> {
        let attempt = if self.fallback_target(&route.model).is_some() {
            ctx.split_deadline()
        } else {
            ctx.clone()
        };

        let primary = async {
            attempt
                .run(route.provider.complete(request, &route.credentials))
                .await
                .map(|response| (route.model.clone(), response))
        };
        let resolve_fallback = move || async move {
            let Some(fallback) = self.fallback_route(&route.model, ctx).await else {
                return None;
            };
            let provider_id = fallback.provider_id();
            let call = async move {
                let result = ctx
                    .run(fallback.provider.complete(request, &fallback.credentials))
                    .await;
                result.map(|response| (fallback.model, response))
            };
            Some((provider_id, call))
        };

        self.breakers
            .execute_with_fallback(&route.provider_id(), primary, resolve_fallback)
            .await
    }

    /// Configured fallback model for `model`, unless it points back at `model`
    fn fallback_target(&self, model: &ModelConfig) -> Option<&String> {
        let target = self
            .fallbacks
            .get(&model.name)
            .or_else(|| self.fallbacks.get(&model.id.to_string()))?;
        if *target == model.name || *target == model.id.to_string() {
            return None;
        }
        Some(target)
    }

    /// Route for the configured fallback of `model`.
    ///
    /// A fallback that cannot be routed is skipped; the request proceeds on the primary alone.
    async fn fallback_route(&self, model: &ModelConfig, ctx: &RequestContext) -> Option<Route> {
        let target = self.fallback_target(model)?;
        match ctx.run(self.router.route(target)).await {
            Ok(route) => Some(route),
            Err(e) => {
                warn!(
                    "Fallback {} for model {} is unavailable: {}",
                    target, model.name, e
                );
                None
            }
        }
    }

    async fn record_failure(
        &self,
        model: &ModelConfig,
        request: &CompletionRequest,
        ctx: &RequestContext,
        started: Instant,
        error: &GatewayError,
    ) {
        if matches!(error, GatewayError::Cancelled(_)) {
            debug!("Request {} cancelled, skipping usage record", ctx.request_id);
            return;
        }

        let status = if error.is_timeout() {
            UsageStatus::Timeout
        } else {
            UsageStatus::Error
        };
        warn!(
            "Request {} for model {} failed: {}",
            ctx.request_id, model.name, error
        );
        self.record(
            model,
            request,
            ctx,
            started,
            status,
            0,
            Some(error.to_string()),
        )
        .await;
    }

    #[allow(clippy::too_many_arguments)]
    async fn record(
        &self,
        model: &ModelConfig,
        request: &CompletionRequest,
        ctx: &RequestContext,
        started: Instant,
        status: UsageStatus,
        tokens: i64,
        error_message: Option<String>,
    ) {
        let mut payload = LogUsagePayload::success(model.id.to_string(), tokens)
            .with_latency_ms(started.elapsed().as_millis() as i64)
            .with_prompt_hash(sha256_hex(&request.prompt_text()))
            .with_caller(ctx.user_id.clone(), ctx.session_id.clone());
        payload.status = status;
        payload.error_message = error_message;

        if let Err(e) = self.ledger.record_usage(payload).await {
            warn!(
                "Failed to record usage for request {}: {}",
                ctx.request_id, e
            );
        }
    }
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("router", &self.router)
            .field("cache", &self.cache)
            .field("breakers", &self.breakers.len())
            .field("fallbacks", &self.fallbacks)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

/// Reject requests that cannot be served before any side effect happens
pub fn validate_request(request: &CompletionRequest) -> Result<()> {
    if request.model_id.trim().is_empty() {
        return Err(GatewayError::bad_request("model id is required"));
    }
    if request.messages.is_empty() {
        return Err(GatewayError::bad_request("at least one message is required"));
    }
    if request.max_tokens == 0 {
        return Err(GatewayError::bad_request("max tokens must be positive"));
    }
    if !request.temperature.is_finite() || request.temperature < 0.0 {
        return Err(GatewayError::bad_request("temperature must be a non-negative number"));
    }
    if request.top_p.is_some_and(|p| !(0.0..=1.0).contains(&p)) {
        return Err(GatewayError::bad_request("top_p must be between 0 and 1"));
    }
    Ok(())
}
