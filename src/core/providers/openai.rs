//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sse::{LineBuffer, sse_data};
use super::{
    check_status, credential_headers, effective_base_url, estimate_tokens, secret_header,
    send_error,
};
use crate::core::models::Credentials;
use crate::core::traits::{LLMProvider, ProviderInfo, StreamCallback};
use crate::core::types::{CompletionRequest, CompletionResponse, StreamChunk, Usage};
use crate::utils::error::{GatewayError, Result};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const PROVIDER: &str = "openai";

/// OpenAI provider serving one model. Also works against compatible servers.
#[derive(Debug, Clone)]
pub struct OpenAIProvider {
    client: Client,
    name: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream_options: Option<StreamOptions>,
}

#[derive(Debug, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceContent>,
    #[serde(default)]
    delta: Option<ChoiceContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceContent {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl OpenAIProvider {
    pub fn new(client: Client, name: &str, base_url: &str, model: &str) -> Self {
        let base_url = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        Self {
            client,
            name: name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn headers(&self, credentials: &Credentials) -> Result<HeaderMap> {
        let mut headers = credential_headers(credentials);
        headers.insert(
            AUTHORIZATION,
            secret_header(&format!("Bearer {}", credentials.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest, stream: bool) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
            stop: &request.stop_sequences,
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let url = format!(
            "{}/chat/completions",
            effective_base_url(credentials, &self.base_url)
        );
        debug!("Sending OpenAI request to {} (stream: {})", url, stream);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(credentials)?)
            .json(&self.build_body(request, stream))
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, &e))?;

        check_status(PROVIDER, response).await
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: self.name.clone(),
            provider_type: PROVIDER.to_string(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
        }
    }

    async fn complete(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
    ) -> Result<CompletionResponse> {
        let response = self.send(request, credentials, false).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::provider(format!("openai: invalid response body: {}", e)))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::provider("openai: response has no choices"))?;
        let content = choice
            .message
            .and_then(|m| m.content)
            .unwrap_or_default();

        let usage = match body.usage {
            Some(u) => Usage::new(u.prompt_tokens, u.completion_tokens),
            None => Usage::new(
                estimate_tokens(&request.prompt_text()),
                estimate_tokens(&content),
            ),
        };

        Ok(CompletionResponse {
            content,
            usage,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            model: body.model.unwrap_or_else(|| self.model.clone()),
        })
    }

    async fn stream_complete(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
        callback: StreamCallback<'_>,
    ) -> Result<()> {
        let response = self.send(request, credentials, true).await?;
        let mut stream = response.bytes_stream();
        let mut lines = LineBuffer::new();
        let mut state = StreamState::default();

        'outer: while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| send_error(PROVIDER, &e))?;
            for line in lines.push(&chunk) {
                if state.handle_line(&line, callback)? {
                    break 'outer;
                }
            }
        }
        if let Some(line) = lines.finish() {
            state.handle_line(&line, callback)?;
        }

        state.finish(request, callback)
    }

    async fn health_check(&self, credentials: &Credentials) -> Result<()> {
        let url = format!("{}/models", effective_base_url(credentials, &self.base_url));
        let response = self
            .client
            .get(&url)
            .headers(self.headers(credentials)?)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, &e))?;
        check_status(PROVIDER, response).await.map(|_| ())
    }
}

#[derive(Debug, Default)]
struct StreamState {
    content: String,
    usage: Option<WireUsage>,
    finish_reason: Option<String>,
}

impl StreamState {
    /// Handle one line; returns true on the `[DONE]` sentinel
    fn handle_line(&mut self, line: &str, callback: StreamCallback<'_>) -> Result<bool> {
        let Some(data) = sse_data(line) else {
            return Ok(false);
        };
        if data.trim() == "[DONE]" {
            return Ok(true);
        }

        let event: ChatResponse = serde_json::from_str(data)
            .map_err(|e| GatewayError::provider(format!("openai: malformed stream event: {}", e)))?;
        if let Some(usage) = event.usage {
            self.usage = Some(usage);
        }
        for choice in event.choices {
            if let Some(reason) = choice.finish_reason {
                self.finish_reason = Some(reason);
            }
            if let Some(text) = choice.delta.and_then(|d| d.content) {
                if !text.is_empty() {
                    self.content.push_str(&text);
                    callback(StreamChunk::text(text))?;
                }
            }
        }
        Ok(false)
    }

    fn finish(self, request: &CompletionRequest, callback: StreamCallback<'_>) -> Result<()> {
        let usage = match self.usage {
            Some(u) => Usage::new(u.prompt_tokens, u.completion_tokens),
            None => Usage::new(
                estimate_tokens(&request.prompt_text()),
                estimate_tokens(&self.content),
            ),
        };
        callback(StreamChunk {
            content: String::new(),
            usage: Some(usage),
            finish_reason: Some(self.finish_reason.unwrap_or_else(|| "stop".to_string())),
        })
    }
}
