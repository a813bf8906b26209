//! Anthropic Messages API client

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::sse::{LineBuffer, sse_data};
use super::{
    check_status, credential_headers, effective_base_url, estimate_tokens, secret_header,
    send_error,
};
use crate::core::models::Credentials;
use crate::core::traits::{LLMProvider, ProviderInfo, StreamCallback};
use crate::core::types::{
    CompletionRequest, CompletionResponse, MessageRole, StreamChunk, Usage,
};
use crate::utils::error::{GatewayError, Result};

/// API version sent with every request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

const PROVIDER: &str = "anthropic";

/// Anthropic provider serving one model
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: Client,
    name: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop_sequences: &'a [String],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl AnthropicProvider {
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
        headers.insert("x-api-key", secret_header(&credentials.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest, stream: bool) -> MessagesRequest<'a> {
        let messages = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| WireMessage {
                role: match m.role {
                    MessageRole::Assistant => "assistant",
                    _ => "user",
                },
                content: &m.content,
            })
            .collect();

        MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            messages,
            system: request.system_prompt(),
            temperature: request.temperature,
            top_p: request.top_p,
            stop_sequences: &request.stop_sequences,
            stream,
        }
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/messages", effective_base_url(credentials, &self.base_url));
        debug!("Sending Anthropic request to {} (stream: {})", url, stream);

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
impl LLMProvider for AnthropicProvider {
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
        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::provider(format!("anthropic: invalid response body: {}", e)))?;

        let content: String = body
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        let usage = match body.usage {
            Some(u) if u.input_tokens > 0 || u.output_tokens > 0 => {
                Usage::new(u.input_tokens, u.output_tokens)
            }
            _ => Usage::new(
                estimate_tokens(&request.prompt_text()),
                estimate_tokens(&content),
            ),
        };

        Ok(CompletionResponse {
            content,
            usage,
            finish_reason: body.stop_reason.unwrap_or_else(|| "end_turn".to_string()),
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

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| send_error(PROVIDER, &e))?;
            for line in lines.push(&chunk) {
                if state.handle_line(&line, callback)? {
                    return state.finish(request, callback);
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

/// Accumulated state of one Anthropic event stream
#[derive(Debug, Default)]
struct StreamState {
    input_tokens: u32,
    output_tokens: u32,
    content: String,
    stop_reason: Option<String>,
}

impl StreamState {
    /// Handle one line; returns true on `message_stop`
    fn handle_line(&mut self, line: &str, callback: StreamCallback<'_>) -> Result<bool> {
        let Some(data) = sse_data(line) else {
            return Ok(false);
        };
        let event: Value = serde_json::from_str(data)
            .map_err(|e| GatewayError::provider(format!("anthropic: malformed stream event: {}", e)))?;

        match event["type"].as_str().unwrap_or_default() {
            "message_start" => {
                if let Some(tokens) = event["message"]["usage"]["input_tokens"].as_u64() {
                    self.input_tokens = tokens as u32;
                }
            }
            "content_block_delta" => {
                if event["delta"]["type"] == "text_delta" {
                    if let Some(text) = event["delta"]["text"].as_str() {
                        self.content.push_str(text);
                        callback(StreamChunk::text(text))?;
                    }
                }
            }
            "message_delta" => {
                if let Some(tokens) = event["usage"]["output_tokens"].as_u64() {
                    self.output_tokens = tokens as u32;
                }
                if let Some(reason) = event["delta"]["stop_reason"].as_str() {
                    self.stop_reason = Some(reason.to_string());
                }
            }
            "message_stop" => return Ok(true),
            "error" => {
                let message = event["error"]["message"].as_str().unwrap_or("unknown error");
                return Err(GatewayError::provider(format!("anthropic stream error: {}", message)));
            }
            _ => {}
        }
        Ok(false)
    }

    fn finish(self, request: &CompletionRequest, callback: StreamCallback<'_>) -> Result<()> {
        let usage = if self.input_tokens > 0 || self.output_tokens > 0 {
            Usage::new(self.input_tokens, self.output_tokens)
        } else {
            Usage::new(
                estimate_tokens(&request.prompt_text()),
                estimate_tokens(&self.content),
            )
        };
        callback(StreamChunk {
            content: String::new(),
            usage: Some(usage),
            finish_reason: Some(self.stop_reason.unwrap_or_else(|| "end_turn".to_string())),
        })
    }
}
