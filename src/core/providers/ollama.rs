//! Ollama chat client for locally hosted models

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sse::LineBuffer;
use super::{check_status, credential_headers, effective_base_url, estimate_tokens, send_error};
use crate::core::models::Credentials;
use crate::core::traits::{LLMProvider, ProviderInfo, StreamCallback};
use crate::core::types::{CompletionRequest, CompletionResponse, StreamChunk, Usage};
use crate::utils::error::{GatewayError, Result};

/// Default local server address
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

const PROVIDER: &str = "ollama";

/// Ollama provider serving one model.
///
/// Local servers usually need no key; a non-empty key is sent as a bearer token.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    name: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    stream: bool,
    options: Options<'a>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Options<'a> {
    temperature: f32,
    num_predict: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    stop: &'a [String],
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

impl OllamaProvider {
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

    fn request_builder(
        &self,
        builder: reqwest::RequestBuilder,
        credentials: &Credentials,
    ) -> reqwest::RequestBuilder {
        let builder = builder.headers(credential_headers(credentials));
        if credentials.api_key.is_empty() {
            builder
        } else {
            builder.bearer_auth(&credentials.api_key)
        }
    }

    async fn send(
        &self,
        request: &CompletionRequest,
        credentials: &Credentials,
        stream: bool,
    ) -> Result<reqwest::Response> {
        let url = format!("{}/api/chat", effective_base_url(credentials, &self.base_url));
        debug!("Sending Ollama request to {} (stream: {})", url, stream);

        let body = ChatRequest {
            model: &self.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            stream,
            options: Options {
                temperature: request.temperature,
                num_predict: request.max_tokens,
                top_p: request.top_p,
                stop: &request.stop_sequences,
            },
        };

        let response = self
            .request_builder(self.client.post(&url), credentials)
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, &e))?;

        check_status(PROVIDER, response).await
    }
}

fn parse_chunk(line: &str) -> Result<Option<ChatChunk>> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let chunk: ChatChunk = serde_json::from_str(line)
        .map_err(|e| GatewayError::provider(format!("ollama: malformed response line: {}", e)))?;
    if let Some(error) = chunk.error {
        return Err(GatewayError::provider(format!("ollama error: {}", error)));
    }
    Ok(Some(chunk))
}

fn usage_from(chunk: &ChatChunk, request: &CompletionRequest, content: &str) -> Usage {
    match (chunk.prompt_eval_count, chunk.eval_count) {
        (None, None) => Usage::new(
            estimate_tokens(&request.prompt_text()),
            estimate_tokens(content),
        ),
        (prompt, completion) => Usage::new(prompt.unwrap_or(0), completion.unwrap_or(0)),
    }
}

#[async_trait]
impl LLMProvider for OllamaProvider {
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
        let text = response
            .text()
            .await
            .map_err(|e| send_error(PROVIDER, &e))?;
        let chunk = parse_chunk(&text)?
            .ok_or_else(|| GatewayError::provider("ollama: empty response body"))?;

        let content = chunk
            .message
            .as_ref()
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let usage = usage_from(&chunk, request, &content);

        Ok(CompletionResponse {
            content,
            usage,
            finish_reason: chunk.done_reason.clone().unwrap_or_else(|| "stop".to_string()),
            model: chunk.model.clone().unwrap_or_else(|| self.model.clone()),
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
        let mut content = String::new();

        let mut handle = |line: &str, content: &mut String| -> Result<Option<ChatChunk>> {
            let Some(chunk) = parse_chunk(line)? else {
                return Ok(None);
            };
            if let Some(message) = &chunk.message {
                if !message.content.is_empty() {
                    content.push_str(&message.content);
                    callback(StreamChunk::text(message.content.clone()))?;
                }
            }
            Ok(chunk.done.then_some(chunk))
        };

        let mut last = None;
        'outer: while let Some(bytes) = stream.next().await {
            let bytes = bytes.map_err(|e| send_error(PROVIDER, &e))?;
            for line in lines.push(&bytes) {
                if let Some(done) = handle(&line, &mut content)? {
                    last = Some(done);
                    break 'outer;
                }
            }
        }
        if last.is_none() {
            if let Some(line) = lines.finish() {
                last = handle(&line, &mut content)?;
            }
        }

        let (usage, finish_reason) = match &last {
            Some(chunk) => (
                usage_from(chunk, request, &content),
                chunk.done_reason.clone().unwrap_or_else(|| "stop".to_string()),
            ),
            None => (
                Usage::new(
                    estimate_tokens(&request.prompt_text()),
                    estimate_tokens(&content),
                ),
                "stop".to_string(),
            ),
        };
        callback(StreamChunk {
            content: String::new(),
            usage: Some(usage),
            finish_reason: Some(finish_reason),
        })
    }

    async fn health_check(&self, credentials: &Credentials) -> Result<()> {
        let url = format!("{}/api/tags", effective_base_url(credentials, &self.base_url));
        let response = self
            .request_builder(self.client.get(&url), credentials)
            .send()
            .await
            .map_err(|e| send_error(PROVIDER, &e))?;
        check_status(PROVIDER, response).await.map(|_| ())
    }
}
