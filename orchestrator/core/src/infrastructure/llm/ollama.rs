// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// Ollama LLM Provider Adapter
//
// Anti-Corruption Layer for Ollama local models
// Supports air-gapped deployments with local LLMs

use crate::domain::llm::{
    Completion, CompletionOptions, LLMAdapter, LLMError, ModelLimits, ModelSummary,
    ProviderConnection, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::http;

pub const OLLAMA_ENDPOINT: &str = "http://localhost:11434";

/// Ollama's context window when the model metadata does not state one.
const DEFAULT_CONTEXT_LENGTH: u32 = 2048;

pub struct OllamaAdapter {
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaMessage<'a>>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    message: Option<OllamaResponseMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaTag>,
}

#[derive(Deserialize)]
struct OllamaTag {
    name: String,
}

#[derive(Serialize)]
struct OllamaShowRequest<'a> {
    model: &'a str,
}

impl OllamaAdapter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OllamaAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Find `<architecture>.context_length` in a `/api/show` response.
fn context_length_from_show(show: &Value) -> u32 {
    show.get("model_info")
        .and_then(|info| info.as_object())
        .and_then(|info| {
            info.iter()
                .find(|(key, _)| key.ends_with(".context_length"))
                .and_then(|(_, value)| value.as_u64())
        })
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(DEFAULT_CONTEXT_LENGTH)
}

#[async_trait]
impl LLMAdapter for OllamaAdapter {
    fn adapter_type(&self) -> &'static str {
        "ollama"
    }

    fn default_endpoint(&self) -> &'static str {
        OLLAMA_ENDPOINT
    }

    async fn list_models(
        &self,
        connection: &ProviderConnection,
    ) -> Result<Vec<ModelSummary>, LLMError> {
        let request = self.client.get(connection.url("api/tags"));
        let response = http::send(request, connection.timeout, None).await?;
        let tags: OllamaTags = http::json_body(response, connection.timeout).await?;
        Ok(tags.models.into_iter().map(|t| ModelSummary::new(t.name)).collect())
    }

    async fn detect_limits(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
    ) -> Result<ModelLimits, LLMError> {
        let request = self
            .client
            .post(connection.url("api/show"))
            .json(&OllamaShowRequest { model: model_id });
        let response = http::send(request, connection.timeout, Some(model_id)).await?;
        let show: Value = http::json_body(response, connection.timeout).await?;

        let context_length = context_length_from_show(&show);
        // Ollama generates until the context is full unless num_predict is set
        Ok(ModelLimits {
            context_length,
            max_output_tokens: context_length,
        })
    }

    async fn complete(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LLMError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system_prompt.as_deref() {
            messages.push(OllamaMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(OllamaMessage {
            role: "user",
            content: &options.prompt,
        });

        let request = OllamaChatRequest {
            model: model_id,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                num_predict: options.max_tokens,
            },
        };

        let builder = self.client.post(connection.url("api/chat")).json(&request);
        let response = http::send(builder, connection.timeout, Some(model_id)).await?;
        let body: OllamaChatResponse = http::json_body(response, connection.timeout).await?;

        Ok(Completion {
            content: body.message.map(|m| m.content).unwrap_or_default(),
            usage: TokenUsage {
                prompt_tokens: body.prompt_eval_count.unwrap_or(0),
                completion_tokens: body.eval_count.unwrap_or(0),
            },
            model_used: body.model.unwrap_or_else(|| model_id.to_string()),
        })
    }
}
