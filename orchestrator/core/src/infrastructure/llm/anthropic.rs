// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// Anthropic LLM Provider Adapter
//
// Anti-Corruption Layer for the Anthropic Messages API

use crate::domain::llm::{
    Completion, CompletionOptions, LLMAdapter, LLMError, ModelLimits, ModelSummary,
    ProviderConnection, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http;

pub const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Sent when the configuration leaves max tokens unset; the API requires one.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic accepts temperatures in [0.0, 1.0] only.
const MAX_TEMPERATURE: f32 = 1.0;

pub struct AnthropicAdapter {
    client: reqwest::Client,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<AnthropicContent>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

#[derive(Deserialize)]
struct AnthropicModelList {
    #[serde(default)]
    data: Vec<AnthropicModelInfo>,
}

#[derive(Deserialize)]
struct AnthropicModelInfo {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl AnthropicAdapter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn with_headers(
        &self,
        request: reqwest::RequestBuilder,
        connection: &ProviderConnection,
    ) -> reqwest::RequestBuilder {
        request
            .header("x-api-key", connection.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
    }
}

impl Default for AnthropicAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// The models endpoint reports no limits; they follow the model family.
pub fn known_limits(model_id: &str) -> ModelLimits {
    let id = model_id.to_ascii_lowercase();
    let max_output_tokens = if id.contains("opus-4") {
        32_000
    } else if id.contains("sonnet-4") || id.contains("3-7-sonnet") {
        64_000
    } else if id.contains("3-5") {
        8_192
    } else {
        4_096
    };
    ModelLimits {
        context_length: 200_000,
        max_output_tokens,
    }
}

#[async_trait]
impl LLMAdapter for AnthropicAdapter {
    fn adapter_type(&self) -> &'static str {
        "anthropic"
    }

    fn default_endpoint(&self) -> &'static str {
        ANTHROPIC_ENDPOINT
    }

    async fn list_models(
        &self,
        connection: &ProviderConnection,
    ) -> Result<Vec<ModelSummary>, LLMError> {
        let request = self.with_headers(self.client.get(connection.url("models")), connection);
        let response = http::send(request, connection.timeout, None).await?;
        let body: AnthropicModelList = http::json_body(response, connection.timeout).await?;

        Ok(body
            .data
            .into_iter()
            .map(|m| ModelSummary {
                id: m.id,
                display_name: m.display_name,
                context_length: None,
            })
            .collect())
    }

    async fn detect_limits(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
    ) -> Result<ModelLimits, LLMError> {
        let path = format!("models/{}", model_id);
        let request = self.with_headers(self.client.get(connection.url(&path)), connection);
        // 404 here means the id is unknown to the provider
        let response = http::send(request, connection.timeout, Some(model_id)).await?;
        let info: AnthropicModelInfo = http::json_body(response, connection.timeout).await?;
        Ok(known_limits(&info.id))
    }

    async fn complete(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LLMError> {
        let request = AnthropicRequest {
            model: model_id,
            messages: vec![AnthropicMessage {
                role: "user",
                content: &options.prompt,
            }],
            max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: options.temperature.clamp(0.0, MAX_TEMPERATURE),
            system: options.system_prompt.as_deref(),
        };

        let builder = self.with_headers(
            self.client.post(connection.url("messages")).json(&request),
            connection,
        );
        let response = http::send(builder, connection.timeout, Some(model_id)).await?;
        let body: AnthropicResponse = http::json_body(response, connection.timeout).await?;

        let content = body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        let usage = body
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.input_tokens,
                completion_tokens: u.output_tokens,
            })
            .unwrap_or_default();

        Ok(Completion {
            content,
            usage,
            model_used: body.model.unwrap_or_else(|| model_id.to_string()),
        })
    }
}
