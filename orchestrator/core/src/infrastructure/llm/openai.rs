// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// OpenAI LLM Provider Adapter
//
// Anti-Corruption Layer for the OpenAI chat-completions API
// Also serves OpenAI-compatible APIs (DeepSeek, LM Studio, vLLM, etc.)

use crate::domain::llm::{
    Completion, CompletionOptions, LLMAdapter, LLMError, ModelLimits, ModelSummary,
    ProviderConnection, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::http;

pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEEPSEEK_ENDPOINT: &str = "https://api.deepseek.com/v1";

/// Limits used for chat models the table below does not know.
const FALLBACK_LIMITS: ModelLimits = ModelLimits {
    context_length: 8192,
    max_output_tokens: 4096,
};

/// Known model families, most specific prefix first.
const KNOWN_LIMITS: &[(&str, u32, u32)] = &[
    ("gpt-4o", 128_000, 16_384),
    ("gpt-4.1", 1_047_576, 32_768),
    ("gpt-4-turbo", 128_000, 4_096),
    ("gpt-4", 8_192, 8_192),
    ("gpt-3.5-turbo", 16_385, 4_096),
    ("o1", 200_000, 100_000),
    ("o3", 200_000, 100_000),
    ("o4", 200_000, 100_000),
    ("deepseek-chat", 64_000, 8_192),
    ("deepseek-reasoner", 64_000, 8_192),
];

pub struct OpenAIAdapter {
    client: reqwest::Client,
    adapter_type: &'static str,
    default_endpoint: &'static str,
}

#[derive(Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl OpenAIAdapter {
    pub fn new() -> Self {
        Self::with_defaults("openai", OPENAI_ENDPOINT)
    }

    /// DeepSeek speaks the OpenAI protocol on its own endpoint.
    pub fn deepseek() -> Self {
        Self::with_defaults("deepseek", DEEPSEEK_ENDPOINT)
    }

    fn with_defaults(adapter_type: &'static str, default_endpoint: &'static str) -> Self {
        Self {
            client: reqwest::Client::new(),
            adapter_type,
            default_endpoint,
        }
    }

    fn authorized(
        &self,
        request: reqwest::RequestBuilder,
        connection: &ProviderConnection,
    ) -> reqwest::RequestBuilder {
        if connection.api_key.is_empty() {
            request
        } else {
            request.bearer_auth(connection.api_key.expose_secret())
        }
    }
}

impl Default for OpenAIAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Table lookup by model-family prefix.
pub fn known_limits(model_id: &str) -> ModelLimits {
    let id = model_id.to_ascii_lowercase();
    // "ft:gpt-4o:org::id" style fine-tunes carry the base model after the prefix
    let base = id.strip_prefix("ft:").unwrap_or(&id);
    KNOWN_LIMITS
        .iter()
        .find(|(prefix, _, _)| base.starts_with(prefix))
        .map(|&(_, context_length, max_output_tokens)| ModelLimits {
            context_length,
            max_output_tokens,
        })
        .unwrap_or(FALLBACK_LIMITS)
}

/// Accepts `{"data": [{"id": ..}]}` and bare arrays of ids or objects.
pub(crate) fn parse_model_list(value: &serde_json::Value) -> Result<Vec<ModelSummary>, LLMError> {
    let items = value
        .get("data")
        .and_then(|d| d.as_array())
        .or_else(|| value.as_array())
        .ok_or_else(|| LLMError::Provider("Unexpected model list format".to_string()))?;

    Ok(items
        .iter()
        .filter_map(|item| {
            item.get("id")
                .and_then(|s| s.as_str())
                .or_else(|| item.as_str())
        })
        .map(ModelSummary::new)
        .collect())
}

#[async_trait]
impl LLMAdapter for OpenAIAdapter {
    fn adapter_type(&self) -> &'static str {
        self.adapter_type
    }

    fn default_endpoint(&self) -> &'static str {
        self.default_endpoint
    }

    async fn list_models(
        &self,
        connection: &ProviderConnection,
    ) -> Result<Vec<ModelSummary>, LLMError> {
        let request = self.authorized(self.client.get(connection.url("models")), connection);
        let response = http::send(request, connection.timeout, None).await?;
        let body: serde_json::Value = http::json_body(response, connection.timeout).await?;
        parse_model_list(&body)
    }

    async fn detect_limits(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
    ) -> Result<ModelLimits, LLMError> {
        // The API exposes no limits; confirm the model exists, then use the table
        let models = self.list_models(connection).await?;
        if !models.iter().any(|m| m.id == model_id) {
            return Err(LLMError::ModelNotFound(model_id.to_string()));
        }
        Ok(known_limits(model_id))
    }

    async fn complete(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LLMError> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = options.system_prompt.as_deref() {
            messages.push(OpenAIMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(OpenAIMessage {
            role: "user",
            content: &options.prompt,
        });

        let request = OpenAIRequest {
            model: model_id,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        };

        let builder = self.authorized(
            self.client.post(connection.url("chat/completions")).json(&request),
            connection,
        );
        let response = http::send(builder, connection.timeout, Some(model_id)).await?;
        let body: OpenAIResponse = http::json_body(response, connection.timeout).await?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::Provider("No response from model".into()))?;

        let usage = body
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            usage,
            model_used: body.model.unwrap_or_else(|| model_id.to_string()),
        })
    }
}
