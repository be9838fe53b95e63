// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// Google Gemini LLM Provider Adapter
//
// Anti-Corruption Layer for the Gemini generateContent API
// The API key travels in the x-goog-api-key header so it never appears in a URL.

use crate::domain::llm::{
    Completion, CompletionOptions, LLMAdapter, LLMError, ModelLimits, ModelSummary,
    ProviderConnection, TokenUsage,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::http;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiAdapter {
    client: reqwest::Client,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModelInfo {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    input_token_limit: Option<u32>,
    #[serde(default)]
    output_token_limit: Option<u32>,
}

#[derive(Deserialize)]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModelInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

impl GeminiAdapter {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    fn get(&self, connection: &ProviderConnection, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", normalize_gemini_base(&connection.endpoint), path);
        self.client
            .get(url)
            .header("x-goog-api-key", connection.api_key.expose_secret())
    }
}

impl Default for GeminiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// Append `/v1beta` unless the endpoint already names an API version.
pub(crate) fn normalize_gemini_base(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.ends_with("/v1")
        || trimmed.ends_with("/v1beta")
        || trimmed.contains("/v1/")
        || trimmed.contains("/v1beta/")
    {
        trimmed.to_string()
    } else {
        format!("{}/v1beta", trimmed)
    }
}

/// Listing names come back as "models/gemini-1.5-pro"; the id is the suffix.
fn strip_models_prefix(name: &str) -> &str {
    name.strip_prefix("models/").unwrap_or(name)
}

fn extract_gemini_content(value: &Value) -> String {
    value
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|candidates| candidates.first())
        .and_then(|first| first.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

#[async_trait]
impl LLMAdapter for GeminiAdapter {
    fn adapter_type(&self) -> &'static str {
        "gemini"
    }

    fn default_endpoint(&self) -> &'static str {
        GEMINI_ENDPOINT
    }

    async fn list_models(
        &self,
        connection: &ProviderConnection,
    ) -> Result<Vec<ModelSummary>, LLMError> {
        let response = http::send(self.get(connection, "models"), connection.timeout, None).await?;
        let list: GeminiModelList = http::json_body(response, connection.timeout).await?;

        Ok(list
            .models
            .into_iter()
            .map(|m| ModelSummary {
                id: strip_models_prefix(&m.name).to_string(),
                display_name: m.display_name,
                context_length: m.input_token_limit,
            })
            .collect())
    }

    async fn detect_limits(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
    ) -> Result<ModelLimits, LLMError> {
        let id = strip_models_prefix(model_id);
        let path = format!("models/{}", id);
        let response = http::send(self.get(connection, &path), connection.timeout, Some(model_id)).await?;
        let info: GeminiModelInfo = http::json_body(response, connection.timeout).await?;

        Ok(ModelLimits {
            context_length: info.input_token_limit.unwrap_or(0),
            max_output_tokens: info.output_token_limit.unwrap_or(0),
        })
    }

    async fn complete(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LLMError> {
        let id = strip_models_prefix(model_id);
        let url = format!(
            "{}/models/{}:generateContent",
            normalize_gemini_base(&connection.endpoint),
            id
        );

        let mut generation_config = json!({ "temperature": options.temperature });
        if let Some(max_tokens) = options.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens);
        }

        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": options.prompt }] }],
            "generationConfig": generation_config,
        });
        if let Some(system) = options.system_prompt.as_deref() {
            body["system_instruction"] = json!({ "parts": [{ "text": system }] });
        }

        let request = self
            .client
            .post(url)
            .header("x-goog-api-key", connection.api_key.expose_secret())
            .json(&body);
        let response = http::send(request, connection.timeout, Some(model_id)).await?;
        let value: Value = http::json_body(response, connection.timeout).await?;

        let usage = value
            .get("usageMetadata")
            .cloned()
            .and_then(|u| serde_json::from_value::<GeminiUsage>(u).ok())
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        let model_used = value
            .get("modelVersion")
            .and_then(|m| m.as_str())
            .unwrap_or(id)
            .to_string();

        Ok(Completion {
            content: extract_gemini_content(&value),
            usage,
            model_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::ApiKeySecret;
    use mockito::Matcher;
    use std::time::Duration;

    fn connection(url: &str) -> ProviderConnection {
        ProviderConnection::new(url, ApiKeySecret::new("g-key"), Duration::from_secs(5))
    }

    #[test]
    fn test_normalize_base() {
        assert_eq!(
            normalize_gemini_base("https://generativelanguage.googleapis.com"),
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert_eq!(
            normalize_gemini_base("https://generativelanguage.googleapis.com/v1/"),
            "https://generativelanguage.googleapis.com/v1"
        );
    }

    #[tokio::test]
    async fn test_complete_uses_header_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1beta/models/gemini-1.5-flash:generateContent")
            .match_header("x-goog-api-key", "g-key")
            .match_query(Matcher::Missing)
            .match_body(Matcher::PartialJson(json!({
                "system_instruction": {"parts": [{"text": "Reply in French."}]},
                "generationConfig": {"maxOutputTokens": 32}
            })))
            .with_status(200)
            .with_body(
                json!({
                    "candidates": [{"content": {"parts": [{"text": "Bonjour"}], "role": "model"}}],
                    "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 2, "totalTokenCount": 9},
                    "modelVersion": "gemini-1.5-flash-002"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let mut options = CompletionOptions::new("Hello");
        options.system_prompt = Some("Reply in French.".to_string());
        options.max_tokens = Some(32);

        let completion = GeminiAdapter::new()
            .complete(&connection(&server.url()), "models/gemini-1.5-flash", &options)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(completion.content, "Bonjour");
        assert_eq!(completion.model_used, "gemini-1.5-flash-002");
        assert_eq!(completion.usage.total(), 9);
    }

    #[tokio::test]
    async fn test_list_and_limits() {
        let mut server = mockito::Server::new_async().await;
        let _list = server
            .mock("GET", "/v1beta/models")
            .with_status(200)
            .with_body(
                r#"{"models":[{"name":"models/gemini-1.5-pro","displayName":"Gemini 1.5 Pro","inputTokenLimit":2097152,"outputTokenLimit":8192}]}"#,
            )
            .create_async()
            .await;
        let _one = server
            .mock("GET", "/v1beta/models/gemini-1.5-pro")
            .with_status(200)
            .with_body(r#"{"name":"models/gemini-1.5-pro","inputTokenLimit":2097152,"outputTokenLimit":8192}"#)
            .create_async()
            .await;

        let adapter = GeminiAdapter::new();
        let conn = connection(&server.url());

        let models = adapter.list_models(&conn).await.unwrap();
        assert_eq!(models[0].id, "gemini-1.5-pro");
        assert_eq!(models[0].context_length, Some(2_097_152));

        let limits = adapter.detect_limits(&conn, "gemini-1.5-pro").await.unwrap();
        assert_eq!(limits.max_output_tokens, 8192);
    }
}
