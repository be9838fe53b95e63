// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Llm
//!
//! Capability contract every provider family implements.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Anti-corruption boundary between the engine and vendor APIs

// Implementations live in infrastructure/llm/. The engine never talks HTTP
// itself; it resolves an adapter by type key and hands it a ProviderConnection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::ApiKeySecret;

/// Everything an adapter needs to reach one configured provider.
#[derive(Debug, Clone)]
pub struct ProviderConnection {
    /// Base URL with any trailing slash removed
    pub endpoint: String,

    /// Decrypted key; empty for unauthenticated local providers
    pub api_key: ApiKeySecret,

    /// Upper bound for every request made on this connection
    pub timeout: Duration,
}

impl ProviderConnection {
    pub fn new(endpoint: impl Into<String>, api_key: ApiKeySecret, timeout: Duration) -> Self {
        let endpoint = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            timeout,
        }
    }

    /// Join a path onto the endpoint.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path.trim_start_matches('/'))
    }
}

/// Domain interface for a provider family (OpenAI, Anthropic, Ollama, ...)
#[async_trait]
pub trait LLMAdapter: Send + Sync {
    /// Canonical registry key of this adapter
    fn adapter_type(&self) -> &'static str;

    /// Endpoint used when a provider record leaves `endpoint_url` empty
    fn default_endpoint(&self) -> &'static str;

    /// Probe the provider. Remote failures are reported in the result, never
    /// as an error.
    async fn test_connection(&self, connection: &ProviderConnection) -> ConnectionTestResult {
        match self.list_models(connection).await {
            Ok(models) => ConnectionTestResult {
                ok: true,
                message: format!("Connection successful ({} models available)", models.len()),
                models,
            },
            Err(err) => ConnectionTestResult {
                ok: false,
                message: err.user_message(),
                models: Vec::new(),
            },
        }
    }

    /// Models the provider offers. An empty list is a valid answer.
    async fn list_models(&self, connection: &ProviderConnection)
        -> Result<Vec<ModelSummary>, LLMError>;

    /// Context window and output limit of one model.
    /// Returns [`LLMError::ModelNotFound`] when the provider does not know the id.
    async fn detect_limits(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
    ) -> Result<ModelLimits, LLMError>;

    /// Single-turn chat completion
    async fn complete(
        &self,
        connection: &ProviderConnection,
        model_id: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, LLMError>;
}

/// Options for one completion call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionOptions {
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Maximum tokens to generate; `None` lets the adapter pick its default
    pub max_tokens: Option<u32>,

    /// System instruction, omitted from the request when `None`
    pub system_prompt: Option<String>,

    /// Final rendered user prompt
    pub prompt: String,
}

impl CompletionOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            temperature: 0.7,
            max_tokens: None,
            system_prompt: None,
            prompt: prompt.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Generated text
    pub content: String,

    pub usage: TokenUsage,

    /// Model reported by the provider (may differ from the requested alias)
    pub model_used: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// One entry of a provider's model listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    /// Provider-native model identifier
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Context window, when the listing reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u32>,
}

impl ModelSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            context_length: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLimits {
    pub context_length: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub ok: bool,
    pub message: String,
    pub models: Vec<ModelSummary>,
}

/// Errors that can occur during LLM operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl LLMError {
    /// Message safe to show to an operator.
    pub fn user_message(&self) -> String {
        match self {
            LLMError::Network(detail) => format!("Could not reach provider: {}", detail),
            LLMError::Timeout(after) => {
                format!("Provider did not respond within {} seconds", after.as_secs())
            }
            LLMError::Authentication(_) => {
                "Authentication with the provider failed; check the API key".to_string()
            }
            LLMError::RateLimit => "Provider rate limit exceeded; retry later".to_string(),
            LLMError::ModelNotFound(model) => {
                format!("Model '{}' is not available at the provider", model)
            }
            LLMError::Provider(detail) => format!("Provider returned an error: {}", detail),
            LLMError::InvalidInput(detail) => format!("Invalid request: {}", detail),
        }
    }
}
