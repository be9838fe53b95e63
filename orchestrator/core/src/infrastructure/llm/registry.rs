// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// LLM Adapter Registry - Adapter Type Resolution
//
// Maps adapter-type keys stored on provider records to adapter instances.
// Lookup fails closed: an unknown key is a configuration error, never a
// silent fallback to some other adapter.

use crate::domain::error::EngineError;
use crate::domain::llm::LLMAdapter;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::anthropic::AnthropicAdapter;
use super::gemini::GeminiAdapter;
use super::ollama::OllamaAdapter;
use super::openai::OpenAIAdapter;

/// Registry for resolving adapter types to adapter instances
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn LLMAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry; see [`AdapterRegistry::with_builtin_adapters`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every adapter shipped with Switchboard
    pub fn with_builtin_adapters() -> Self {
        let mut registry = Self::new();

        let openai: Arc<dyn LLMAdapter> = Arc::new(OpenAIAdapter::new());
        let anthropic: Arc<dyn LLMAdapter> = Arc::new(AnthropicAdapter::new());
        let gemini: Arc<dyn LLMAdapter> = Arc::new(GeminiAdapter::new());

        registry.register("openai", Arc::clone(&openai));
        // OpenAI-compatible APIs (LM Studio, vLLM, etc.)
        registry.register("openai-compatible", openai);
        registry.register("deepseek", Arc::new(OpenAIAdapter::deepseek()));
        registry.register("anthropic", Arc::clone(&anthropic));
        registry.register("claude", anthropic);
        registry.register("ollama", Arc::new(OllamaAdapter::new()));
        registry.register("gemini", Arc::clone(&gemini));
        registry.register("google", gemini);

        info!(
            adapter_types = ?registry.known_types(),
            "Initialized LLM adapter registry"
        );
        registry
    }

    /// Register (or replace) the adapter for `adapter_type`.
    pub fn register(&mut self, adapter_type: &str, adapter: Arc<dyn LLMAdapter>) {
        let key = normalize_key(adapter_type);
        debug!(adapter_type = %key, "Registering LLM adapter");
        self.adapters.insert(key, adapter);
    }

    /// Resolve an adapter type; case-insensitive on the trimmed key.
    pub fn resolve(&self, adapter_type: &str) -> Result<Arc<dyn LLMAdapter>, EngineError> {
        let key = normalize_key(adapter_type);
        self.adapters
            .get(&key)
            .cloned()
            .ok_or_else(|| EngineError::AdapterUnknown(adapter_type.trim().to_string()))
    }

    pub fn is_known(&self, adapter_type: &str) -> bool {
        self.adapters.contains_key(&normalize_key(adapter_type))
    }

    /// Registered keys, sorted
    pub fn known_types(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.adapters.keys().cloned().collect();
        keys.sort();
        keys
    }
}

fn normalize_key(adapter_type: &str) -> String {
    adapter_type.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorKind;

    #[test]
    fn test_builtin_keys() {
        let registry = AdapterRegistry::with_builtin_adapters();
        let expected = [
            ("openai", "https://api.openai.com/v1"),
            ("openai-compatible", "https://api.openai.com/v1"),
            ("deepseek", "https://api.deepseek.com/v1"),
            ("anthropic", "https://api.anthropic.com/v1"),
            ("claude", "https://api.anthropic.com/v1"),
            ("ollama", "http://localhost:11434"),
            ("gemini", "https://generativelanguage.googleapis.com/v1beta"),
            ("google", "https://generativelanguage.googleapis.com/v1beta"),
        ];
        for (key, endpoint) in expected {
            let adapter = registry.resolve(key).unwrap();
            assert_eq!(adapter.default_endpoint(), endpoint, "key {}", key);
        }
        assert_eq!(registry.known_types().len(), expected.len());
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = AdapterRegistry::with_builtin_adapters();
        assert_eq!(registry.resolve("  OpenAI ").unwrap().adapter_type(), "openai");
        assert!(registry.is_known("Claude"));
    }

    #[test]
    fn test_unknown_type_fails_closed() {
        let registry = AdapterRegistry::with_builtin_adapters();
        let err = registry.resolve("mistral").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotConfigured);
        assert_eq!(err.to_string(), "Unknown adapter type 'mistral'");

        assert!(AdapterRegistry::new().resolve("openai").is_err());
    }

    #[test]
    fn test_register_custom_adapter() {
        let mut registry = AdapterRegistry::new();
        registry.register("LocalAI", Arc::new(OpenAIAdapter::new()));
        assert!(registry.resolve("localai").is_ok());
    }
}
