// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

// Adapter dispatch
//
// Turns a Provider record into an adapter instance plus a ready-to-use
// connection: adapter type resolved through the registry, endpoint defaulted,
// API key decrypted through the credential store, timeout normalized.

use std::sync::Arc;

use crate::domain::error::EngineError;
use crate::domain::llm::{LLMAdapter, ProviderConnection};
use crate::domain::provider::{CredentialStore, Provider, DEFAULT_TIMEOUT_SECONDS};
use crate::infrastructure::llm::AdapterRegistry;

#[derive(Clone)]
pub struct AdapterDispatcher {
    registry: Arc<AdapterRegistry>,
    credentials: Arc<dyn CredentialStore>,
    default_timeout_seconds: u64,
}

impl AdapterDispatcher {
    pub fn new(registry: Arc<AdapterRegistry>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            registry,
            credentials,
            default_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// Timeout used for providers configured with a non-positive value.
    pub fn with_default_timeout(mut self, seconds: u64) -> Self {
        self.default_timeout_seconds = seconds.max(1);
        self
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn connect(
        &self,
        provider: &Provider,
    ) -> Result<(Arc<dyn LLMAdapter>, ProviderConnection), EngineError> {
        let adapter = self.registry.resolve(&provider.adapter_type)?;

        let endpoint = match provider.endpoint_url.trim() {
            "" => adapter.default_endpoint(),
            configured => configured,
        };
        let api_key = self.credentials.decrypt(&provider.api_key)?;
        let timeout = provider.effective_timeout(self.default_timeout_seconds);

        Ok((adapter, ProviderConnection::new(endpoint, api_key, timeout)))
    }
}
