// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Runtime
//!
//! Composition root: wires the adapter registry, credential store, in-memory
//! catalog, input sources and application services from one
//! [`SwitchboardConfig`].
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Build a ready-to-serve engine for the CLI and the daemon

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::application::catalog::{CatalogService, SeedSummary};
use crate::application::diagnostics::ProviderDiagnostics;
use crate::application::dispatch::AdapterDispatcher;
use crate::application::execution::StandardTaskExecutionService;
use crate::application::input_resolution::InputResolver;
use crate::domain::config::SwitchboardConfig;
use crate::infrastructure::credentials::EnvCredentialStore;
use crate::infrastructure::input_sources::{FileLogSource, InMemoryRecordSource};
use crate::infrastructure::llm::AdapterRegistry;
use crate::infrastructure::repositories::in_memory_catalog;
use crate::presentation::api::{self, AppState};

pub struct SwitchboardRuntime {
    pub config: SwitchboardConfig,
    pub registry: Arc<AdapterRegistry>,
    pub catalog: Arc<CatalogService>,
    pub execution: Arc<StandardTaskExecutionService>,
    pub diagnostics: Arc<ProviderDiagnostics>,
    pub seeded: SeedSummary,
}

/// Structural validation plus a check that every provider type has an adapter.
pub fn validate_config(config: &SwitchboardConfig, registry: &AdapterRegistry) -> Result<()> {
    config.validate()?;
    for adapter_type in config.adapter_types() {
        if !registry.is_known(&adapter_type) {
            anyhow::bail!(
                "Unknown adapter type '{}'. Known types: {}",
                adapter_type,
                registry.known_types().join(", ")
            );
        }
    }
    Ok(())
}

impl SwitchboardRuntime {
    pub async fn from_config(config: SwitchboardConfig) -> Result<Self> {
        Self::with_registry(config, AdapterRegistry::with_builtin_adapters()).await
    }

    /// Same as [`Self::from_config`] with a caller-supplied registry.
    pub async fn with_registry(config: SwitchboardConfig, registry: AdapterRegistry) -> Result<Self> {
        validate_config(&config, &registry).context("Configuration validation failed")?;

        let registry = Arc::new(registry);
        let catalog = in_memory_catalog();
        let catalog_service = Arc::new(CatalogService::new(catalog.clone(), registry.clone()));

        let seeded = catalog_service
            .seed(&config.spec.catalog)
            .await
            .context("Failed to seed catalog")?;

        let engine = &config.spec.engine;
        let dispatcher = AdapterDispatcher::new(registry.clone(), Arc::new(EnvCredentialStore::new()))
            .with_default_timeout(engine.default_timeout_seconds);

        let logs = &config.spec.logs;
        let inputs = InputResolver::new(
            Arc::new(InMemoryRecordSource::new(config.spec.records.clone())),
            Arc::new(FileLogSource::new(
                logs.syslog_path.clone(),
                logs.deprecation_log_path.clone(),
            )),
        )
        .with_record_limits(engine.records_default_limit, engine.records_max_limit);

        let execution = Arc::new(StandardTaskExecutionService::new(
            catalog,
            dispatcher.clone(),
            inputs,
        ));
        let diagnostics = Arc::new(ProviderDiagnostics::new(catalog_service.clone(), dispatcher));

        info!(
            providers = seeded.providers,
            models = seeded.models,
            configurations = seeded.configurations,
            tasks = seeded.tasks,
            "Switchboard runtime ready"
        );

        Ok(Self {
            config,
            registry,
            catalog: catalog_service,
            execution,
            diagnostics,
            seeded,
        })
    }

    pub fn router(&self) -> Router {
        api::app(AppState {
            execution: self.execution.clone(),
            catalog: self.catalog.clone(),
            diagnostics: self.diagnostics.clone(),
        })
    }
}
