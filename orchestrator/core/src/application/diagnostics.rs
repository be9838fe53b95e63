// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Provider Diagnostics
//!
//! Operator-facing probes against configured providers: connection test,
//! model discovery (optionally importing what was found) and model limit
//! detection.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Inspect providers without running a task

use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::catalog::CatalogService;
use crate::application::dispatch::AdapterDispatcher;
use crate::domain::error::EngineError;
use crate::domain::identifier::Uid;
use crate::domain::llm::{ConnectionTestResult, ModelLimits, ModelSummary};
use crate::domain::model::Model;

/// Outcome of a model listing, with the number of catalog records created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDiscovery {
    pub models: Vec<ModelSummary>,
    pub imported: usize,
}

pub struct ProviderDiagnostics {
    catalog: Arc<CatalogService>,
    dispatcher: AdapterDispatcher,
}

/// `gpt-4o-2024-08-06` → `gpt-4o-2024-08-06`, `models/Gemini 1.5` → `models-gemini-1-5`
fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

impl ProviderDiagnostics {
    pub fn new(catalog: Arc<CatalogService>, dispatcher: AdapterDispatcher) -> Self {
        Self {
            catalog,
            dispatcher,
        }
    }

    /// Probe a provider. Remote failures land in the result with `ok = false`;
    /// only catalog and configuration problems are errors.
    pub async fn test_connection(&self, provider_uid: Uid) -> Result<ConnectionTestResult, EngineError> {
        let provider = self.catalog.get_provider(provider_uid).await?;
        let (adapter, connection) = self.dispatcher.connect(&provider)?;

        let result = adapter.test_connection(&connection).await;
        if result.ok {
            info!(provider = %provider.identifier, models = result.models.len(), "Provider connection test succeeded");
        } else {
            warn!(provider = %provider.identifier, message = %result.message, "Provider connection test failed");
        }
        Ok(result)
    }

    /// List the provider's models. With `import`, each model not yet in the
    /// catalog for this provider is created inactive.
    pub async fn discover_models(&self, provider_uid: Uid, import: bool) -> Result<ModelDiscovery, EngineError> {
        let provider = self.catalog.get_provider(provider_uid).await?;
        let (adapter, connection) = self.dispatcher.connect(&provider)?;
        let models = adapter.list_models(&connection).await?;

        let mut imported = 0;
        if import {
            let existing: Vec<Model> = self
                .catalog
                .list_models()
                .await?
                .into_iter()
                .filter(|m| m.provider_uid == provider_uid)
                .collect();

            for summary in &models {
                if existing.iter().any(|m| m.model_id == summary.id) {
                    continue;
                }

                let identifier = format!("{}-{}", provider.identifier, slug(&summary.id));
                let mut model = Model::new(identifier, provider_uid, summary.id.clone());
                if let Some(name) = &summary.display_name {
                    model.name = name.clone();
                }
                model.context_length = summary.context_length.unwrap_or(0);
                model.is_active = false;

                match self.catalog.create_model(model).await {
                    Ok(_) => imported += 1,
                    // identifier taken by an unrelated model; leave it to the operator
                    Err(EngineError::InvalidInput(reason)) => {
                        warn!(provider = %provider.identifier, model_id = %summary.id, %reason, "Skipped model import");
                    }
                    Err(other) => return Err(other),
                }
            }
            info!(provider = %provider.identifier, found = models.len(), imported, "Imported provider models");
        }

        Ok(ModelDiscovery { models, imported })
    }

    /// Ask the provider for a model's limits; with `persist` the limits are
    /// stored on the model record.
    pub async fn detect_limits(&self, model_uid: Uid, persist: bool) -> Result<ModelLimits, EngineError> {
        let model = self.catalog.get_model(model_uid).await?;
        let provider = match self.catalog.get_provider(model.provider_uid).await {
            Ok(provider) => provider,
            Err(EngineError::NotFound { .. }) => {
                return Err(EngineError::NotConfigured("Model has no provider".to_string()))
            }
            Err(other) => return Err(other),
        };

        let (adapter, connection) = self.dispatcher.connect(&provider)?;
        let limits = adapter.detect_limits(&connection, &model.model_id).await?;

        if persist {
            // only the limit fields; flags may have changed during the call
            self.catalog
                .set_model_limits(model_uid, limits.context_length, limits.max_output_tokens)
                .await?;
        }
        Ok(limits)
    }
}
