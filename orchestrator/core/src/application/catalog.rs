// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Catalog Service
//!
//! Mutation boundary for providers, models, configurations and tasks.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Enforce catalog invariants at the point of mutation
//!
//! # Invariants
//!
//! - Identifiers are non-empty and unique per aggregate type; renames check
//!   uniqueness excluding the record's own row.
//! - Zero or one default Model and zero or one default Configuration; the
//!   store performs clear-then-set atomically.
//! - Configurations are validated before they are saved.
//! - System tasks are read-only.
//! - Deactivating a provider never touches its models.
//! - Edits are applied in place under the store's write guard and touch only
//!   the fields they own; active and default flags change only through the
//!   toggle and set-default operations.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::provider_selector::find_highest_priority;
use crate::domain::config::CatalogSeed;
use crate::domain::configuration::Configuration;
use crate::domain::error::{EngineError, EntityKind};
use crate::domain::identifier::Uid;
use crate::domain::model::Model;
use crate::domain::provider::{ApiKeySecret, Provider};
use crate::domain::repository::{Catalog, CatalogEntity, CatalogRepository, Mutation, RepositoryError};
use crate::domain::task::Task;
use crate::infrastructure::llm::AdapterRegistry;

/// Result of a toggle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub success: bool,
    pub is_active: bool,
}

/// Result of a set-default operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultResponse {
    pub success: bool,
}

/// Number of records created by [`CatalogService::seed`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub providers: usize,
    pub models: usize,
    pub configurations: usize,
    pub tasks: usize,
}

const SYSTEM_TASK_READ_ONLY: &str = "System tasks cannot be modified";

pub struct CatalogService {
    catalog: Catalog,
    registry: Arc<AdapterRegistry>,
}

async fn fetch<T, R>(repo: &R, uid: Uid) -> Result<T, EngineError>
where
    T: CatalogEntity,
    R: CatalogRepository<T> + ?Sized,
{
    repo.find_by_uid(uid)
        .await?
        .ok_or_else(|| EngineError::not_found(T::KIND, uid))
}

async fn ensure_unique<T, R>(repo: &R, identifier: &str, exclude: Option<Uid>) -> Result<(), EngineError>
where
    T: CatalogEntity,
    R: CatalogRepository<T> + ?Sized,
{
    if identifier.trim().is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{} identifier cannot be empty",
            T::KIND
        )));
    }
    if !repo.is_identifier_unique(identifier, exclude).await? {
        return Err(EngineError::InvalidInput(format!(
            "{} identifier '{}' is already in use",
            T::KIND,
            identifier
        )));
    }
    Ok(())
}

async fn modify<T, R>(repo: &R, uid: Uid, change: Mutation<T>) -> Result<T, EngineError>
where
    T: CatalogEntity,
    R: CatalogRepository<T> + ?Sized,
{
    match repo.modify(uid, change).await {
        Err(RepositoryError::NotFound(_)) => Err(EngineError::not_found(T::KIND, uid)),
        result => Ok(result?),
    }
}

async fn toggle<T, R>(repo: &R, uid: Uid) -> Result<ToggleResponse, EngineError>
where
    T: CatalogEntity,
    R: CatalogRepository<T> + ?Sized,
{
    // NotFound is reported as such, not as a storage failure
    fetch::<T, R>(repo, uid).await?;
    let is_active = repo.toggle_active(uid).await?;
    info!(entity = %T::KIND, %uid, is_active, "Toggled active state");
    Ok(ToggleResponse {
        success: true,
        is_active,
    })
}

impl CatalogService {
    pub fn new(catalog: Catalog, registry: Arc<AdapterRegistry>) -> Self {
        Self { catalog, registry }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // ------------------------------------------------------------------
    // Providers
    // ------------------------------------------------------------------

    pub async fn create_provider(&self, provider: Provider) -> Result<Provider, EngineError> {
        self.registry.resolve(&provider.adapter_type)?;
        ensure_unique::<Provider, _>(&*self.catalog.providers, &provider.identifier, None).await?;
        let created = self.catalog.providers.insert(provider).await?;
        info!(provider = %created.identifier, adapter_type = %created.adapter_type, "Created provider");
        Ok(created)
    }

    pub async fn update_provider(&self, provider: Provider) -> Result<(), EngineError> {
        let uid = provider.uid.ok_or(EngineError::MissingIdentifier("provider UID"))?;
        self.get_provider(uid).await?;
        self.registry.resolve(&provider.adapter_type)?;
        ensure_unique::<Provider, _>(&*self.catalog.providers, &provider.identifier, Some(uid)).await?;
        modify::<Provider, _>(
            &*self.catalog.providers,
            uid,
            Box::new(move |stored: &mut Provider| {
                stored.identifier = provider.identifier;
                stored.name = provider.name;
                stored.description = provider.description;
                stored.adapter_type = provider.adapter_type;
                stored.endpoint_url = provider.endpoint_url;
                stored.api_key = provider.api_key;
                stored.timeout_seconds = provider.timeout_seconds;
                stored.priority = provider.priority;
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn get_provider(&self, uid: Uid) -> Result<Provider, EngineError> {
        fetch(&*self.catalog.providers, uid).await
    }

    pub async fn list_providers(&self) -> Result<Vec<Provider>, EngineError> {
        Ok(self.catalog.providers.list_all().await?)
    }

    pub async fn rename_provider(&self, uid: Uid, identifier: &str) -> Result<(), EngineError> {
        self.get_provider(uid).await?;
        ensure_unique::<Provider, _>(&*self.catalog.providers, identifier, Some(uid)).await?;
        let identifier = identifier.to_string();
        modify::<Provider, _>(
            &*self.catalog.providers,
            uid,
            Box::new(move |stored: &mut Provider| stored.identifier = identifier),
        )
        .await?;
        Ok(())
    }

    pub async fn toggle_provider(&self, uid: Uid) -> Result<ToggleResponse, EngineError> {
        toggle::<Provider, _>(&*self.catalog.providers, uid).await
    }

    pub async fn delete_provider(&self, uid: Uid) -> Result<(), EngineError> {
        self.get_provider(uid).await?;
        self.catalog.providers.soft_delete(uid).await?;
        info!(%uid, "Deleted provider");
        Ok(())
    }

    /// Highest-priority active provider, if any
    pub async fn primary_provider(&self) -> Result<Option<Provider>, EngineError> {
        let providers = self.catalog.providers.list_all().await?;
        Ok(find_highest_priority(&providers).cloned())
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    pub async fn create_model(&self, model: Model) -> Result<Model, EngineError> {
        self.get_provider(model.provider_uid).await?;
        ensure_unique::<Model, _>(&*self.catalog.models, &model.identifier, None).await?;
        let is_default = model.is_default;
        let mut created = self.catalog.models.insert(Model { is_default: false, ..model }).await?;
        if is_default {
            if let Some(uid) = created.uid {
                self.catalog.models.set_default(uid).await?;
                created.is_default = true;
            }
        }
        debug!(model = %created.identifier, "Created model");
        Ok(created)
    }

    pub async fn update_model(&self, model: Model) -> Result<(), EngineError> {
        let uid = model.uid.ok_or(EngineError::MissingIdentifier("model UID"))?;
        self.get_model(uid).await?;
        self.get_provider(model.provider_uid).await?;
        ensure_unique::<Model, _>(&*self.catalog.models, &model.identifier, Some(uid)).await?;
        modify::<Model, _>(
            &*self.catalog.models,
            uid,
            Box::new(move |stored: &mut Model| {
                stored.identifier = model.identifier;
                stored.name = model.name;
                stored.description = model.description;
                stored.provider_uid = model.provider_uid;
                stored.model_id = model.model_id;
                stored.context_length = model.context_length;
                stored.max_output_tokens = model.max_output_tokens;
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn get_model(&self, uid: Uid) -> Result<Model, EngineError> {
        fetch(&*self.catalog.models, uid).await
    }

    pub async fn list_models(&self) -> Result<Vec<Model>, EngineError> {
        Ok(self.catalog.models.list_all().await?)
    }

    pub async fn rename_model(&self, uid: Uid, identifier: &str) -> Result<(), EngineError> {
        self.get_model(uid).await?;
        ensure_unique::<Model, _>(&*self.catalog.models, identifier, Some(uid)).await?;
        let identifier = identifier.to_string();
        modify::<Model, _>(
            &*self.catalog.models,
            uid,
            Box::new(move |stored: &mut Model| stored.identifier = identifier),
        )
        .await?;
        Ok(())
    }

    /// Store detected context and output limits, leaving every other field alone.
    pub async fn set_model_limits(
        &self,
        uid: Uid,
        context_length: u32,
        max_output_tokens: u32,
    ) -> Result<Model, EngineError> {
        let model = modify::<Model, _>(
            &*self.catalog.models,
            uid,
            Box::new(move |stored: &mut Model| {
                stored.context_length = context_length;
                stored.max_output_tokens = max_output_tokens;
            }),
        )
        .await?;
        debug!(%uid, context_length, max_output_tokens, "Stored model limits");
        Ok(model)
    }

    pub async fn toggle_model(&self, uid: Uid) -> Result<ToggleResponse, EngineError> {
        toggle::<Model, _>(&*self.catalog.models, uid).await
    }

    pub async fn set_default_model(&self, uid: Uid) -> Result<DefaultResponse, EngineError> {
        self.get_model(uid).await?;
        self.catalog.models.set_default(uid).await?;
        info!(%uid, "Set default model");
        Ok(DefaultResponse { success: true })
    }

    pub async fn clear_default_model(&self) -> Result<DefaultResponse, EngineError> {
        self.catalog.models.clear_default().await?;
        Ok(DefaultResponse { success: true })
    }

    pub async fn delete_model(&self, uid: Uid) -> Result<(), EngineError> {
        self.get_model(uid).await?;
        self.catalog.models.soft_delete(uid).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Configurations
    // ------------------------------------------------------------------

    pub async fn create_configuration(
        &self,
        configuration: Configuration,
    ) -> Result<Configuration, EngineError> {
        configuration.validate()?;
        if let Some(model_uid) = configuration.model_uid {
            self.get_model(model_uid).await?;
        }
        ensure_unique::<Configuration, _>(&*self.catalog.configurations, &configuration.identifier, None).await?;

        let is_default = configuration.is_default;
        let mut created = self
            .catalog
            .configurations
            .insert(Configuration {
                is_default: false,
                ..configuration
            })
            .await?;
        if is_default {
            if let Some(uid) = created.uid {
                self.catalog.configurations.set_default(uid).await?;
                created.is_default = true;
            }
        }
        debug!(configuration = %created.identifier, "Created configuration");
        Ok(created)
    }

    pub async fn update_configuration(&self, configuration: Configuration) -> Result<(), EngineError> {
        let uid = configuration
            .uid
            .ok_or(EngineError::MissingIdentifier("configuration UID"))?;
        self.get_configuration(uid).await?;
        configuration.validate()?;
        if let Some(model_uid) = configuration.model_uid {
            self.get_model(model_uid).await?;
        }
        ensure_unique::<Configuration, _>(&*self.catalog.configurations, &configuration.identifier, Some(uid)).await?;
        modify::<Configuration, _>(
            &*self.catalog.configurations,
            uid,
            Box::new(move |stored: &mut Configuration| {
                stored.identifier = configuration.identifier;
                stored.name = configuration.name;
                stored.description = configuration.description;
                stored.model_uid = configuration.model_uid;
                stored.temperature = configuration.temperature;
                stored.max_tokens = configuration.max_tokens;
                stored.system_prompt = configuration.system_prompt;
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn get_configuration(&self, uid: Uid) -> Result<Configuration, EngineError> {
        fetch(&*self.catalog.configurations, uid).await
    }

    pub async fn list_configurations(&self) -> Result<Vec<Configuration>, EngineError> {
        Ok(self.catalog.configurations.list_all().await?)
    }

    pub async fn rename_configuration(&self, uid: Uid, identifier: &str) -> Result<(), EngineError> {
        self.get_configuration(uid).await?;
        ensure_unique::<Configuration, _>(&*self.catalog.configurations, identifier, Some(uid)).await?;
        let identifier = identifier.to_string();
        modify::<Configuration, _>(
            &*self.catalog.configurations,
            uid,
            Box::new(move |stored: &mut Configuration| stored.identifier = identifier),
        )
        .await?;
        Ok(())
    }

    pub async fn toggle_configuration(&self, uid: Uid) -> Result<ToggleResponse, EngineError> {
        toggle::<Configuration, _>(&*self.catalog.configurations, uid).await
    }

    pub async fn set_default_configuration(&self, uid: Uid) -> Result<DefaultResponse, EngineError> {
        self.get_configuration(uid).await?;
        self.catalog.configurations.set_default(uid).await?;
        info!(%uid, "Set default configuration");
        Ok(DefaultResponse { success: true })
    }

    pub async fn clear_default_configuration(&self) -> Result<DefaultResponse, EngineError> {
        self.catalog.configurations.clear_default().await?;
        Ok(DefaultResponse { success: true })
    }

    pub async fn delete_configuration(&self, uid: Uid) -> Result<(), EngineError> {
        self.get_configuration(uid).await?;
        self.catalog.configurations.soft_delete(uid).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Tasks
    // ------------------------------------------------------------------

    pub async fn create_task(&self, task: Task) -> Result<Task, EngineError> {
        if let Some(configuration_uid) = task.configuration_uid {
            self.get_configuration(configuration_uid).await?;
        }
        ensure_unique::<Task, _>(&*self.catalog.tasks, &task.identifier, None).await?;
        let created = self.catalog.tasks.insert(task).await?;
        debug!(task = %created.identifier, "Created task");
        Ok(created)
    }

    pub async fn update_task(&self, task: Task) -> Result<(), EngineError> {
        let uid = task.uid.ok_or(EngineError::MissingIdentifier("task UID"))?;
        let existing = self.get_task(uid).await?;
        if existing.is_system {
            return Err(EngineError::NotConfigured(SYSTEM_TASK_READ_ONLY.to_string()));
        }
        if let Some(configuration_uid) = task.configuration_uid {
            self.get_configuration(configuration_uid).await?;
        }
        ensure_unique::<Task, _>(&*self.catalog.tasks, &task.identifier, Some(uid)).await?;
        modify::<Task, _>(
            &*self.catalog.tasks,
            uid,
            Box::new(move |stored: &mut Task| {
                stored.identifier = task.identifier;
                stored.name = task.name;
                stored.description = task.description;
                stored.prompt_template = task.prompt_template;
                stored.input_type = task.input_type;
                stored.input_source = task.input_source;
                stored.output_format = task.output_format;
                stored.configuration_uid = task.configuration_uid;
            }),
        )
        .await?;
        Ok(())
    }

    pub async fn get_task(&self, uid: Uid) -> Result<Task, EngineError> {
        fetch(&*self.catalog.tasks, uid).await
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, EngineError> {
        Ok(self.catalog.tasks.list_all().await?)
    }

    pub async fn rename_task(&self, uid: Uid, identifier: &str) -> Result<(), EngineError> {
        let task = self.get_task(uid).await?;
        if task.is_system {
            return Err(EngineError::NotConfigured(SYSTEM_TASK_READ_ONLY.to_string()));
        }
        ensure_unique::<Task, _>(&*self.catalog.tasks, identifier, Some(uid)).await?;
        let identifier = identifier.to_string();
        modify::<Task, _>(
            &*self.catalog.tasks,
            uid,
            Box::new(move |stored: &mut Task| stored.identifier = identifier),
        )
        .await?;
        Ok(())
    }

    pub async fn toggle_task(&self, uid: Uid) -> Result<ToggleResponse, EngineError> {
        toggle::<Task, _>(&*self.catalog.tasks, uid).await
    }

    pub async fn delete_task(&self, uid: Uid) -> Result<(), EngineError> {
        let task = self.get_task(uid).await?;
        if task.is_system {
            return Err(EngineError::NotConfigured(SYSTEM_TASK_READ_ONLY.to_string()));
        }
        self.catalog.tasks.soft_delete(uid).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Seeding
    // ------------------------------------------------------------------

    /// Load a manifest catalog seed. References between seed records are by
    /// identifier and are resolved to uids here.
    pub async fn seed(&self, seed: &CatalogSeed) -> anyhow::Result<SeedSummary> {
        let mut summary = SeedSummary::default();
        let mut provider_uids: HashMap<&str, Uid> = HashMap::new();
        let mut model_uids: HashMap<&str, Uid> = HashMap::new();
        let mut configuration_uids: HashMap<&str, Uid> = HashMap::new();

        for entry in &seed.providers {
            let mut provider = Provider::new(&entry.identifier, &entry.name, &entry.adapter_type)
                .with_endpoint(entry.endpoint.clone())
                .with_api_key(ApiKeySecret::new(entry.api_key.clone().unwrap_or_default()))
                .with_priority(entry.priority)
                .with_timeout_seconds(entry.timeout_seconds);
            provider.description = entry.description.clone();
            provider.is_active = entry.enabled;

            let created = self
                .create_provider(provider)
                .await
                .with_context(|| format!("Failed to seed provider '{}'", entry.identifier))?;
            provider_uids.insert(&entry.identifier, stored_uid(created.uid, EntityKind::Provider)?);
            summary.providers += 1;
        }

        for entry in &seed.models {
            let provider_uid = *provider_uids.get(entry.provider.as_str()).with_context(|| {
                format!(
                    "Model '{}' references unknown provider '{}'",
                    entry.identifier, entry.provider
                )
            })?;

            let mut model = Model::new(&entry.identifier, provider_uid, &entry.model_id)
                .with_limits(entry.context_length, entry.max_output_tokens);
            if let Some(name) = &entry.name {
                model.name = name.clone();
            }
            model.is_active = entry.enabled;
            model.is_default = entry.default;

            let created = self
                .create_model(model)
                .await
                .with_context(|| format!("Failed to seed model '{}'", entry.identifier))?;
            model_uids.insert(&entry.identifier, stored_uid(created.uid, EntityKind::Model)?);
            summary.models += 1;
        }

        for entry in &seed.configurations {
            let mut configuration = Configuration::new(&entry.identifier, &entry.name);
            if let Some(model) = &entry.model {
                let model_uid = *model_uids.get(model.as_str()).with_context(|| {
                    format!(
                        "Configuration '{}' references unknown model '{}'",
                        entry.identifier, model
                    )
                })?;
                configuration = configuration.with_model(model_uid);
            }
            configuration.temperature = entry.temperature;
            configuration.max_tokens = entry.max_tokens;
            configuration.system_prompt = entry.system_prompt.clone();
            configuration.is_active = entry.enabled;
            configuration.is_default = entry.default;

            let created = self
                .create_configuration(configuration)
                .await
                .with_context(|| format!("Failed to seed configuration '{}'", entry.identifier))?;
            configuration_uids.insert(
                &entry.identifier,
                stored_uid(created.uid, EntityKind::Configuration)?,
            );
            summary.configurations += 1;
        }

        for entry in &seed.tasks {
            let mut task = Task::new(&entry.identifier, &entry.name, &entry.prompt_template)
                .with_input(entry.input_type, entry.input_source.clone());
            if let Some(configuration) = &entry.configuration {
                let configuration_uid = *configuration_uids
                    .get(configuration.as_str())
                    .with_context(|| {
                        format!(
                            "Task '{}' references unknown configuration '{}'",
                            entry.identifier, configuration
                        )
                    })?;
                task = task.with_configuration(configuration_uid);
            }
            task.description = entry.description.clone();
            task.output_format = entry.output_format;
            task.is_active = entry.enabled;
            task.is_system = entry.system;

            self.create_task(task)
                .await
                .with_context(|| format!("Failed to seed task '{}'", entry.identifier))?;
            summary.tasks += 1;
        }

        info!(
            providers = summary.providers,
            models = summary.models,
            configurations = summary.configurations,
            tasks = summary.tasks,
            "Seeded catalog"
        );
        Ok(summary)
    }
}

fn stored_uid(uid: Option<Uid>, entity: EntityKind) -> anyhow::Result<Uid> {
    uid.with_context(|| format!("Store returned a {} without uid", entity))
}
