// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the four catalog aggregates. The entity store is
//! an external collaborator; these traits are the whole of what the engine
//! needs from it.
//!
//! | Alias | Aggregate | Single default |
//! |-------|-----------|----------------|
//! | `ProviderRepository` | `Provider` | no |
//! | `ModelRepository` | `Model` | yes |
//! | `ConfigurationRepository` | `Configuration` | yes |
//! | `TaskRepository` | `Task` | no |
//!
//! ## Store guarantees
//!
//! - Soft-deleted rows are invisible to every finder.
//! - `list_all` returns rows in insertion order.
//! - `insert` rejects a duplicate identifier with [`RepositoryError::Conflict`].
//! - `modify`, `toggle_active` and `set_default` are atomic read-modify-write
//!   operations per aggregate type: concurrent callers never observe two
//!   defaults, and an edit never writes back flags it did not change.

use async_trait::async_trait;
use std::sync::Arc;

use super::configuration::Configuration;
use super::error::EntityKind;
use super::identifier::Uid;
use super::model::Model;
use super::provider::Provider;
use super::task::Task;

/// Common shape of every catalog record.
pub trait CatalogEntity: Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn uid(&self) -> Option<Uid>;
    fn assign_uid(&mut self, uid: Uid);
    fn identifier(&self) -> &str;
    fn set_identifier(&mut self, identifier: String);
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
    fn is_deleted(&self) -> bool;
    fn mark_deleted(&mut self);
}

/// Records that participate in the single-default invariant.
pub trait Defaultable: CatalogEntity {
    fn is_default(&self) -> bool;
    fn set_default_flag(&mut self, is_default: bool);
}

/// In-place edit applied by [`CatalogRepository::modify`]
pub type Mutation<T> = Box<dyn FnOnce(&mut T) + Send>;

/// Repository interface shared by all catalog aggregates
#[async_trait]
pub trait CatalogRepository<T: CatalogEntity>: Send + Sync {
    /// Insert a new record, assigning its uid
    async fn insert(&self, entity: T) -> Result<T, RepositoryError>;

    /// Apply `change` to the stored record under the write guard and return
    /// the result. Fields the change leaves alone keep their stored values; a
    /// change that collides with another live identifier writes nothing.
    async fn modify(&self, uid: Uid, change: Mutation<T>) -> Result<T, RepositoryError>;

    /// Find record by uid
    async fn find_by_uid(&self, uid: Uid) -> Result<Option<T>, RepositoryError>;

    /// Find record by its unique identifier
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<T>, RepositoryError>;

    /// List every live record in insertion order
    async fn list_all(&self) -> Result<Vec<T>, RepositoryError>;

    /// True when no live record other than `exclude` uses `identifier`
    async fn is_identifier_unique(
        &self,
        identifier: &str,
        exclude: Option<Uid>,
    ) -> Result<bool, RepositoryError>;

    /// Flip `is_active`, returning the new state
    async fn toggle_active(&self, uid: Uid) -> Result<bool, RepositoryError>;

    /// Hide the record from all finders
    async fn soft_delete(&self, uid: Uid) -> Result<(), RepositoryError>;
}

/// Extension for aggregates with a singleton default
#[async_trait]
pub trait DefaultRepository<T: Defaultable>: CatalogRepository<T> {
    /// Clear the flag on every other row and set it on `uid`, as one unit
    async fn set_default(&self, uid: Uid) -> Result<(), RepositoryError>;

    /// Clear the flag on every row
    async fn clear_default(&self) -> Result<(), RepositoryError>;

    /// The current default, if any
    async fn find_default(&self) -> Result<Option<T>, RepositoryError>;
}

pub type ProviderRepository = dyn CatalogRepository<Provider>;
pub type ModelRepository = dyn DefaultRepository<Model>;
pub type ConfigurationRepository = dyn DefaultRepository<Configuration>;
pub type TaskRepository = dyn CatalogRepository<Task>;

/// Handles to the four repositories, shared by the application services.
#[derive(Clone)]
pub struct Catalog {
    pub providers: Arc<ProviderRepository>,
    pub models: Arc<ModelRepository>,
    pub configurations: Arc<ConfigurationRepository>,
    pub tasks: Arc<TaskRepository>,
}

/// Repository errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

macro_rules! impl_catalog_entity {
    ($ty:ty, $kind:expr) => {
        impl CatalogEntity for $ty {
            const KIND: EntityKind = $kind;

            fn uid(&self) -> Option<Uid> {
                self.uid
            }

            fn assign_uid(&mut self, uid: Uid) {
                self.uid = Some(uid);
            }

            fn identifier(&self) -> &str {
                &self.identifier
            }

            fn set_identifier(&mut self, identifier: String) {
                self.identifier = identifier;
            }

            fn is_active(&self) -> bool {
                self.is_active
            }

            fn set_active(&mut self, active: bool) {
                self.is_active = active;
            }

            fn is_deleted(&self) -> bool {
                self.deleted
            }

            fn mark_deleted(&mut self) {
                self.deleted = true;
            }
        }
    };
}

impl_catalog_entity!(Provider, EntityKind::Provider);
impl_catalog_entity!(Model, EntityKind::Model);
impl_catalog_entity!(Configuration, EntityKind::Configuration);
impl_catalog_entity!(Task, EntityKind::Task);

impl Defaultable for Model {
    fn is_default(&self) -> bool {
        self.is_default
    }

    fn set_default_flag(&mut self, is_default: bool) {
        self.is_default = is_default;
    }
}

impl Defaultable for Configuration {
    fn is_default(&self) -> bool {
        self.is_default
    }

    fn set_default_flag(&mut self, is_default: bool) {
        self.is_default = is_default;
    }
}
