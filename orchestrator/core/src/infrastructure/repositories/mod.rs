// Copyright (c) 2026 Switchboard Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Repository Implementations
//!
//! In-memory implementations of the catalog repository contracts defined in
//! the domain layer.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Hold catalog aggregates for a single process
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)
//!
//! Each store owns one `parking_lot::RwLock`; every mutation (including the
//! clear-then-set of `set_default`) happens under a single write guard, so
//! mutations are atomic per aggregate type. Uids are handed out from a
//! monotonically increasing counter and rows are kept in a `BTreeMap`, so
//! iteration order is insertion order.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::repository::{
    Catalog, CatalogEntity, CatalogRepository, DefaultRepository, Defaultable, Mutation,
    RepositoryError,
};
use crate::domain::identifier::Uid;

struct Rows<T> {
    rows: BTreeMap<Uid, T>,
    next_uid: u64,
}

/// Thread-safe BTreeMap-backed storage for one aggregate type
pub struct InMemoryCatalogRepository<T> {
    inner: Arc<RwLock<Rows<T>>>,
}

impl<T> Clone for InMemoryCatalogRepository<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for InMemoryCatalogRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> InMemoryCatalogRepository<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Rows {
                rows: BTreeMap::new(),
                next_uid: 1,
            })),
        }
    }
}

fn live<T: CatalogEntity>(rows: &BTreeMap<Uid, T>) -> impl Iterator<Item = &T> {
    rows.values().filter(|row| !row.is_deleted())
}

fn not_found<T: CatalogEntity>(uid: Uid) -> RepositoryError {
    RepositoryError::NotFound(format!("{} {}", T::KIND, uid))
}

#[async_trait]
impl<T: CatalogEntity> CatalogRepository<T> for InMemoryCatalogRepository<T> {
    async fn insert(&self, mut entity: T) -> Result<T, RepositoryError> {
        let mut guard = self.inner.write();

        if live(&guard.rows).any(|row| row.identifier() == entity.identifier()) {
            return Err(RepositoryError::Conflict(format!(
                "{} identifier '{}' is already in use",
                T::KIND,
                entity.identifier()
            )));
        }

        let uid = Uid::new(guard.next_uid)
            .ok_or_else(|| RepositoryError::Database("uid counter exhausted".to_string()))?;
        guard.next_uid += 1;

        entity.assign_uid(uid);
        guard.rows.insert(uid, entity.clone());
        Ok(entity)
    }

    async fn modify(&self, uid: Uid, change: Mutation<T>) -> Result<T, RepositoryError> {
        let mut guard = self.inner.write();

        let mut updated = match guard.rows.get(&uid) {
            Some(row) if !row.is_deleted() => row.clone(),
            _ => return Err(not_found::<T>(uid)),
        };
        change(&mut updated);
        updated.assign_uid(uid);

        if live(&guard.rows).any(|row| row.uid() != Some(uid) && row.identifier() == updated.identifier()) {
            return Err(RepositoryError::Conflict(format!(
                "{} identifier '{}' is already in use",
                T::KIND,
                updated.identifier()
            )));
        }

        guard.rows.insert(uid, updated.clone());
        Ok(updated)
    }

    async fn find_by_uid(&self, uid: Uid) -> Result<Option<T>, RepositoryError> {
        let guard = self.inner.read();
        let found = guard.rows.get(&uid).filter(|row| !row.is_deleted()).cloned();
        Ok(found)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<T>, RepositoryError> {
        let guard = self.inner.read();
        let found = live(&guard.rows).find(|row| row.identifier() == identifier).cloned();
        Ok(found)
    }

    async fn list_all(&self) -> Result<Vec<T>, RepositoryError> {
        let guard = self.inner.read();
        let rows: Vec<T> = live(&guard.rows).cloned().collect();
        Ok(rows)
    }

    async fn is_identifier_unique(
        &self,
        identifier: &str,
        exclude: Option<Uid>,
    ) -> Result<bool, RepositoryError> {
        let guard = self.inner.read();
        let taken = live(&guard.rows).any(|row| row.identifier() == identifier && row.uid() != exclude);
        Ok(!taken)
    }

    async fn toggle_active(&self, uid: Uid) -> Result<bool, RepositoryError> {
        let mut guard = self.inner.write();
        match guard.rows.get_mut(&uid) {
            Some(row) if !row.is_deleted() => {
                let active = !row.is_active();
                row.set_active(active);
                Ok(active)
            }
            _ => Err(not_found::<T>(uid)),
        }
    }

    async fn soft_delete(&self, uid: Uid) -> Result<(), RepositoryError> {
        let mut guard = self.inner.write();
        match guard.rows.get_mut(&uid) {
            Some(row) if !row.is_deleted() => {
                row.mark_deleted();
                Ok(())
            }
            _ => Err(not_found::<T>(uid)),
        }
    }
}

#[async_trait]
impl<T: Defaultable> DefaultRepository<T> for InMemoryCatalogRepository<T> {
    async fn set_default(&self, uid: Uid) -> Result<(), RepositoryError> {
        let mut guard = self.inner.write();

        let exists = guard.rows.get(&uid).is_some_and(|row| !row.is_deleted());
        if !exists {
            return Err(not_found::<T>(uid));
        }

        for (row_uid, row) in guard.rows.iter_mut() {
            row.set_default_flag(*row_uid == uid);
        }
        Ok(())
    }

    async fn clear_default(&self) -> Result<(), RepositoryError> {
        let mut guard = self.inner.write();
        for row in guard.rows.values_mut() {
            row.set_default_flag(false);
        }
        Ok(())
    }

    async fn find_default(&self) -> Result<Option<T>, RepositoryError> {
        let guard = self.inner.read();
        let found = live(&guard.rows).find(|row| row.is_default()).cloned();
        Ok(found)
    }
}

/// Fresh, empty catalog backed by in-memory stores.
pub fn in_memory_catalog() -> Catalog {
    Catalog {
        providers: Arc::new(InMemoryCatalogRepository::new()),
        models: Arc::new(InMemoryCatalogRepository::new()),
        configurations: Arc::new(InMemoryCatalogRepository::new()),
        tasks: Arc::new(InMemoryCatalogRepository::new()),
    }
}
