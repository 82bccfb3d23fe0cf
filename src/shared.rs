//! Thread-shared access to a manager.
//!
//! Lookups take the read lock and may run concurrently. Mutations, bulk
//! loading and reset take the write lock, so a reader never observes a
//! half-reloaded registry.

use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::base::{RepositoryError, Result};
use crate::manager::ModelManager;
use crate::model::{Item, Model};
use crate::qualifier::Qualifier;

/// A cloneable handle to one manager behind a reader/writer lock.
#[derive(Debug)]
pub struct SharedRepository<M> {
    inner: Arc<RwLock<M>>,
}

impl<M> Clone for SharedRepository<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: ModelManager> SharedRepository<M> {
    pub fn new(manager: M) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, M> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, M> {
        self.inner.write()
    }

    /// Read guard narrowed to one model.
    pub fn model(&self, qualifier: &Qualifier) -> Result<MappedRwLockReadGuard<'_, Model>> {
        let guard = self.inner.read();
        guard.get_model(qualifier, true)?;
        RwLockReadGuard::try_map(guard, |manager| {
            manager.get_model(qualifier, false).ok().flatten()
        })
        .map_err(|_| RepositoryError::not_found("model", qualifier.to_string()))
    }

    /// Read guard narrowed to one item.
    pub fn item(&self, qualifier: &Qualifier) -> Result<MappedRwLockReadGuard<'_, Item>> {
        let guard = self.inner.read();
        guard.get_item(qualifier, true)?;
        RwLockReadGuard::try_map(guard, |manager| {
            manager.get_item(qualifier, false).ok().flatten()
        })
        .map_err(|_| RepositoryError::not_found("item", qualifier.to_string()))
    }

    pub fn read_models(&self) -> Result<()> {
        self.inner.write().read_models()
    }

    pub fn request_reset(&self) -> Result<()> {
        self.inner.write().request_reset()
    }

    pub fn into_inner(self) -> std::result::Result<M, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}
