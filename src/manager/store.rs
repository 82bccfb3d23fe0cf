//! Persistence hooks implemented by each backend.

use super::filter::ModelFilter;
use crate::base::{MessageContainer, Result};
use crate::model::{Item, Model};

/// Result of a bulk load: the models read plus per-file diagnostics.
#[derive(Debug, Default)]
pub struct StoreLoad {
    pub models: Vec<Model>,
    pub messages: MessageContainer,
}

/// A concrete persistence strategy.
///
/// The registration base ([`RepositoryManager`](super::RepositoryManager))
/// owns the in-memory tables and calls these hooks for the storage side of
/// every mutation. Read-only stores reject the six mutating hooks with
/// `RepositoryError::UnsupportedOperation`.
pub trait ModelStore: Send + Sync {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    fn is_read_only(&self) -> bool {
        false
    }

    /// Read every model accepted by `filter`. Unreadable files become
    /// messages; only a failure to read the store as a whole is an error.
    fn load_models(&self, filter: &ModelFilter) -> Result<StoreLoad>;

    /// Persist a new model with all of its items. The store may assign the
    /// model's storage location.
    fn add_model_to_store(&mut self, model: &mut Model) -> Result<()>;

    /// Rewrite the descriptor of an existing model.
    fn save_model_to_store(&mut self, model: &Model) -> Result<()>;

    fn remove_model_from_store(&mut self, model: &Model) -> Result<()>;

    fn add_item_to_store(&mut self, model: &Model, item: &Item) -> Result<()>;

    fn save_item_to_store(&mut self, model: &Model, item: &Item) -> Result<()>;

    fn remove_item_from_store(&mut self, model: &Model, item: &Item) -> Result<()>;
}
