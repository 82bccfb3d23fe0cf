//! # Model managers
//!
//! The [`ModelManager`] contract is what callers program against: model and
//! item lookup, mutation, bulk loading and reset. [`RepositoryManager`] is the
//! shared registration base; backends plug into it through [`ModelStore`].
//!
//! ```text
//! ModelManager (trait)
//!   ├── RepositoryManager<FileSystemStore>   writable tree
//!   ├── RepositoryManager<ResourceStore>     read-only tree
//!   └── ModelMultiplexer                     N managers behind one contract
//! ```

mod filter;
pub(crate) mod reference_pass;
mod registry;
mod store;

use std::fmt;

use uuid::Uuid;

pub use filter::ModelFilter;
pub use registry::RepositoryManager;
pub use store::{ModelStore, StoreLoad};

use crate::base::{MessageContainer, RepositoryError, Result};
use crate::model::{Item, ItemType, Model, ModelContext};
use crate::qualifier::Qualifier;

/// Identity of a manager instance; recorded on every registered model so
/// mutations can be routed back to the owning backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ManagerId(Uuid);

impl ManagerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ManagerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The model manager contract.
///
/// Mutations run the reference pass afterwards unless resolution is deferred
/// to a parent (see [`set_deferred_resolution`](Self::set_deferred_resolution)).
/// Validation messages from a mutation are recorded in [`messages`](Self::messages),
/// they do not fail the call.
pub trait ModelManager: ModelContext + Send + Sync {
    fn id(&self) -> ManagerId;

    fn is_read_only(&self) -> bool;

    /// This manager as a resolution context.
    fn as_context(&self) -> &dyn ModelContext;

    // ============================================================
    // Models
    // ============================================================

    /// Look up the model named by `qualifier`; fails with `NotFound` if
    /// `required` and absent.
    fn get_model(&self, qualifier: &Qualifier, required: bool) -> Result<Option<&Model>>;

    fn models(&self) -> Box<dyn Iterator<Item = &Model> + '_>;

    fn models_mut(&mut self) -> Box<dyn Iterator<Item = &mut Model> + '_>;

    fn add_model(&mut self, model: Model) -> Result<()>;

    /// Copy-in-place update of an existing model's declared content.
    fn update_model(&mut self, model: Model) -> Result<()>;

    fn remove_model(&mut self, qualifier: &Qualifier) -> Result<Model>;

    // ============================================================
    // Items
    // ============================================================

    /// Look up the item named by an absolute qualifier. Without a type tag
    /// the first item of that name wins.
    fn get_item(&self, qualifier: &Qualifier, required: bool) -> Result<Option<&Item>> {
        let name = item_name(qualifier)?;
        let Some(model) = self.get_model(qualifier, required)? else {
            return Ok(None);
        };
        let item_type = qualifier.item_type().map(ItemType::parse);
        match model.find_item(name, item_type.as_ref()) {
            Some(item) => Ok(Some(item)),
            None if required => Err(RepositoryError::not_found("item", qualifier.to_string())),
            None => Ok(None),
        }
    }

    /// Add `item` to the model named by `model`.
    fn add_item(&mut self, model: &Qualifier, item: Item) -> Result<()>;

    /// Copy-in-place update of the item named by `qualifier`.
    fn update_item(&mut self, qualifier: &Qualifier, item: Item) -> Result<()>;

    fn remove_item(&mut self, qualifier: &Qualifier) -> Result<Item>;

    /// Rename an item and/or move it to another model.
    ///
    /// Implemented as remove then add; not atomic. A failing add leaves the
    /// item removed. Code artifacts of the item are not moved.
    fn move_item(&mut self, from: &Qualifier, to: &Qualifier) -> Result<()>;

    // ============================================================
    // Bulk load and reset
    // ============================================================

    /// Replace the registry with a fresh read from the store, without running
    /// the reference pass. Returns the load diagnostics.
    fn load_models(&mut self) -> Result<MessageContainer>;

    /// Release every model's code resolver and mark imports stale. Returns
    /// the number of released resolvers.
    fn soft_reset(&mut self) -> usize;

    /// Load from the store and resolve; fails with `ValidationFailed` if
    /// any message was produced, warnings included. Models that loaded stay
    /// registered.
    fn read_models(&mut self) -> Result<()>;

    /// Run the reference pass over the registered models; fails like
    /// [`read_models`](Self::read_models).
    fn initialize_models(&mut self) -> Result<()>;

    /// Whether [`request_reset`](Self::request_reset) reloads from the store
    /// or only soft-resets.
    fn reload_on_reset(&self) -> bool;

    /// Clear the message log, reload or soft-reset, then resolve again;
    /// fails like [`read_models`](Self::read_models).
    fn request_reset(&mut self) -> Result<()>;

    /// Skip the reference pass after mutations; a parent runs it instead.
    fn set_deferred_resolution(&mut self, deferred: bool);

    /// The message log.
    fn messages(&self) -> &MessageContainer;
}

/// Model name carried by a qualifier.
pub(crate) fn model_name(qualifier: &Qualifier) -> Result<&str> {
    qualifier
        .model()
        .ok_or_else(|| RepositoryError::parse(qualifier.to_string(), "qualifier names no model"))
}

/// Item name carried by a qualifier.
pub(crate) fn item_name(qualifier: &Qualifier) -> Result<&str> {
    qualifier
        .item()
        .ok_or_else(|| RepositoryError::parse(qualifier.to_string(), "qualifier names no item"))
}

/// Fail with `ValidationFailed` unless `messages` is empty.
pub(crate) fn check_messages(messages: &MessageContainer) -> Result<()> {
    if !messages.is_empty() {
        Err(RepositoryError::ValidationFailed(messages.clone()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests;
