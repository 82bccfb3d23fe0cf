//! # Multiplexer
//!
//! Presents several backend managers as one [`ModelManager`].
//!
//! - Reads query the backends in registration order; the first hit wins.
//! - Mutations route to the backend recorded on the target model.
//! - `add_model` offers the model to each writable backend in order.
//!
//! The backends run with deferred resolution; the multiplexer owns the
//! reference pass so imports may cross backend boundaries.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::{FileSystemStore, ResourceStore};
use crate::base::{MessageContainer, RepositoryError, Result};
use crate::code::{ArtifactSource, BuiltinArtifacts, CodeResolverConfig};
use crate::config::RepositoryConfig;
use crate::manager::{
    ManagerId, ModelFilter, ModelManager, RepositoryManager, check_messages, item_name, model_name,
    reference_pass,
};
use crate::model::{Item, ItemType, Model, ModelContext};
use crate::qualifier::{Qualifier, is_valid_identifier};

/// A manager composed of several backend managers.
pub struct ModelMultiplexer {
    id: ManagerId,
    managers: Vec<Box<dyn ModelManager>>,
    code_config: CodeResolverConfig,
    fallback: Arc<dyn ArtifactSource>,
    messages: MessageContainer,
    reload_on_reset: bool,
    deferred: bool,
}

impl Default for ModelMultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelMultiplexer {
    pub fn new() -> Self {
        Self {
            id: ManagerId::new(),
            managers: Vec::new(),
            code_config: CodeResolverConfig::default(),
            fallback: Arc::new(BuiltinArtifacts::default()),
            messages: MessageContainer::new(),
            reload_on_reset: true,
            deferred: false,
        }
    }

    /// Append a backend; it is queried after every backend added before it.
    pub fn with_manager(mut self, manager: impl ModelManager + 'static) -> Self {
        self.add_manager(Box::new(manager));
        self
    }

    pub fn add_manager(&mut self, mut manager: Box<dyn ModelManager>) {
        manager.set_deferred_resolution(true);
        self.managers.push(manager);
    }

    /// The standard stack: the filesystem tree first, then bundled resources.
    pub fn from_config(config: &RepositoryConfig) -> Result<Self> {
        let filter = ModelFilter::new(&config.models)?;

        let mut files = FileSystemStore::new(&config.model_root);
        for root in &config.additional_roots {
            files = files.with_additional_root(root);
        }
        let resources = ResourceStore::new(config.resource_roots.clone())
            .with_prefix(config.resource_prefix.as_str());

        debug!(
            "[MULTIPLEXER] filesystem root {}, {} resource roots",
            config.model_root.display(),
            config.resource_roots.len()
        );

        Ok(Self::new()
            .with_code_config(config.code.clone())
            .with_reload_on_reset(config.reload_on_reset)
            .with_manager(
                RepositoryManager::new(files)
                    .with_filter(filter.clone())
                    .with_reload_on_reset(config.reload_on_reset)
                    .with_code_config(config.code.clone()),
            )
            .with_manager(
                RepositoryManager::new(resources)
                    .with_filter(filter)
                    .with_reload_on_reset(config.reload_on_reset)
                    .with_code_config(config.code.clone()),
            ))
    }

    pub fn with_code_config(mut self, config: CodeResolverConfig) -> Self {
        self.code_config = config;
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn ArtifactSource>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_reload_on_reset(mut self, reload: bool) -> Self {
        self.reload_on_reset = reload;
        self
    }

    pub fn managers(&self) -> impl Iterator<Item = &dyn ModelManager> {
        self.managers.iter().map(|m| &**m)
    }

    /// Index of the backend owning the model named by `qualifier`.
    fn owner_of(&self, qualifier: &Qualifier) -> Result<usize> {
        let name = model_name(qualifier)?;
        let model = self
            .lookup_model(name)
            .ok_or_else(|| RepositoryError::not_found("model", Qualifier::for_model(name).to_string()))?;
        model
            .manager()
            .and_then(|id| self.managers.iter().position(|m| m.id() == id))
            .ok_or_else(|| RepositoryError::not_found("manager", format!("owner of model '{name}'")))
    }

    fn revalidate(&mut self) {
        if self.deferred {
            return;
        }
        self.messages = reference_pass::run(self);
    }

    fn resolve_references(&mut self) {
        if self.deferred {
            return;
        }
        let messages = reference_pass::run(self);
        self.messages.extend(messages);
    }

    /// Remove from one backend, add to another. Not atomic.
    fn move_across(
        &mut self,
        from: &Qualifier,
        source: usize,
        target: usize,
        target_model: &str,
        target_name: &str,
    ) -> Result<()> {
        if self.managers[target].is_read_only() {
            return Err(RepositoryError::unsupported("move_item", "read-only"));
        }
        let mut item = self.managers[source].remove_item(from)?;
        item.rename(target_name);
        let target_qualifier = Qualifier::for_model(target_model);
        if let Err(e) = self.managers[target].add_item(&target_qualifier, item) {
            warn!(
                "[MULTIPLEXER] move of '{}' to '{}' failed after removal, item is lost: {}",
                from, target_model, e
            );
            return Err(e);
        }
        Ok(())
    }
}

impl ModelContext for ModelMultiplexer {
    fn lookup_model(&self, name: &str) -> Option<&Model> {
        self.managers.iter().find_map(|m| m.lookup_model(name))
    }

    fn code_config(&self) -> &CodeResolverConfig {
        &self.code_config
    }

    fn fallback_artifacts(&self) -> &dyn ArtifactSource {
        self.fallback.as_ref()
    }
}

impl ModelManager for ModelMultiplexer {
    fn id(&self) -> ManagerId {
        self.id
    }

    fn is_read_only(&self) -> bool {
        self.managers.iter().all(|m| m.is_read_only())
    }

    fn as_context(&self) -> &dyn ModelContext {
        self
    }

    fn get_model(&self, qualifier: &Qualifier, required: bool) -> Result<Option<&Model>> {
        for manager in &self.managers {
            if let Some(model) = manager.get_model(qualifier, false)? {
                return Ok(Some(model));
            }
        }
        if required {
            return Err(RepositoryError::not_found(
                "model",
                Qualifier::for_model(model_name(qualifier)?).to_string(),
            ));
        }
        Ok(None)
    }

    fn models(&self) -> Box<dyn Iterator<Item = &Model> + '_> {
        Box::new(self.managers.iter().flat_map(|m| m.models()))
    }

    fn models_mut(&mut self) -> Box<dyn Iterator<Item = &mut Model> + '_> {
        Box::new(self.managers.iter_mut().flat_map(|m| m.models_mut()))
    }

    fn add_model(&mut self, model: Model) -> Result<()> {
        if self.lookup_model(model.name()).is_some() {
            return Err(RepositoryError::duplicate("model", model.qualifier().to_string()));
        }
        let name = model.name().to_string();
        let mut accepted = None;
        for manager in self.managers.iter_mut().filter(|m| !m.is_read_only()) {
            match manager.add_model(model.clone()) {
                Ok(()) => {
                    accepted = Some(manager.id());
                    break;
                }
                Err(RepositoryError::UnsupportedOperation { .. }) => continue,
                Err(e) => return Err(e),
            }
        }
        let Some(owner) = accepted else {
            return Err(RepositoryError::NoWritableBackend(name));
        };
        debug!("[MULTIPLEXER] model '{}' accepted by {}", name, owner);
        self.revalidate();
        Ok(())
    }

    fn update_model(&mut self, model: Model) -> Result<()> {
        let owner = self.owner_of(&model.qualifier())?;
        self.managers[owner].update_model(model)?;
        self.revalidate();
        Ok(())
    }

    fn remove_model(&mut self, qualifier: &Qualifier) -> Result<Model> {
        let owner = self.owner_of(qualifier)?;
        let model = self.managers[owner].remove_model(qualifier)?;
        self.revalidate();
        Ok(model)
    }

    fn add_item(&mut self, model: &Qualifier, item: Item) -> Result<()> {
        let owner = self.owner_of(model)?;
        self.managers[owner].add_item(model, item)?;
        self.revalidate();
        Ok(())
    }

    fn update_item(&mut self, qualifier: &Qualifier, item: Item) -> Result<()> {
        let owner = self.owner_of(qualifier)?;
        self.managers[owner].update_item(qualifier, item)?;
        self.revalidate();
        Ok(())
    }

    fn remove_item(&mut self, qualifier: &Qualifier) -> Result<Item> {
        let owner = self.owner_of(qualifier)?;
        let item = self.managers[owner].remove_item(qualifier)?;
        self.revalidate();
        Ok(item)
    }

    fn move_item(&mut self, from: &Qualifier, to: &Qualifier) -> Result<()> {
        let source = self.owner_of(from)?;
        let source_model = model_name(from)?.to_string();
        let target_model = to.model().unwrap_or(&source_model).to_string();
        let target = self.owner_of(&Qualifier::for_model(target_model.as_str()))?;

        if source == target {
            self.managers[source].move_item(from, to)?;
            self.revalidate();
            return Ok(());
        }

        let item = self
            .get_item(from, true)?
            .ok_or_else(|| RepositoryError::not_found("item", from.to_string()))?;
        let item_type: ItemType = item.item_type().clone();
        let target_name = to.item().unwrap_or(item_name(from)?).to_string();
        if !is_valid_identifier(&target_name) {
            return Err(RepositoryError::parse(to.to_string(), "invalid item name"));
        }
        let collision = Qualifier::for_item(target_model.as_str(), item_type.as_str(), target_name.as_str());
        if self.get_item(&collision, false)?.is_some() {
            return Err(RepositoryError::duplicate("item", collision.to_string()));
        }

        let typed_from = from.clone().with_item_type(item_type.as_str());
        let moved = self.move_across(&typed_from, source, target, &target_model, &target_name);
        self.revalidate();
        moved
    }

    fn load_models(&mut self) -> Result<MessageContainer> {
        let mut messages = MessageContainer::new();
        for manager in &mut self.managers {
            messages.extend(manager.load_models()?);
        }
        Ok(messages)
    }

    fn soft_reset(&mut self) -> usize {
        self.managers.iter_mut().map(|m| m.soft_reset()).sum()
    }

    fn read_models(&mut self) -> Result<()> {
        self.messages.clear();
        let loaded = self.load_models()?;
        self.messages.extend(loaded);
        self.resolve_references();
        check_messages(&self.messages)
    }

    fn initialize_models(&mut self) -> Result<()> {
        let messages = reference_pass::run(self);
        self.messages.extend(messages);
        check_messages(&self.messages)
    }

    fn reload_on_reset(&self) -> bool {
        self.reload_on_reset
    }

    fn request_reset(&mut self) -> Result<()> {
        self.messages.clear();
        if self.reload_on_reset {
            let loaded = self.load_models()?;
            self.messages.extend(loaded);
        } else {
            let released = self.soft_reset();
            debug!("[MULTIPLEXER] soft reset released {} code resolvers", released);
        }
        self.resolve_references();
        check_messages(&self.messages)
    }

    fn set_deferred_resolution(&mut self, deferred: bool) {
        self.deferred = deferred;
    }

    fn messages(&self) -> &MessageContainer {
        &self.messages
    }
}

#[cfg(test)]
mod tests;
