//! Registration base shared by every backend.

use std::sync::Arc;

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::{debug, warn};

use super::filter::ModelFilter;
use super::store::ModelStore;
use super::{ManagerId, ModelManager, check_messages, model_name, reference_pass};
use crate::base::{Message, MessageContainer, RepositoryError, Result};
use crate::code::{ArtifactSource, BuiltinArtifacts, CodeResolverConfig};
use crate::model::{Item, ItemType, Model, ModelContext};
use crate::qualifier::{Qualifier, is_valid_identifier};

/// In-memory registry of models backed by a [`ModelStore`].
///
/// Holds the single name → model table, rejects duplicate names and forwards
/// the storage side of every mutation to the store.
#[derive(Debug)]
pub struct RepositoryManager<S> {
    id: ManagerId,
    store: S,
    models: IndexMap<SmolStr, Model>,
    filter: ModelFilter,
    reload_on_reset: bool,
    code_config: CodeResolverConfig,
    fallback: Arc<dyn ArtifactSource>,
    messages: MessageContainer,
    deferred: bool,
}

impl<S: ModelStore> RepositoryManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            id: ManagerId::new(),
            store,
            models: IndexMap::new(),
            filter: ModelFilter::all(),
            reload_on_reset: true,
            code_config: CodeResolverConfig::default(),
            fallback: Arc::new(BuiltinArtifacts::default()),
            messages: MessageContainer::new(),
            deferred: false,
        }
    }

    pub fn with_filter(mut self, filter: ModelFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_reload_on_reset(mut self, reload: bool) -> Self {
        self.reload_on_reset = reload;
        self
    }

    pub fn with_code_config(mut self, config: CodeResolverConfig) -> Self {
        self.code_config = config;
        self
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn ArtifactSource>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct access to the store. Changes become visible on the next load.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn filter(&self) -> &ModelFilter {
        &self.filter
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        if self.store.is_read_only() {
            return Err(RepositoryError::unsupported(operation, self.store.name()));
        }
        Ok(())
    }

    fn register(&mut self, mut model: Model) {
        model.set_manager(Some(self.id));
        model.invalidate_imports();
        self.invalidate_dependents(model.name());
        self.models.insert(SmolStr::new(model.name()), model);
    }

    /// Mark every model importing `name` stale.
    fn invalidate_dependents(&mut self, name: &str) {
        for model in self.models.values_mut() {
            if model.imports_model(name) {
                model.invalidate_imports();
            }
        }
    }

    fn registered_mut(&mut self, name: &str) -> Result<&mut Model> {
        self.models
            .get_mut(name)
            .ok_or_else(|| RepositoryError::not_found("model", Qualifier::for_model(name).to_string()))
    }

    /// Re-run the reference pass after a mutation. The log then holds exactly
    /// the messages of this pass.
    fn revalidate(&mut self) {
        if self.deferred {
            return;
        }
        self.messages = reference_pass::run(self);
    }

    /// Run the reference pass on the bulk path, appending to the load
    /// diagnostics already in the log.
    fn resolve_references(&mut self) {
        if self.deferred {
            return;
        }
        let messages = reference_pass::run(self);
        self.messages.extend(messages);
    }

    /// Qualifier → (model name, item type, item name) of an existing item.
    fn locate_item(&self, qualifier: &Qualifier) -> Result<(SmolStr, ItemType, SmolStr)> {
        let item = self
            .get_item(qualifier, true)?
            .ok_or_else(|| RepositoryError::not_found("item", qualifier.to_string()))?;
        let model = item
            .model()
            .ok_or_else(|| RepositoryError::not_found("model", qualifier.to_string()))?;
        Ok((
            SmolStr::new(model),
            item.item_type().clone(),
            SmolStr::new(item.name()),
        ))
    }
}

impl<S: ModelStore> ModelContext for RepositoryManager<S> {
    fn lookup_model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    fn code_config(&self) -> &CodeResolverConfig {
        &self.code_config
    }

    fn fallback_artifacts(&self) -> &dyn ArtifactSource {
        self.fallback.as_ref()
    }
}

impl<S: ModelStore> ModelManager for RepositoryManager<S> {
    fn id(&self) -> ManagerId {
        self.id
    }

    fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    fn as_context(&self) -> &dyn ModelContext {
        self
    }

    fn get_model(&self, qualifier: &Qualifier, required: bool) -> Result<Option<&Model>> {
        let name = model_name(qualifier)?;
        match self.models.get(name) {
            Some(model) => Ok(Some(model)),
            None if required => Err(RepositoryError::not_found(
                "model",
                Qualifier::for_model(name).to_string(),
            )),
            None => Ok(None),
        }
    }

    fn models(&self) -> Box<dyn Iterator<Item = &Model> + '_> {
        Box::new(self.models.values())
    }

    fn models_mut(&mut self) -> Box<dyn Iterator<Item = &mut Model> + '_> {
        Box::new(self.models.values_mut())
    }

    fn add_model(&mut self, mut model: Model) -> Result<()> {
        self.ensure_writable("add_model")?;
        if !is_valid_identifier(model.name()) {
            return Err(RepositoryError::parse(
                model.name(),
                "model names must be non-empty and free of '/', ':', '.' and ';'",
            ));
        }
        if self.models.contains_key(model.name()) {
            return Err(RepositoryError::duplicate(
                "model",
                model.qualifier().to_string(),
            ));
        }

        self.store.add_model_to_store(&mut model)?;
        debug!("[{}] added model '{}'", self.store.name(), model.name());
        self.register(model);
        self.revalidate();
        Ok(())
    }

    fn update_model(&mut self, model: Model) -> Result<()> {
        self.ensure_writable("update_model")?;
        let name = SmolStr::new(model.name());
        self.registered_mut(&name)?.overwrite_from(model);
        self.revalidate();

        let existing = self
            .models
            .get(&name)
            .ok_or_else(|| RepositoryError::not_found("model", name.to_string()))?;
        self.store.save_model_to_store(existing)?;
        debug!("[{}] updated model '{}'", self.store.name(), name);
        Ok(())
    }

    fn remove_model(&mut self, qualifier: &Qualifier) -> Result<Model> {
        self.ensure_writable("remove_model")?;
        let name = model_name(qualifier)?;
        let Some(model) = self.models.get(name) else {
            return Err(RepositoryError::not_found("model", qualifier.to_string()));
        };
        self.store.remove_model_from_store(model)?;

        let mut model = self
            .models
            .shift_remove(name)
            .ok_or_else(|| RepositoryError::not_found("model", qualifier.to_string()))?;
        model.shutdown();
        self.invalidate_dependents(model.name());
        debug!("[{}] removed model '{}'", self.store.name(), model.name());
        self.revalidate();
        Ok(model)
    }

    fn add_item(&mut self, model: &Qualifier, item: Item) -> Result<()> {
        self.ensure_writable("add_item")?;
        let name = model_name(model)?;
        let target = self
            .models
            .get_mut(name)
            .ok_or_else(|| RepositoryError::not_found("model", model.to_string()))?;

        let item_type = item.item_type().clone();
        let item_key = SmolStr::new(item.name());
        target.add_item(item)?;

        let stored = match target.get_item(&item_key, &item_type, true)? {
            Some(added) => self.store.add_item_to_store(target, added),
            None => Ok(()),
        };
        if let Err(e) = stored {
            target.remove_item(&item_key, &item_type)?;
            return Err(e);
        }
        debug!(
            "[{}] added item '{}' to '{}'",
            self.store.name(),
            item_key,
            name
        );
        self.revalidate();
        Ok(())
    }

    fn update_item(&mut self, qualifier: &Qualifier, item: Item) -> Result<()> {
        self.ensure_writable("update_item")?;
        let (model, item_type, name) = self.locate_item(qualifier)?;
        if let Some(existing) = self.registered_mut(&model)?.get_item_mut(&name, &item_type) {
            existing.overwrite_from(item);
        }
        self.revalidate();

        let target = self
            .models
            .get(&model)
            .ok_or_else(|| RepositoryError::not_found("model", qualifier.to_string()))?;
        if let Some(existing) = target.get_item(&name, &item_type, true)? {
            self.store.save_item_to_store(target, existing)?;
        }
        debug!("[{}] updated item '{}'", self.store.name(), qualifier);
        Ok(())
    }

    fn remove_item(&mut self, qualifier: &Qualifier) -> Result<Item> {
        self.ensure_writable("remove_item")?;
        let (model, item_type, name) = self.locate_item(qualifier)?;

        let target = self
            .models
            .get(&model)
            .ok_or_else(|| RepositoryError::not_found("model", qualifier.to_string()))?;
        if let Some(existing) = target.get_item(&name, &item_type, true)? {
            self.store.remove_item_from_store(target, existing)?;
        }
        let item = self.registered_mut(&model)?.remove_item(&name, &item_type)?;
        debug!("[{}] removed item '{}'", self.store.name(), qualifier);
        self.revalidate();
        Ok(item)
    }

    fn move_item(&mut self, from: &Qualifier, to: &Qualifier) -> Result<()> {
        self.ensure_writable("move_item")?;
        let (source_model, item_type, source_name) = self.locate_item(from)?;
        let target_model = SmolStr::new(to.model().unwrap_or(&source_model));
        let target_name = SmolStr::new(to.item().unwrap_or(&source_name));

        if target_model == source_model && target_name == source_name {
            return Ok(());
        }
        if !is_valid_identifier(&target_name) {
            return Err(RepositoryError::parse(to.to_string(), "invalid item name"));
        }
        let target = self
            .models
            .get(&target_model)
            .ok_or_else(|| RepositoryError::not_found("model", to.to_string()))?;
        if target.get_item(&target_name, &item_type, false)?.is_some() {
            return Err(RepositoryError::duplicate(
                "item",
                Qualifier::for_item(target_model.clone(), item_type.as_str(), target_name.clone())
                    .to_string(),
            ));
        }

        let source = Qualifier::for_item(source_model.clone(), item_type.as_str(), source_name.clone());
        let mut item = self.remove_item(&source)?;
        item.rename(target_name.clone());
        if let Err(e) = self.add_item(&Qualifier::for_model(target_model.clone()), item) {
            warn!(
                "[{}] move of '{}' failed after removal, item is lost: {}",
                self.store.name(),
                source,
                e
            );
            return Err(e);
        }
        debug!(
            "[{}] moved '{}' -> '/{}/{}'",
            self.store.name(),
            source,
            target_model,
            target_name
        );
        Ok(())
    }

    fn load_models(&mut self) -> Result<MessageContainer> {
        let load = self.store.load_models(&self.filter)?;
        let mut messages = load.messages;

        for model in self.models.values_mut() {
            model.shutdown();
        }
        self.models.clear();

        for model in load.models {
            if self.models.contains_key(model.name()) {
                warn!("[{}] duplicate model '{}' ignored", self.store.name(), model.name());
                messages.push(Message::warning(
                    Some(model.name()),
                    "duplicate model name, later definition ignored",
                ));
                continue;
            }
            self.register(model);
        }
        debug!(
            "[{}] loaded {} models ({} messages)",
            self.store.name(),
            self.models.len(),
            messages.len()
        );
        Ok(messages)
    }

    fn soft_reset(&mut self) -> usize {
        self.models
            .values_mut()
            .map(Model::reset)
            .filter(|released| *released)
            .count()
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
            debug!(
                "[{}] soft reset released {} code resolvers",
                self.store.name(),
                released
            );
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
