//! Model container: item table, import list and lifecycle state.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::item::{Item, ItemType};
use crate::base::{RepositoryError, Result};
use crate::code::ModelCodeResolver;
use crate::manager::ManagerId;
use crate::qualifier::{Qualifier, is_valid_identifier};

/// Resolution state of a model's import list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ImportState {
    /// Imports changed (or were never resolved) since the last reference pass.
    #[default]
    Unresolved,
    /// Names of the imported models that were found, in import-list order.
    Resolved(Vec<SmolStr>),
}

/// A named container of typed items with an ordered import list.
#[derive(Clone, Debug)]
pub struct Model {
    name: SmolStr,
    pub description: Option<String>,
    pub properties: IndexMap<SmolStr, String>,
    /// Declared imports; order matters for tie-breaking.
    imports: Vec<SmolStr>,
    /// Backend-specific storage location (model directory).
    location: Option<PathBuf>,
    /// item type -> item name -> item
    items: IndexMap<ItemType, IndexMap<SmolStr, Item>>,
    import_state: ImportState,
    code_resolver: OnceLock<ModelCodeResolver>,
    manager: Option<ManagerId>,
}

impl Model {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            description: None,
            properties: IndexMap::new(),
            imports: Vec::new(),
            location: None,
            items: IndexMap::new(),
            import_state: ImportState::Unresolved,
            code_resolver: OnceLock::new(),
            manager: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_import(mut self, model: impl Into<SmolStr>) -> Self {
        self.add_import(model);
        self
    }

    pub fn with_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.set_location(Some(location.into()));
        self
    }

    /// Builder variant of [`add_item`](Self::add_item).
    pub fn with_item(mut self, item: Item) -> Result<Self> {
        self.add_item(item)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// A model owns itself: the owning model of a model is the model.
    pub fn owner(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> Qualifier {
        Qualifier::for_model(self.name.clone())
    }

    // ============================================================
    // Imports
    // ============================================================

    pub fn imports(&self) -> &[SmolStr] {
        &self.imports
    }

    pub fn imports_model(&self, name: &str) -> bool {
        self.imports.iter().any(|i| i == name)
    }

    pub fn set_imports(&mut self, imports: impl IntoIterator<Item = impl Into<SmolStr>>) {
        self.imports = imports.into_iter().map(Into::into).collect();
        self.invalidate_imports();
    }

    pub fn add_import(&mut self, model: impl Into<SmolStr>) {
        let model = model.into();
        if !self.imports.contains(&model) {
            self.imports.push(model);
        }
        self.invalidate_imports();
    }

    /// Remove an import; returns false if it was not declared.
    pub fn remove_import(&mut self, model: &str) -> bool {
        let before = self.imports.len();
        self.imports.retain(|i| i != model);
        let removed = self.imports.len() != before;
        if removed {
            self.invalidate_imports();
        }
        removed
    }

    pub fn import_state(&self) -> &ImportState {
        &self.import_state
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.import_state, ImportState::Resolved(_))
    }

    /// Resolved import names; fails with `Unresolved` on a stale model.
    pub fn resolved_imports(&self) -> Result<&[SmolStr]> {
        match &self.import_state {
            ImportState::Resolved(names) => Ok(names),
            ImportState::Unresolved => Err(RepositoryError::Unresolved(self.name.to_string())),
        }
    }

    pub(crate) fn apply_import_resolution(&mut self, resolved: Vec<SmolStr>) {
        self.import_state = ImportState::Resolved(resolved);
    }

    /// Mark the import list stale. The code resolver chains through imports,
    /// so it is released as well.
    pub fn invalidate_imports(&mut self) {
        self.import_state = ImportState::Unresolved;
        self.code_resolver.take();
    }

    // ============================================================
    // Storage location, manager, code resolver
    // ============================================================

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub(crate) fn set_location(&mut self, location: Option<PathBuf>) {
        self.location = location;
        self.code_resolver.take();
    }

    /// The manager this model is registered with.
    pub fn manager(&self) -> Option<ManagerId> {
        self.manager
    }

    pub(crate) fn set_manager(&mut self, manager: Option<ManagerId>) {
        self.manager = manager;
    }

    pub(crate) fn code_resolver_slot(&self) -> &OnceLock<ModelCodeResolver> {
        &self.code_resolver
    }

    pub fn has_code_resolver(&self) -> bool {
        self.code_resolver.get().is_some()
    }

    // ============================================================
    // Lifecycle
    // ============================================================

    /// Soft reset: release the code resolver and mark imports stale.
    ///
    /// Returns true if a code resolver was released.
    pub fn reset(&mut self) -> bool {
        let released = self.code_resolver.take().is_some();
        self.import_state = ImportState::Unresolved;
        released
    }

    /// Release resources before the model leaves its registry.
    pub fn shutdown(&mut self) -> bool {
        let released = self.reset();
        self.manager = None;
        released
    }

    /// Copy-in-place: take the declared content of `source` while keeping
    /// items, storage location and manager link of this instance.
    pub fn overwrite_from(&mut self, source: Model) {
        self.description = source.description;
        self.properties = source.properties;
        self.imports = source.imports;
        self.invalidate_imports();
    }

    // ============================================================
    // Items
    // ============================================================

    /// Get an item by name and type; fails with `NotFound` if `required`.
    pub fn get_item(&self, name: &str, item_type: &ItemType, required: bool) -> Result<Option<&Item>> {
        match self.items.get(item_type).and_then(|by_name| by_name.get(name)) {
            Some(item) => Ok(Some(item)),
            None if required => Err(RepositoryError::not_found(
                "item",
                Qualifier::for_item(self.name.clone(), item_type.as_str(), name).to_string(),
            )),
            None => Ok(None),
        }
    }

    pub fn get_item_mut(&mut self, name: &str, item_type: &ItemType) -> Option<&mut Item> {
        self.items.get_mut(item_type)?.get_mut(name)
    }

    /// Find an item by name, optionally restricted to one type. Without a type
    /// the first type (in table order) holding the name wins.
    pub fn find_item(&self, name: &str, item_type: Option<&ItemType>) -> Option<&Item> {
        match item_type {
            Some(item_type) => self.items.get(item_type)?.get(name),
            None => self.items.values().find_map(|by_name| by_name.get(name)),
        }
    }

    /// All items of one type, or every item when `item_type` is `None`.
    /// Items of the same type are always contiguous.
    pub fn items<'a>(&'a self, item_type: Option<&'a ItemType>) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |(t, _)| item_type.is_none_or(|wanted| *t == wanted))
            .flat_map(|(_, by_name)| by_name.values())
    }

    pub fn item_count(&self) -> usize {
        self.items.values().map(IndexMap::len).sum()
    }

    /// Add an item; fails with `DuplicateName` if an item of the same type
    /// and name exists.
    pub fn add_item(&mut self, mut item: Item) -> Result<()> {
        if !is_valid_identifier(item.name()) {
            return Err(RepositoryError::parse(
                item.name(),
                "item names must be non-empty and free of '/', ':', '.' and ';'",
            ));
        }
        if !is_valid_identifier(item.item_type().as_str()) {
            return Err(RepositoryError::parse(
                item.item_type().as_str(),
                "item types must be non-empty and free of '/', ':', '.' and ';'",
            ));
        }
        let by_name = self.items.entry(item.item_type().clone()).or_default();
        if by_name.contains_key(item.name()) {
            return Err(RepositoryError::duplicate(
                "item",
                Qualifier::for_item(self.name.clone(), item.item_type().as_str(), item.name())
                    .to_string(),
            ));
        }
        item.set_model(Some(self.name.clone()));
        by_name.insert(SmolStr::new(item.name()), item);
        Ok(())
    }

    /// Remove an item; the returned item has lost its model back-reference.
    pub fn remove_item(&mut self, name: &str, item_type: &ItemType) -> Result<Item> {
        let by_name = self.items.get_mut(item_type);
        let mut item = by_name
            .and_then(|by_name| by_name.shift_remove(name))
            .ok_or_else(|| {
                RepositoryError::not_found(
                    "item",
                    Qualifier::for_item(self.name.clone(), item_type.as_str(), name).to_string(),
                )
            })?;
        if self.items.get(item_type).is_some_and(IndexMap::is_empty) {
            self.items.shift_remove(item_type);
        }
        item.set_model(None);
        Ok(item)
    }
}
